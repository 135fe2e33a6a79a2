//! Cache key builders for all TaskHub cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses. Keys are unprefixed here;
//! the Redis provider applies the configured key prefix.

use uuid::Uuid;

/// Cache key for an identity snapshot by user ID.
pub fn user_by_id(user_id: Uuid) -> String {
    format!("user:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key() {
        let id = Uuid::nil();
        assert_eq!(user_by_id(id), "user:00000000-0000-0000-0000-000000000000");
    }
}
