//! Authentication: password hashing and sessions

mod password;
mod session;

pub use password::{hash_password, verify_password};
pub use session::{Session, SessionStore};

/// Extract the session id from an `Authorization: Bearer <id>` header value
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token_from_header(Some("Bearer abc-123")), Some("abc-123"));
        assert_eq!(extract_token_from_header(Some("Bearer ")), None);
        assert_eq!(extract_token_from_header(Some("Basic abc")), None);
        assert_eq!(extract_token_from_header(None), None);
    }
}
