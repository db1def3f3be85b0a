pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use crate::error::AppError;
use crate::models::user::Role;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::{AuthMiddleware, RequireAdmin};
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Name of the httpOnly cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

lazy_static! {
    // Simple syntactic email check: local@domain.tld, no whitespace.
    static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Represents the payload for a new user registration request.
///
/// Every field is optional at the deserialization layer so that a request
/// missing several fields can be answered with the complete list of what is
/// missing, rather than a parse error naming only the first.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// A registration payload that has passed presence and shape validation.
#[derive(Debug)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegisterRequest {
    /// Validates the payload and hands back the checked fields.
    ///
    /// Presence is checked first, collecting every missing field into a
    /// single message. Shape checks then run in a fixed order, each naming
    /// the offending field: username trimmed length >= 2, email syntax,
    /// password length >= 6, role in {user, admin}.
    pub fn validated(&self) -> Result<ValidRegistration, AppError> {
        let mut missing = Vec::new();
        if self.username.is_none() {
            missing.push("username");
        }
        if self.email.is_none() {
            missing.push("email");
        }
        if self.password.is_none() {
            missing.push("password");
        }
        if self.role.is_none() {
            missing.push("role");
        }
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let username = self.username.as_deref().unwrap_or_default();
        let email = self.email.as_deref().unwrap_or_default();
        let password = self.password.as_deref().unwrap_or_default();
        let role = self.role.as_deref().unwrap_or_default();

        if username.trim().len() < 2 {
            return Err(AppError::Validation(
                "Username must be at least 2 characters".into(),
            ));
        }
        if !EMAIL_REGEX.is_match(email) {
            return Err(AppError::Validation(
                "Please provide a valid email address".into(),
            ));
        }
        if password.len() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters long".into(),
            ));
        }
        let role = Role::parse(role).ok_or_else(|| {
            AppError::Validation("Role must be either 'user' or 'admin'".into())
        })?;

        Ok(ValidRegistration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        })
    }
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    /// User's password.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Response body after a successful login. The token is also delivered via
/// the `token` cookie; the JSON copy serves bearer-header clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: crate::models::user::PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(
        username: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
        role: Option<&str>,
    ) -> RegisterRequest {
        RegisterRequest {
            username: username.map(String::from),
            email: email.map(String::from),
            password: password.map(String::from),
            role: role.map(String::from),
        }
    }

    #[test]
    fn test_all_missing_fields_are_reported_together() {
        let req = request(None, None, Some("secret1"), None);
        match req.validated() {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Missing required fields: username, email, role");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_checks_run_in_order() {
        // Short username wins over the also-bad email.
        let req = request(Some("a"), Some("not-an-email"), Some("secret1"), Some("user"));
        match req.validated() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("Username")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let req = request(Some("alice"), Some("not-an-email"), Some("secret1"), Some("user"));
        match req.validated() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("email")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let req = request(Some("alice"), Some("a@x.com"), Some("12345"), Some("user"));
        match req.validated() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("Password")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let req = request(Some("alice"), Some("a@x.com"), Some("secret1"), Some("root"));
        match req.validated() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("Role")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_username_is_trimmed_before_length_check() {
        let req = request(Some("  a  "), Some("a@x.com"), Some("secret1"), Some("user"));
        assert!(req.validated().is_err());

        let req = request(Some("  ab "), Some("a@x.com"), Some("secret1"), Some("user"));
        assert!(req.validated().is_ok());
    }

    #[test]
    fn test_valid_registration_passes() {
        let req = request(Some("alice"), Some("a@x.com"), Some("secret1"), Some("admin"));
        let valid = req.validated().unwrap();
        assert_eq!(valid.username, "alice");
        assert_eq!(valid.role, Role::Admin);
    }

    #[test]
    fn test_email_pattern() {
        assert!(EMAIL_REGEX.is_match("a@x.com"));
        assert!(EMAIL_REGEX.is_match("first.last@sub.domain.org"));
        assert!(!EMAIL_REGEX.is_match("a@x"));
        assert!(!EMAIL_REGEX.is_match("ax.com"));
        assert!(!EMAIL_REGEX.is_match("a b@x.com"));
    }

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let short_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "123".to_string(),
        };
        assert!(short_password_login.validate().is_err());
    }
}
