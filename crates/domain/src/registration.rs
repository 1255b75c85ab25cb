use serde::Deserialize;
use thiserror::Error;

/// Shortest password the sign-up form accepts
pub const MIN_PASSWORD_LEN: usize = 6;

/// Problems caught locally, before any backend call is made
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {} characters long", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("Note text must not be empty")]
    EmptyNote,
}

/// Sign-up form as submitted by the user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
}

impl Registration {
    /// Check the password rules. Mismatch is reported before length.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, confirm: &str) -> Registration {
        Registration {
            email: "student@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            name: "Student".to_string(),
        }
    }

    #[test]
    fn test_rejects_short_password() {
        assert_eq!(form("abc", "abc").validate(), Err(ValidationError::PasswordTooShort));
        assert_eq!(
            form("abcde", "abcde").validate(),
            Err(ValidationError::PasswordTooShort)
        );
    }

    #[test]
    fn test_rejects_mismatch() {
        assert_eq!(
            form("secret1", "secret2").validate(),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_mismatch_reported_first() {
        assert_eq!(form("a", "b").validate(), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn test_accepts_valid_form() {
        assert_eq!(form("secret", "secret").validate(), Ok(()));
    }

    #[test]
    fn test_deserializes_camel_case() {
        let form: Registration = serde_json::from_str(
            r#"{"email":"a@b.c","password":"secret","confirmPassword":"secret","name":"A"}"#,
        )
        .unwrap();
        assert_eq!(form.confirm_password, "secret");
    }
}
