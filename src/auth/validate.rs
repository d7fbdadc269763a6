use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::config::PasswordPolicy;
use crate::error::Violation;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

// Empty-after-trim counts as missing for required fields.
fn require(field: &'static str, value: &str, out: &mut Vec<Violation>) -> bool {
    if value.trim().is_empty() {
        out.push(Violation::new(field, "is required"));
        return false;
    }
    true
}

fn check_email(field: &'static str, email: &str, out: &mut Vec<Violation>) {
    if require(field, email, out) && !is_valid_email(email) {
        out.push(Violation::new(field, "must be a valid email address"));
    }
}

/// Collects every violation rather than stopping at the first, so a
/// caller sees all problems with a payload at once.
pub fn validate_register(payload: &RegisterRequest, policy: &PasswordPolicy) -> Vec<Violation> {
    let mut violations = Vec::new();
    require("firstName", &payload.first_name, &mut violations);
    require("lastName", &payload.last_name, &mut violations);
    check_email("email", &payload.email, &mut violations);
    if require("password", &payload.password, &mut violations) {
        // Bounds count characters, not bytes.
        let len = payload.password.chars().count();
        if len < policy.min_len {
            violations.push(Violation::new(
                "password",
                format!("must be at least {} characters", policy.min_len),
            ));
        } else if len > policy.max_len {
            violations.push(Violation::new(
                "password",
                format!("must be at most {} characters", policy.max_len),
            ));
        }
    }
    violations
}

pub fn validate_login(payload: &LoginRequest) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_email("email", &payload.email, &mut violations);
    require("password", &payload.password, &mut violations);
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::default()
    }

    fn valid_register() -> RegisterRequest {
        RegisterRequest {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: "ann@x.com".into(),
            password: "secret123".into(),
        }
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(validate_register(&valid_register(), &policy()).is_empty());
    }

    #[test]
    fn collects_every_missing_field() {
        let payload = RegisterRequest {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
        };
        let violations = validate_register(&payload, &policy());
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["firstName", "lastName", "email", "password"]);
        assert!(violations.iter().all(|v| v.message == "is required"));
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let mut payload = valid_register();
        payload.first_name = "   ".into();
        let violations = validate_register(&payload, &policy());
        assert_eq!(violations, vec![Violation::new("firstName", "is required")]);
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["not-an-email", "a@b", "a b@c.com", "@c.com"] {
            let mut payload = valid_register();
            payload.email = email.into();
            let violations = validate_register(&payload, &policy());
            assert_eq!(violations.len(), 1, "email {email:?} should be rejected");
            assert_eq!(violations[0].field, "email");
        }
    }

    #[test]
    fn enforces_password_bounds() {
        let mut payload = valid_register();
        payload.password = "ab".into();
        let violations = validate_register(&payload, &policy());
        assert_eq!(violations[0].message, "must be at least 3 characters");

        payload.password = "x".repeat(131);
        let violations = validate_register(&payload, &policy());
        assert_eq!(violations[0].message, "must be at most 130 characters");

        payload.password = "x".repeat(130);
        assert!(validate_register(&payload, &policy()).is_empty());
    }

    #[test]
    fn login_requires_both_fields() {
        let payload = LoginRequest {
            email: String::new(),
            password: String::new(),
        };
        let violations = validate_login(&payload);
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[test]
    fn login_checks_email_shape() {
        let payload = LoginRequest {
            email: "nope".into(),
            password: "secret123".into(),
        };
        let violations = validate_login(&payload);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "email");
    }
}
