use tracing::{info, warn};

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::store::{NewUser, StoreError, UserStore};
use crate::auth::validate::{validate_login, validate_register};
use crate::config::PasswordPolicy;
use crate::error::ApiError;

/// Register a new account. Succeeds silently; login is a separate step.
pub async fn register(
    store: &dyn UserStore,
    policy: &PasswordPolicy,
    mut payload: RegisterRequest,
) -> Result<(), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let violations = validate_register(&payload, policy);
    if !violations.is_empty() {
        warn!(count = violations.len(), "register payload invalid");
        return Err(ApiError::Validation(violations));
    }

    // Friendly fast path; the store's uniqueness constraint is the
    // authority when two registrations race (see create_user below).
    let existing = store
        .get_user_by_email(&payload.email)
        .await
        .map_err(ApiError::Store)?;
    if existing.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateAccount);
    }

    // Never fall back to storing the plaintext.
    let password_hash = hash_password(&payload.password).map_err(ApiError::Internal)?;

    let user = match store
        .create_user(NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::UniqueViolation) => {
            warn!("concurrent registration lost the race");
            return Err(ApiError::DuplicateAccount);
        }
        Err(e) => return Err(ApiError::Store(e)),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(())
}

/// Authenticate and issue a bearer token. Unknown email and wrong
/// password are deliberately the same error, so a caller cannot probe
/// which accounts exist.
pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    mut payload: LoginRequest,
) -> Result<String, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let violations = validate_login(&payload);
    if !violations.is_empty() {
        warn!(count = violations.len(), "login payload invalid");
        return Err(ApiError::Validation(violations));
    }

    let user = match store
        .get_user_by_email(&payload.email)
        .await
        .map_err(ApiError::Store)?
    {
        Some(user) => user,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = keys.sign(user.id).map_err(ApiError::Internal)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(token)
}
