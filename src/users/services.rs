use tracing::{info, warn};

use super::repo::UserStore;
use crate::error::{ApiError, ApiResult};

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 20;

/// Check presence and length of a submitted name. Length counts characters, not bytes.
pub fn validate_name(name: Option<&str>) -> ApiResult<&str> {
    let name = match name {
        Some(n) if !n.is_empty() => n,
        _ => return Err(ApiError::BadRequest("Username is required".into())),
    };

    let len = name.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        warn!(len, "username length out of range");
        return Err(ApiError::BadRequest(format!(
            "Username must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

/// Existence check followed by insert. The two steps are separate statements,
/// so concurrent creates of the same name may both succeed.
pub async fn create_user(store: &dyn UserStore, name: &str) -> ApiResult<String> {
    let exists = store
        .name_exists(name)
        .await
        .map_err(|e| ApiError::persistence("Error checking username", e))?;
    if exists {
        warn!(name, "username already exists");
        return Err(ApiError::Conflict("Username already exists".into()));
    }

    store
        .insert(name)
        .await
        .map_err(|e| ApiError::persistence("Failed to create user", e))?;

    info!(name, "user created");
    Ok(format!("User {name} created successfully"))
}
