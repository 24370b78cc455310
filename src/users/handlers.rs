use axum::{
    extract::{rejection::FormRejection, State},
    http::Method,
    routing::{get, post},
    Form, Router,
};
use tracing::{instrument, warn};

use super::{dto::CreateUserForm, dto::UserRecord, repo::StoreError, services};
use crate::{
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).fallback(only_get))
        .route("/create", post(create_user).fallback(only_post))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    let users = state.store.list().await.map_err(|e| {
        let context = match &e {
            StoreError::Decode(_) => "Failed to scan user",
            StoreError::Query(_) => "Failed to query users",
        };
        ApiError::persistence(context, e)
    })?;

    let users = users.into_iter().map(UserRecord::from).collect();
    Ok(ApiResponse::users(users))
}

#[instrument(skip(state, form))]
pub async fn create_user(
    State(state): State<AppState>,
    form: Result<Form<CreateUserForm>, FormRejection>,
) -> ApiResult<ApiResponse> {
    let form = match form {
        Ok(Form(form)) => form,
        // Not a form body (JSON, no Content-Type, ...): no fields were submitted.
        Err(FormRejection::InvalidFormContentType(_)) => CreateUserForm { name: None },
        Err(e) => {
            warn!(error = %e, "form parse failed");
            return Err(ApiError::BadRequest("Failed to parse form data".into()));
        }
    };

    let name = services::validate_name(form.name.as_deref())?;
    let message = services::create_user(state.store.as_ref(), name).await?;
    Ok(ApiResponse::created(message))
}

async fn only_get(method: Method) -> ApiError {
    warn!(%method, "method not allowed");
    ApiError::MethodNotAllowed("Invalid request method. Only GET is allowed".into())
}

async fn only_post(method: Method) -> ApiError {
    warn!(%method, "method not allowed");
    ApiError::MethodNotAllowed("Invalid request method. Only POST is allowed".into())
}
