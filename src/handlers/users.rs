use axum::{
    body::Bytes,
    extract::State,
    http::{StatusCode, Uri},
    response::Json,
};
use crate::{
    error::{AppError, AppResult},
    models::{CreateUserResponse, MessageResponse, User, UserInput},
    AppState,
};

// The id is the raw first segment after `/users/`, not percent-decoded and
// possibly empty
fn user_id(uri: &Uri) -> &str {
    uri.path()
        .strip_prefix("/users/")
        .and_then(|rest| rest.split('/').next())
        .unwrap_or_default()
}

/// List every user
/// GET /users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let rows = state.db_pool.list_users().await?;

    Ok(Json(rows.into_iter().map(User::from).collect()))
}

/// Create a user from `{name, email, vec?}`
/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<CreateUserResponse>)> {
    let user = UserInput::from_body(&body).into_new_user()?;

    let id = state.db_pool.create_user(&user).await?;
    tracing::info!("Created user {}", id);

    Ok((StatusCode::CREATED, Json(CreateUserResponse { success: true, id })))
}

/// Fetch one user
/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    uri: Uri,
) -> AppResult<Json<User>> {
    let row = state
        .db_pool
        .get_user(user_id(&uri))
        .await?
        .ok_or_else(|| AppError::not_found("Not Found"))?;

    Ok(Json(User::from(row)))
}

/// Replace name, email and vec of a user. Reports success even when no row matched.
/// PUT /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let id = user_id(&uri);
    let user = UserInput::from_body(&body).into_new_user()?;

    let affected = state.db_pool.update_user(id, &user).await?;
    tracing::info!("Updated user {} ({} row(s))", id, affected);

    Ok(Json(MessageResponse::new("Updated successfully")))
}

/// Delete a user. Idempotent: an unknown id still reports success.
/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    uri: Uri,
) -> AppResult<Json<MessageResponse>> {
    let id = user_id(&uri);

    let affected = state.db_pool.delete_user(id).await?;
    tracing::info!("Deleted user {} ({} row(s))", id, affected);

    Ok(Json(MessageResponse::new("Deleted successfully")))
}
