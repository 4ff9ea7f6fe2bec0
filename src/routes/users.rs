use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::{
        envelope::ErrorBody,
        user_dto::{
            CreateUserPayload, UpdateUserPayload, UserListQuery, UserListResponse, UserResponse,
        },
    },
    error::Result,
    routes::extract::{AppJson, AppPath, AppQuery},
    AppState,
};

#[utoipa::path(
    get,
    path = "/v1/users",
    params(
        ("offset" = Option<i64>, Query, description = "Rows to skip, negative values count as 0"),
        ("limit" = Option<i64>, Query, description = "Page size between 1 and 100, otherwise 20"),
        ("status" = Option<String>, Query, description = "active, inactive or suspended"),
        ("search" = Option<String>, Query, description = "Case-insensitive match on name or email")
    ),
    responses(
        (status = 200, description = "One page of users", body = UserListResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserListQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let page = state.user_service.list(query).await?;
    Ok(Json(UserListResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(
        ("id" = u32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid user ID", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<u32>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_id(i64::from(id)).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.create(payload).await?;
    let location = format!("/v1/users/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserResponse::from(user)),
    ))
}

#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    params(
        ("id" = u32, Path, description = "User ID")
    ),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<u32>,
    AppJson(payload): AppJson<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.update(i64::from(id), payload).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(
        ("id" = u32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid user ID", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<u32>,
) -> Result<impl IntoResponse> {
    state.user_service.delete(i64::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
