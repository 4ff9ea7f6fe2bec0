use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::{
    dto::{
        envelope::{ErrorBody, ErrorDetail, Pagination},
        user_dto::{CreateUserPayload, UpdateUserPayload, UserListResponse, UserResponse},
    },
    models::user::{User, UserStatus},
    routes::{health, users},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::ready,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
    ),
    components(schemas(
        User,
        UserStatus,
        CreateUserPayload,
        UpdateUserPayload,
        UserResponse,
        UserListResponse,
        Pagination,
        ErrorBody,
        ErrorDetail,
    )),
    tags((name = "users", description = "User management"))
)]
pub struct ApiDoc;

#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
