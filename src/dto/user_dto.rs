use std::fmt::Display;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::envelope::Pagination;
use crate::models::user::{NewUser, User, UserFilter, UserStatus};
use crate::services::UserPage;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(
        email(message = "Email must be a valid address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    pub status: Option<UserStatus>,
}

impl CreateUserPayload {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            status: self.status.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[validate(
        email(message = "Email must be a valid address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: Option<String>,
    pub status: Option<UserStatus>,
}

impl UpdateUserPayload {
    /// Overwrites only the fields present in the payload.
    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UserListQuery {
    #[serde(deserialize_with = "empty_as_none")]
    pub offset: Option<i64>,
    #[serde(deserialize_with = "empty_as_none")]
    pub limit: Option<i64>,
    #[serde(deserialize_with = "empty_as_none")]
    pub status: Option<UserStatus>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "Search must be at most 100 characters"))]
    pub search: Option<String>,
}

impl UserListQuery {
    /// Out-of-range limits fall back to the default rather than the nearest bound.
    pub fn into_filter(self) -> UserFilter {
        let limit = match self.limit {
            Some(limit) if (1..=MAX_LIMIT).contains(&limit) => limit,
            _ => DEFAULT_LIMIT,
        };
        UserFilter {
            offset: self.offset.unwrap_or(0).max(0),
            limit,
            status: self.status,
            search: self.search,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub data: User,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self { data: user }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<User>,
    pub pagination: Pagination,
}

impl From<UserPage> for UserListResponse {
    fn from(page: UserPage) -> Self {
        Self {
            data: page.items,
            pagination: Pagination {
                offset: page.offset,
                limit: page.limit,
                total: page.total,
            },
        }
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}
