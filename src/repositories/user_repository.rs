use async_trait::async_trait;

use crate::error::Result;
use crate::models::user::{NewUser, User, UserFilter};

/// Storage contract for users. Every read only sees live (not soft-deleted) rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Fails with `Error::NotFound` when the id is unknown or soft-deleted.
    async fn get_by_id(&self, id: i64) -> Result<User>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Saves name, email and status of an already loaded user.
    async fn update(&self, user: &User) -> Result<User>;

    /// Soft delete. Deleting an absent or already deleted id is not an error.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Returns one page plus the total number of matching rows.
    async fn list(&self, filter: &UserFilter) -> Result<(Vec<User>, i64)>;

    async fn exists(&self, id: i64) -> Result<bool>;
}
