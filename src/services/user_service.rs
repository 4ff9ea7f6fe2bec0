use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload, UserListQuery};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::repositories::UserRepository;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

#[derive(Debug)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn create(&self, payload: CreateUserPayload) -> Result<User> {
        self.ensure_email_free(&payload.email).await?;

        let user = self
            .repo
            .create(payload.into_new_user())
            .await
            .inspect_err(|e| log_failure("create user", e))?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, user_id: i64) -> Result<User> {
        self.repo.get_by_id(user_id).await.map_err(|e| match e {
            Error::NotFound(_) => {
                warn!(user_id, "user not found");
                Error::NotFound("User not found".to_string())
            }
            other => {
                log_failure("get user", &other);
                other
            }
        })
    }

    #[instrument(skip(self, payload))]
    pub async fn update(&self, user_id: i64, payload: UpdateUserPayload) -> Result<User> {
        let mut user = self.get_by_id(user_id).await?;

        if let Some(email) = payload.email.as_deref() {
            if email != user.email {
                self.ensure_email_free(email).await?;
            }
        }

        payload.apply_to(&mut user);
        let updated = self.repo.update(&user).await.map_err(|e| match e {
            Error::NotFound(_) => Error::NotFound("User not found".to_string()),
            other => {
                log_failure("update user", &other);
                other
            }
        })?;
        info!(user_id, "user updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64) -> Result<()> {
        let exists = self
            .repo
            .exists(user_id)
            .await
            .inspect_err(|e| log_failure("check user existence", e))?;
        if !exists {
            warn!(user_id, "delete requested for missing user");
            return Err(Error::NotFound("User not found".to_string()));
        }

        self.repo
            .delete(user_id)
            .await
            .inspect_err(|e| log_failure("delete user", e))?;
        info!(user_id, "user deleted");
        Ok(())
    }

    #[instrument(skip(self, query))]
    pub async fn list(&self, query: UserListQuery) -> Result<UserPage> {
        let filter = query.into_filter();
        let (items, total) = self
            .repo
            .list(&filter)
            .await
            .inspect_err(|e| log_failure("list users", e))?;

        info!(count = items.len(), total, "users listed");
        Ok(UserPage {
            items,
            total,
            offset: filter.offset,
            limit: filter.limit,
        })
    }

    async fn ensure_email_free(&self, email: &str) -> Result<()> {
        match self.repo.get_by_email(email).await {
            Ok(Some(_)) => {
                warn!(email, "email already in use");
                Err(Error::Conflict("Email already exists".to_string()))
            }
            Ok(None) => Ok(()),
            Err(e) => {
                log_failure("check email uniqueness", &e);
                Err(e)
            }
        }
    }
}

fn log_failure(operation: &str, err: &Error) {
    match err {
        Error::Conflict(_) | Error::NotFound(_) => warn!(error = %err, "{} rejected", operation),
        _ => error!(error = %err, "failed to {}", operation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::user_dto::DEFAULT_LIMIT;
    use crate::models::user::UserStatus;
    use crate::repositories::MockUserRepository;
    use chrono::Utc;

    fn user(id: i64, email: &str) -> User {
        User {
            id,
            name: "Ada Lovelace".into(),
            email: email.into(),
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn service(mock: MockUserRepository) -> UserService {
        UserService::new(Arc::new(mock))
    }

    fn create_payload(email: &str) -> CreateUserPayload {
        CreateUserPayload {
            name: "Ada Lovelace".into(),
            email: email.into(),
            status: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_status_to_active() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_email().times(1).returning(|_| Ok(None));
        mock.expect_create()
            .withf(|new_user| new_user.status == UserStatus::Active)
            .times(1)
            .returning(|new_user| {
                let mut created = user(1, &new_user.email);
                created.name = new_user.name;
                Ok(created)
            });

        let created = service(mock)
            .create(create_payload("ada@example.com"))
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn create_rejects_taken_email() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_email()
            .returning(|email| Ok(Some(user(5, email))));
        mock.expect_create().never();

        let err = service(mock)
            .create(create_payload("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(msg) if msg == "Email already exists"));
    }

    #[tokio::test]
    async fn create_propagates_lookup_failure() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_email()
            .returning(|_| Err(Error::Internal("connection reset".into())));
        mock.expect_create().never();

        let err = service(mock)
            .create(create_payload("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn create_reports_storage_conflict() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_email().returning(|_| Ok(None));
        mock.expect_create()
            .returning(|_| Err(Error::Conflict("Email already exists".into())));

        let err = service(mock)
            .create(create_payload("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn get_maps_missing_row_to_user_not_found() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_id()
            .returning(|id| Err(Error::NotFound(format!("user not found with id {}", id))));

        let err = service(mock).get_by_id(999_999).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(msg) if msg == "User not found"));
    }

    #[tokio::test]
    async fn update_status_only_keeps_other_fields() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_id()
            .returning(|id| Ok(user(id, "ada@example.com")));
        mock.expect_get_by_email().never();
        mock.expect_update()
            .withf(|u| u.status == UserStatus::Suspended && u.email == "ada@example.com")
            .returning(|u| Ok(u.clone()));

        let updated = service(mock)
            .update(
                3,
                UpdateUserPayload {
                    status: Some(UserStatus::Suspended),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(updated.status, UserStatus::Suspended);
    }

    #[tokio::test]
    async fn update_same_email_skips_duplicate_check() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_id()
            .returning(|id| Ok(user(id, "ada@example.com")));
        mock.expect_get_by_email().never();
        mock.expect_update().returning(|u| Ok(u.clone()));

        let payload = UpdateUserPayload {
            email: Some("ada@example.com".into()),
            ..Default::default()
        };
        assert!(service(mock).update(3, payload).await.is_ok());
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_id()
            .returning(|id| Ok(user(id, "ada@example.com")));
        mock.expect_get_by_email()
            .returning(|email| Ok(Some(user(9, email))));
        mock.expect_update().never();

        let payload = UpdateUserPayload {
            email: Some("grace@example.com".into()),
            ..Default::default()
        };
        let err = service(mock).update(3, payload).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_id()
            .returning(|_| Err(Error::NotFound("gone".into())));
        mock.expect_update().never();

        let err = service(mock)
            .update(42, UpdateUserPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(msg) if msg == "User not found"));
    }

    #[tokio::test]
    async fn delete_checks_existence_first() {
        let mut mock = MockUserRepository::new();
        mock.expect_exists().returning(|_| Ok(false));
        mock.expect_delete().never();

        let err = service(mock).delete(7).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_existing_user() {
        let mut mock = MockUserRepository::new();
        mock.expect_exists().returning(|_| Ok(true));
        mock.expect_delete()
            .withf(|id| *id == 7)
            .times(1)
            .returning(|_| Ok(()));

        assert!(service(mock).delete(7).await.is_ok());
    }

    #[tokio::test]
    async fn list_normalizes_paging() {
        let mut mock = MockUserRepository::new();
        mock.expect_list()
            .withf(|filter| filter.limit == DEFAULT_LIMIT && filter.offset == 0)
            .returning(|_| Ok((vec![user(1, "ada@example.com")], 1)));

        let page = service(mock)
            .list(UserListQuery {
                offset: Some(-4),
                limit: Some(500),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.limit, DEFAULT_LIMIT);
        assert_eq!(page.offset, 0);
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
    }
}
