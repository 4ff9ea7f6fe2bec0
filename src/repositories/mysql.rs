use async_trait::async_trait;
use sqlx::MySqlPool;

use super::{like_pattern, UserRepository};
use crate::error::{Error, Result};
use crate::models::user::{NewUser, User, UserFilter};

const USER_COLUMNS: &str = "id, name, email, status, created_at, updated_at, deleted_at";

/// MySQL has no `RETURNING`, so writes re-read the row by id.
#[derive(Clone)]
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (name, email, status) VALUES (?, ?, ?)")
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database("create user", e))?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|_| Error::Internal("inserted id out of range".to_string()))?;
        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: i64) -> Result<User> {
        let query = format!(
            "SELECT {} FROM users WHERE id = ? AND deleted_at IS NULL",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database("get user by id", e))?
            .ok_or_else(|| Error::NotFound(format!("user not found with id {}", id)))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE email = ? AND deleted_at IS NULL",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database("get user by email", e))
    }

    async fn update(&self, user: &User) -> Result<User> {
        // Affected-row counts only reflect changed rows here, so the re-read decides NotFound.
        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, status = ?, updated_at = CURRENT_TIMESTAMP(6)
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.status.as_str())
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database("update user", e))?;

        self.get_by_id(user.id).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE users SET deleted_at = CURRENT_TIMESTAMP(6) WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database("delete user", e))?;
        Ok(())
    }

    async fn list(&self, filter: &UserFilter) -> Result<(Vec<User>, i64)> {
        let mut filters = vec!["deleted_at IS NULL"];
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            filters.push("status = ?");
            args.push(status.as_str().to_string());
        }
        if let Some(search) = &filter.search {
            filters.push("(LOWER(name) LIKE ? OR LOWER(email) LIKE ?)");
            let pattern = like_pattern(search);
            args.push(pattern.clone());
            args.push(pattern);
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            USER_COLUMNS, where_clause
        );
        let total_query = format!("SELECT COUNT(*) FROM users {}", where_clause);

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::database("count users", e))?;

        let mut items_statement = sqlx::query_as::<_, User>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::database("list users", e))?;

        Ok((items, total))
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ? AND deleted_at IS NULL")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| Error::database("check user existence", e))?;
        Ok(count > 0)
    }
}
