use async_trait::async_trait;
use sqlx::PgPool;

use super::{like_pattern, UserRepository};
use crate::error::{Error, Result};
use crate::models::user::{NewUser, User, UserFilter};

const USER_COLUMNS: &str = "id, name, email, status, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let query = format!(
            "INSERT INTO users (name, email, status) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::database("create user", e))
    }

    async fn get_by_id(&self, id: i64) -> Result<User> {
        let query = format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
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
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database("get user by email", e))
    }

    async fn update(&self, user: &User) -> Result<User> {
        let query = format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, status = $4, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database("update user", e))?
            .ok_or_else(|| Error::NotFound(format!("user not found with id {}", user.id)))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database("delete user", e))?;
        Ok(())
    }

    async fn list(&self, filter: &UserFilter) -> Result<(Vec<User>, i64)> {
        let mut filters = vec!["deleted_at IS NULL".to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            filters.push(format!("status = ${}", args.len() + 1));
            args.push(status.as_str().to_string());
        }
        if let Some(search) = &filter.search {
            let n = args.len() + 1;
            filters.push(format!(
                r"(name ILIKE ${n} ESCAPE '\' OR email ILIKE ${n} ESCAPE '\')"
            ));
            args.push(like_pattern(search));
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            USER_COLUMNS,
            where_clause,
            args.len() + 1,
            args.len() + 2
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
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| Error::database("check user existence", e))?;
        Ok(count > 0)
    }
}
