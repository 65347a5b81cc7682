//! Accounts.

use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duka_auth::{AuthError, Role, User, UserRepository};
use duka_commerce::ids::UserId;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, name, phone, role, password_hash, created_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    phone: Option<String>,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(DbError::Decode)?;
        Ok(User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            name: row.name,
            phone: row.phone,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

/// Account repository on Postgres.
#[derive(Debug, Clone)]
pub struct PgUsers {
    pool: PgPool,
}

impl PgUsers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn create(&self, user: &User) -> Result<(), AuthError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, phone, role, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from);
        match result {
            Ok(_) => Ok(()),
            Err(DbError::Conflict(_)) => Err(AuthError::EmailTaken(user.email.clone())),
            Err(other) => Err(other.into()),
        }
    }
}
