//! User table operations

use anyhow::Result;
use sqlx::{FromRow, SqlitePool};

use crate::models::{User, UserRole};

/// Database row for user table
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    display_name: String,
    role: String,
    avatar: Option<String>,
    session_nonce: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password: self.password,
            display_name: self.display_name,
            role: UserRole::parse(&self.role).unwrap_or_default(),
            avatar: self.avatar,
            session_nonce: self.session_nonce,
        }
    }
}

/// User table operations
pub struct UserTable;

impl UserTable {
    /// Get user by ID
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM user WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Get user by username
    pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM user WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Insert a user
    pub async fn insert(pool: &SqlitePool, user: &User) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO user (username, password, display_name, role, avatar, session_nonce) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(&user.avatar)
        .bind(&user.session_nonce)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Replace the session nonce, invalidating every token issued so far
    pub async fn rotate_session_nonce(pool: &SqlitePool, id: i64) -> Result<String> {
        let nonce = uuid::Uuid::new_v4().to_string();

        sqlx::query("UPDATE user SET session_nonce = ? WHERE id = ?")
            .bind(&nonce)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(nonce)
    }

    /// Get user count
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user")
            .fetch_one(pool)
            .await?;

        Ok(row.0)
    }
}
