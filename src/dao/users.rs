use chrono::Utc;
use secrecy::Secret;
use sqlx::Result;
use tracing::{info, instrument};

use crate::database::Pool;
use crate::model::User;
use crate::password::encode_password;

#[derive(Clone)]
pub struct UserDao {
    db: Pool,
}

impl UserDao {
    pub fn new(db: Pool) -> Self {
        UserDao { db }
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_username(&self, wanted_username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, date_joined FROM users WHERE username = ?
            "#,
        )
        .bind(wanted_username)
        .fetch_optional(&self.db)
        .await
    }

    /// Return the user matching the id
    #[instrument(skip(self), level = "debug")]
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, date_joined FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    /// Create a new user, hashing its password
    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        login: &str,
        password: &Secret<String>,
    ) -> anyhow::Result<User> {
        let user = self.insert_user(login, &encode_password(password)?).await?;

        info!("Created user {}", user.id);
        Ok(user)
    }

    /// Insert a user with an already encoded password
    #[instrument(skip(self, encoded_password))]
    pub async fn insert_user(&self, login: &str, encoded_password: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, date_joined) VALUES (?, ?, ?)
            RETURNING id, username, password, date_joined
            "#,
        )
        .bind(login)
        .bind(encoded_password)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await
    }

    #[instrument(skip(self))]
    pub async fn count_users(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.db)
            .await
    }
}
