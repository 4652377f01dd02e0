use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A published piece of news
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

/// News to be inserted in the database
#[derive(Debug, Deserialize)]
pub struct NewNews {
    pub title: String,
    pub text: String,
    /// Defaults to the current day
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// A comment, along with its author's name
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// Comment to be inserted in the database
#[derive(Debug)]
pub struct NewComment {
    pub news_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// A YaNews user
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)] // Never ever serialize this field
    pub password: String,
    pub date_joined: DateTime<Utc>,
}
