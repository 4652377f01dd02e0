use chrono::Local;
use sqlx::Result;
use tracing::instrument;

use crate::database::Pool;
use crate::model::{NewNews, News};

#[derive(Clone)]
pub struct NewsDao {
    db: Pool,
}

impl NewsDao {
    pub fn new(db: Pool) -> Self {
        NewsDao { db }
    }

    /// Most recent news first, at most `limit` of them
    #[instrument(skip(self))]
    pub async fn list_latest(&self, limit: i64) -> Result<Vec<News>> {
        sqlx::query_as::<_, News>(
            r#"
            SELECT id, title, text, date FROM news
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Option<News>> {
        sqlx::query_as::<_, News>(r#"SELECT id, title, text, date FROM news WHERE id = ?"#)
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    #[instrument(skip(self, news), fields(title = %news.title))]
    pub async fn create(&self, news: &NewNews) -> Result<News> {
        let date = news.date.unwrap_or_else(|| Local::now().date_naive());

        sqlx::query_as::<_, News>(
            r#"
            INSERT INTO news (title, text, date) VALUES (?, ?, ?)
            RETURNING id, title, text, date
            "#,
        )
        .bind(&news.title)
        .bind(&news.text)
        .bind(date)
        .fetch_one(&self.db)
        .await
    }

    /// Insert a batch of news in a single transaction
    #[instrument(skip_all, fields(count = news.len()))]
    pub async fn create_all(&self, news: &[NewNews]) -> Result<Vec<News>> {
        let mut transaction = self.db.begin().await?;
        let mut created = Vec::with_capacity(news.len());

        for item in news {
            let date = item.date.unwrap_or_else(|| Local::now().date_naive());
            let inserted = sqlx::query_as::<_, News>(
                r#"
                INSERT INTO news (title, text, date) VALUES (?, ?, ?)
                RETURNING id, title, text, date
                "#,
            )
            .bind(&item.title)
            .bind(&item.text)
            .bind(date)
            .fetch_one(&mut *transaction)
            .await?;
            created.push(inserted);
        }

        transaction.commit().await?;
        Ok(created)
    }
}
