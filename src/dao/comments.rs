use sqlx::Result;
use tracing::{info, instrument};

use crate::database::Pool;
use crate::model::{Comment, NewComment};

const SELECT_COMMENTS: &str = r#"
    SELECT  comments.id,
            comments.news_id,
            comments.author_id,
            users.username AS author_username,
            comments.text,
            comments.created
    FROM    comments
            JOIN users ON users.id = comments.author_id
"#;

#[derive(Clone)]
pub struct CommentDao {
    db: Pool,
}

impl CommentDao {
    pub fn new(db: Pool) -> Self {
        CommentDao { db }
    }

    /// Comments of a news, oldest first
    #[instrument(skip(self))]
    pub async fn list_for_news(&self, news_id: i64) -> Result<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "{SELECT_COMMENTS} WHERE comments.news_id = ? \
             ORDER BY comments.created ASC, comments.id ASC"
        ))
        .bind(news_id)
        .fetch_all(&self.db)
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!("{SELECT_COMMENTS} WHERE comments.id = ?"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    /// Return the comment only if it has been written by the given author
    #[instrument(skip(self))]
    pub async fn get_owned(&self, id: i64, author_id: i64) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "{SELECT_COMMENTS} WHERE comments.id = ? AND comments.author_id = ?"
        ))
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.db)
        .await
    }

    #[instrument(
        skip(self, comment),
        fields(news_id = comment.news_id, author_id = comment.author_id)
    )]
    pub async fn create(&self, comment: &NewComment) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (news_id, author_id, text, created) VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(comment.news_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created)
        .fetch_one(&self.db)
        .await?;

        info!("Created comment {}", id);
        Ok(id)
    }

    /// Update the text of a comment owned by the author. Returns false when nothing matched.
    #[instrument(skip(self, text))]
    pub async fn update_text(&self, id: i64, author_id: i64, text: &str) -> Result<bool> {
        let result = sqlx::query(r#"UPDATE comments SET text = ? WHERE id = ? AND author_id = ?"#)
            .bind(text)
            .bind(id)
            .bind(author_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a comment owned by the author. Returns false when nothing matched.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64, author_id: i64) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM comments WHERE id = ? AND author_id = ?"#)
            .bind(id)
            .bind(author_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() > 0 {
            info!("Deleted comment {}", id);
        }
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM comments"#)
            .fetch_one(&self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use speculoos::prelude::*;

    use crate::dao::{NewsDao, UserDao};
    use crate::database::init_sqlite_connection;
    use crate::model::NewNews;
    use crate::password::UNUSABLE_PASSWORD;

    use super::*;

    struct Fixture {
        dao: CommentDao,
        news_id: i64,
        author_id: i64,
        other_id: i64,
    }

    async fn fixture() -> Fixture {
        let db = init_sqlite_connection("sqlite::memory:").await.unwrap();
        let users = UserDao::new(db.clone());
        let author = users.insert_user("Автор", UNUSABLE_PASSWORD).await.unwrap();
        let other = users.insert_user("Комментатор", UNUSABLE_PASSWORD).await.unwrap();
        let news = NewsDao::new(db.clone())
            .create(&NewNews {
                title: String::from("Заголовок новости"),
                text: String::from("Текст новости"),
                date: None,
            })
            .await
            .unwrap();

        Fixture {
            dao: CommentDao::new(db),
            news_id: news.id,
            author_id: author.id,
            other_id: other.id,
        }
    }

    fn comment(fixture: &Fixture, text: &str, offset: Duration) -> NewComment {
        NewComment {
            news_id: fixture.news_id,
            author_id: fixture.author_id,
            text: text.to_owned(),
            created: Utc::now() + offset,
        }
    }

    #[tokio::test]
    async fn thread_is_oldest_first() {
        let fixture = fixture().await;
        // Newest inserted first
        fixture
            .dao
            .create(&comment(&fixture, "Текст комментария 1", Duration::days(1)))
            .await
            .unwrap();
        fixture
            .dao
            .create(&comment(&fixture, "Текст комментария 0", Duration::zero()))
            .await
            .unwrap();

        let thread = fixture.dao.list_for_news(fixture.news_id).await.unwrap();

        assert_that(&thread).has_length(2);
        assert_that(&thread[0].created).is_less_than(thread[1].created);
        assert_that(&thread[0].text).is_equal_to(String::from("Текст комментария 0"));
        assert_that(&thread[1].author_username).is_equal_to(String::from("Автор"));
    }

    #[tokio::test]
    async fn only_the_author_can_update_or_delete() {
        let fixture = fixture().await;
        let id = fixture
            .dao
            .create(&comment(&fixture, "Текст комментария", Duration::zero()))
            .await
            .unwrap();

        assert_that(&fixture.dao.get_owned(id, fixture.other_id).await.unwrap()).is_none();
        assert_that(&fixture.dao.update_text(id, fixture.other_id, "Взлом").await.unwrap())
            .is_false();
        assert_that(&fixture.dao.delete(id, fixture.other_id).await.unwrap()).is_false();

        let untouched = fixture.dao.get_by_id(id).await.unwrap().unwrap();
        assert_that(&untouched.text).is_equal_to(String::from("Текст комментария"));

        assert_that(&fixture.dao.update_text(id, fixture.author_id, "Новый текст").await.unwrap())
            .is_true();
        let updated = fixture.dao.get_owned(id, fixture.author_id).await.unwrap().unwrap();
        assert_that(&updated.text).is_equal_to(String::from("Новый текст"));

        assert_that(&fixture.dao.delete(id, fixture.author_id).await.unwrap()).is_true();
        assert_that(&fixture.dao.count().await.unwrap()).is_equal_to(0);
    }
}
