use anyhow::Context;
use tracing::info;

use crate::dao::NewsDao;
use crate::model::NewNews;

/// Load a JSON array of news, e.g. `[{"title": "...", "text": "...", "date": "2024-01-31"}]`
#[tracing::instrument(skip(news_dao))]
pub async fn load_news(news_dao: &NewsDao, path: &str) -> anyhow::Result<usize> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Could not read fixtures file {}", path))?;

    let count = load_news_from_str(news_dao, &content).await?;
    info!("Loaded {} news from {}", count, path);
    Ok(count)
}

pub async fn load_news_from_str(news_dao: &NewsDao, content: &str) -> anyhow::Result<usize> {
    let news: Vec<NewNews> = serde_json::from_str(content).context("Invalid news fixtures")?;

    Ok(news_dao.create_all(&news).await?.len())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use speculoos::prelude::*;

    use crate::database::init_sqlite_connection;

    use super::*;

    #[tokio::test]
    async fn fixtures_are_loaded() {
        let dao = NewsDao::new(init_sqlite_connection("sqlite::memory:").await.unwrap());

        let count = load_news_from_str(
            &dao,
            r#"[
                {"title": "Заголовок новости", "text": "Текст новости", "date": "2024-01-31"},
                {"title": "Без даты", "text": "Сегодня"}
            ]"#,
        )
        .await
        .unwrap();

        let latest = dao.list_latest(10).await.unwrap();
        assert_that(&count).is_equal_to(2);
        assert_that(&latest[1].date).is_equal_to(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[tokio::test]
    async fn broken_fixtures_insert_nothing() {
        let dao = NewsDao::new(init_sqlite_connection("sqlite::memory:").await.unwrap());

        let result = load_news_from_str(&dao, r#"[{"title": "no text"}]"#).await;

        assert_that(&result.is_err()).is_true();
        assert_that(&dao.list_latest(10).await.unwrap()).has_length(0);
    }
}
