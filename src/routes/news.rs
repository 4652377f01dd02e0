use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::forms::{CommentForm, FormErrors};
use crate::model::{Comment, NewComment, News};
use crate::routes::{redirect, Layout, PageError};
use crate::startup::AppState;
use crate::urls;

#[derive(Debug, Serialize)]
pub struct NewsView {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
    pub date_display: String,
    pub url: String,
}

impl From<News> for NewsView {
    fn from(news: News) -> Self {
        NewsView {
            id: news.id,
            url: urls::news_detail(news.id),
            date_display: news.date.format("%d.%m.%Y").to_string(),
            title: news.title,
            text: news.text,
            date: news.date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
    pub created_display: String,
    /// Whether the viewer wrote this comment
    pub is_owner: bool,
    pub edit_url: String,
    pub delete_url: String,
}

impl CommentView {
    fn new(comment: Comment, viewer: Option<&AuthenticatedUser>) -> Self {
        CommentView {
            id: comment.id,
            is_owner: viewer.map(|v| v.id == comment.author_id).unwrap_or(false),
            edit_url: urls::edit_comment(comment.id),
            delete_url: urls::delete_comment(comment.id),
            created_display: comment.created.format("%d.%m.%Y %H:%M").to_string(),
            author: comment.author_username,
            text: comment.text,
            created: comment.created,
        }
    }
}

/// A comment form, as displayed to the user
#[derive(Debug, Serialize)]
pub struct CommentFormView {
    pub action: String,
    pub text: String,
    pub errors: FormErrors,
}

impl CommentFormView {
    pub fn blank(action: String) -> Self {
        CommentFormView {
            action,
            text: String::new(),
            errors: FormErrors::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HomePage {
    #[serde(flatten)]
    layout: Layout,
    news_list: Vec<NewsView>,
}

#[derive(Debug, Serialize)]
struct DetailPage {
    #[serde(flatten)]
    layout: Layout,
    news: NewsView,
    comments: Vec<CommentView>,
    /// Only there for authenticated users
    form: Option<CommentFormView>,
    login_url: String,
}

#[get("/")]
#[tracing::instrument(skip(state))]
pub async fn home(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
) -> Result<HttpResponse, PageError> {
    let news_list = state
        .news
        .list_latest(state.settings.news_count_on_home_page)
        .await?
        .into_iter()
        .map(NewsView::from)
        .collect();

    let page = HomePage {
        layout: Layout::new(user),
        news_list,
    };
    Ok(state.templates.page("home", &page)?)
}

#[get("/news/{news_id}/")]
#[tracing::instrument(skip(state))]
pub async fn detail(
    state: web::Data<AppState>,
    news_id: web::Path<i64>,
    user: Option<AuthenticatedUser>,
) -> Result<HttpResponse, PageError> {
    let news = find_news(&state, *news_id).await?;
    let form = user
        .as_ref()
        .map(|_| CommentFormView::blank(urls::news_detail(news.id)));

    render_detail(&state, news, user, form).await
}

#[post("/news/{news_id}/")]
#[tracing::instrument(skip(state, form))]
pub async fn add_comment(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    news_id: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, PageError> {
    let news = find_news(&state, *news_id).await?;
    let form = form.into_inner();

    let text = match form.clean() {
        Ok(text) => text,
        Err(errors) => {
            tracing::debug!(?errors, "Refused comment");
            let form = CommentFormView {
                action: urls::news_detail(news.id),
                text: form.text,
                errors,
            };
            return render_detail(&state, news, Some(user), Some(form)).await;
        }
    };

    state
        .comments
        .create(&NewComment {
            news_id: news.id,
            author_id: user.id,
            text,
            created: Utc::now(),
        })
        .await?;

    Ok(redirect(&urls::news_comments(news.id)))
}

async fn find_news(state: &AppState, news_id: i64) -> Result<News, PageError> {
    state
        .news
        .get_by_id(news_id)
        .await?
        .ok_or(PageError::NotFound)
}

async fn render_detail(
    state: &AppState,
    news: News,
    user: Option<AuthenticatedUser>,
    form: Option<CommentFormView>,
) -> Result<HttpResponse, PageError> {
    let comments = state
        .comments
        .list_for_news(news.id)
        .await?
        .into_iter()
        .map(|comment| CommentView::new(comment, user.as_ref()))
        .collect();

    let page = DetailPage {
        login_url: urls::login_with_next(&urls::news_detail(news.id)),
        layout: Layout::new(user),
        news: NewsView::from(news),
        comments,
        form,
    };
    Ok(state.templates.page("detail", &page)?)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home).service(detail).service(add_comment);
}
