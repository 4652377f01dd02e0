//! Edition and deletion of comments. Only the author of a comment may reach these
//! pages, anybody else gets a 404 as if the comment did not exist.

use actix_web::{get, post, web, HttpResponse};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::forms::{CommentForm, FormErrors};
use crate::model::Comment;
use crate::routes::news::CommentFormView;
use crate::routes::{redirect, Layout, PageError};
use crate::startup::AppState;
use crate::urls;

#[derive(Debug, Serialize)]
struct EditPage {
    #[serde(flatten)]
    layout: Layout,
    news_title: String,
    news_url: String,
    form: CommentFormView,
}

#[derive(Debug, Serialize)]
struct DeletePage {
    #[serde(flatten)]
    layout: Layout,
    action: String,
    comment_text: String,
    news_url: String,
}

#[get("/edit_comment/{comment_id}/")]
#[tracing::instrument(skip(state))]
pub async fn edit_form(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse, PageError> {
    let comment = find_owned(&state, *comment_id, &user).await?;
    let form = CommentFormView {
        action: urls::edit_comment(comment.id),
        text: comment.text.clone(),
        errors: FormErrors::default(),
    };

    render_edit(&state, comment, user, form).await
}

#[post("/edit_comment/{comment_id}/")]
#[tracing::instrument(skip(state, form))]
pub async fn edit(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, PageError> {
    let comment = find_owned(&state, *comment_id, &user).await?;
    let form = form.into_inner();

    let text = match form.clean() {
        Ok(text) => text,
        Err(errors) => {
            let form = CommentFormView {
                action: urls::edit_comment(comment.id),
                text: form.text,
                errors,
            };
            return render_edit(&state, comment, user, form).await;
        }
    };

    if !state.comments.update_text(comment.id, user.id, &text).await? {
        // Deleted in the meantime
        return Err(PageError::NotFound);
    }

    Ok(redirect(&urls::news_comments(comment.news_id)))
}

#[get("/delete_comment/{comment_id}/")]
#[tracing::instrument(skip(state))]
pub async fn delete_form(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse, PageError> {
    let comment = find_owned(&state, *comment_id, &user).await?;

    let page = DeletePage {
        layout: Layout::new(Some(user)),
        action: urls::delete_comment(comment.id),
        news_url: urls::news_detail(comment.news_id),
        comment_text: comment.text,
    };
    Ok(state.templates.page("comment_delete", &page)?)
}

#[post("/delete_comment/{comment_id}/")]
#[tracing::instrument(skip(state))]
pub async fn delete(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse, PageError> {
    let comment = find_owned(&state, *comment_id, &user).await?;

    if !state.comments.delete(comment.id, user.id).await? {
        return Err(PageError::NotFound);
    }

    Ok(redirect(&urls::news_comments(comment.news_id)))
}

/// The comment, if it exists and has been written by the user
async fn find_owned(
    state: &AppState,
    comment_id: i64,
    user: &AuthenticatedUser,
) -> Result<Comment, PageError> {
    state
        .comments
        .get_owned(comment_id, user.id)
        .await?
        .ok_or(PageError::NotFound)
}

async fn render_edit(
    state: &AppState,
    comment: Comment,
    user: AuthenticatedUser,
    form: CommentFormView,
) -> Result<HttpResponse, PageError> {
    let news = state
        .news
        .get_by_id(comment.news_id)
        .await?
        .ok_or(PageError::NotFound)?;

    let page = EditPage {
        layout: Layout::new(Some(user)),
        news_url: urls::news_detail(news.id),
        news_title: news.title,
        form,
    };
    Ok(state.templates.page("comment_edit", &page)?)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(edit_form)
        .service(edit)
        .service(delete_form)
        .service(delete);
}
