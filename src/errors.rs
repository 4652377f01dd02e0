use actix_web::http::header::{ContentType, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::urls;

const NOT_FOUND_PAGE: &str = include_str!("../templates/404.html");
const SERVER_ERROR_PAGE: &str = include_str!("../templates/500.html");

#[derive(thiserror::Error, Debug)]
pub enum AuthenticationError {
    /// Carries the path the user wanted to reach
    #[error("Login required to access {0}")]
    LoginRequired(String),
    #[error("Invalid session")]
    InvalidSession(#[from] jwt::Error),
    #[error("Session is expired")]
    ExpiredSession,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthenticationError::LoginRequired(_) => StatusCode::FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AuthenticationError::LoginRequired(next) => HttpResponse::Found()
                .insert_header((LOCATION, urls::login_with_next(next)))
                .finish(),
            // Bad session cookies are read as anonymous, these only come from issuing a token
            e => {
                error!(?e, "Authentication failure");
                server_error()
            }
        }
    }
}

/// Errors of the HTML pages
#[derive(thiserror::Error, Debug)]
pub enum PageError {
    /// Also used when the object exists but belongs to someone else
    #[error("Object not found")]
    NotFound,
    #[error("Authentication error {0:?}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::RenderError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::AuthenticationError(e) => e.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            PageError::NotFound => not_found(),
            PageError::AuthenticationError(e) => e.error_response(),
            PageError::DatabaseError(e) => {
                error!(?e, "Unexpected error with the database");
                server_error()
            }
            PageError::TemplateError(e) => {
                error!(?e, "Could not render page");
                server_error()
            }
            PageError::Unexpected(e) => {
                error!(?e, "Unexpected error");
                server_error()
            }
        }
    }
}

pub fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::html())
        .body(NOT_FOUND_PAGE)
}

fn server_error() -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type(ContentType::html())
        .body(SERVER_ERROR_PAGE)
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn login_required_redirects_with_next() {
        let response = AuthenticationError::LoginRequired(String::from("/edit_comment/1/"))
            .error_response();

        assert_that(&response.status()).is_equal_to(StatusCode::FOUND);
        assert_that(&response.headers().get(LOCATION).unwrap().to_str().unwrap())
            .is_equal_to("/auth/login/?next=/edit_comment/1/");
    }

    #[test]
    fn session_failures_are_server_errors() {
        let response = AuthenticationError::ExpiredSession.error_response();

        assert_that(&response.status()).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
        assert_that(&response.headers().get(LOCATION)).is_none();
    }

    #[test]
    fn not_found_is_never_forbidden() {
        let response = PageError::NotFound.error_response();

        assert_that(&response.status()).is_equal_to(StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_are_hidden() {
        let response = PageError::DatabaseError(sqlx::Error::PoolTimedOut).error_response();

        assert_that(&response.status()).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
