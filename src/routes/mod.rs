use actix_web::http::header::LOCATION;
use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::urls;

pub mod auth;
pub mod comments;
pub mod news;

pub use crate::errors::PageError;

/// Links of the navigation bar
#[derive(Debug, Serialize)]
pub struct NavUrls {
    home: &'static str,
    login: &'static str,
    logout: &'static str,
    signup: &'static str,
}

/// What every page needs to render its layout
#[derive(Debug, Serialize)]
pub struct Layout {
    user: Option<AuthenticatedUser>,
    urls: NavUrls,
}

impl Layout {
    pub fn new(user: Option<AuthenticatedUser>) -> Self {
        Layout {
            user,
            urls: NavUrls {
                home: urls::HOME,
                login: urls::LOGIN,
                logout: urls::LOGOUT,
                signup: urls::SIGNUP,
            },
        }
    }
}

/// Fallback for unknown paths
pub async fn not_found() -> HttpResponse {
    crate::errors::not_found()
}

/// 302 to the given location
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(news::configure)
        .configure(comments::configure)
        .configure(auth::configure);
}
