use std::net::TcpListener;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};

use crate::auth::SessionKey;
use crate::dao::{CommentDao, NewsDao, UserDao};
use crate::database::Pool;
use crate::routes;
use crate::settings::Settings;
use crate::templates::Templates;

/// Everything the handlers share
pub struct AppState {
    pub users: UserDao,
    pub news: NewsDao,
    pub comments: CommentDao,
    pub templates: Templates,
    pub session_key: SessionKey,
    pub settings: Settings,
}

impl AppState {
    pub fn new(database: Pool, settings: Settings) -> anyhow::Result<Self> {
        let session_key = SessionKey::new(
            &settings.session_secret,
            settings.session_ttl_seconds,
            settings.secure_cookies,
        )?;

        Ok(AppState {
            users: UserDao::new(database.clone()),
            news: NewsDao::new(database.clone()),
            comments: CommentDao::new(database),
            templates: Templates::new()?,
            session_key,
            settings,
        })
    }
}

pub async fn startup(state: AppState, listener: TcpListener) -> std::io::Result<()> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(state.settings.rate_limiting_period_ms)
        .burst_size(state.settings.rate_limiting_burst_size)
        .finish()
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Rate limiting period and burst size must be greater than zero",
            )
        })?;
    let state = Data::new(state);

    HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(Governor::new(&governor_conf))
            .app_data(state.clone())
            .configure(routes::configure)
            .service(actix_files::Files::new("/static", "./static/"))
            .default_service(web::to(routes::not_found))
    })
    .listen(listener)?
    .run()
    .await
}
