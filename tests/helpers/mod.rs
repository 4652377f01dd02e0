#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::LOCATION;
use actix_web::test;
use actix_web::web::Data;
use chrono::{Duration, Local, Utc};

use yanews::auth::AuthenticatedUser;
use yanews::database::init_sqlite_connection;
use yanews::model::{Comment, NewComment, NewNews, News, User};
use yanews::password::UNUSABLE_PASSWORD;
use yanews::settings::Settings;
use yanews::startup::AppState;

pub const SECRET: &str = "a secret only tests know about";
pub const NEW_COMMENT_TEXT: &str = "Новый текст комментария";

/// Build the application service around the given state
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(yanews::routes::configure),
        )
        .await
    };
}

pub async fn configure_state() -> Data<AppState> {
    let db = init_sqlite_connection("sqlite::memory:").await.unwrap();
    Data::new(AppState::new(db, Settings::with_secret(SECRET)).unwrap())
}

pub async fn author(state: &AppState) -> User {
    state.users.insert_user("Автор", UNUSABLE_PASSWORD).await.unwrap()
}

pub async fn commentator(state: &AppState) -> User {
    state
        .users
        .insert_user("Комментатор", UNUSABLE_PASSWORD)
        .await
        .unwrap()
}

pub async fn news(state: &AppState) -> News {
    state
        .news
        .create(&NewNews {
            title: String::from("Заголовок новости"),
            text: String::from("Текст новости"),
            date: None,
        })
        .await
        .unwrap()
}

/// One more news than the home page displays, `Новость 0` being the most recent
pub async fn news_bulk(state: &AppState) -> Vec<News> {
    let today = Local::now().date_naive();
    let bulk: Vec<NewNews> = (0..=state.settings.news_count_on_home_page)
        .map(|index| NewNews {
            title: format!("Новость {}", index),
            text: String::from("Просто текст."),
            date: Some(today - Duration::days(index)),
        })
        .collect();

    state.news.create_all(&bulk).await.unwrap()
}

pub async fn comment(state: &AppState, author: &User, news: &News) -> Comment {
    let id = state
        .comments
        .create(&NewComment {
            news_id: news.id,
            author_id: author.id,
            text: String::from("Текст комментария"),
            created: Utc::now(),
        })
        .await
        .unwrap();

    state.comments.get_by_id(id).await.unwrap().unwrap()
}

/// Two comments, a day apart, inserted newest first
pub async fn comments_bulk(state: &AppState, author: &User, news: &News) {
    let now = Utc::now();
    for index in (0..2).rev() {
        state
            .comments
            .create(&NewComment {
                news_id: news.id,
                author_id: author.id,
                text: format!("Текст комментария {}", index),
                created: now + Duration::days(index),
            })
            .await
            .unwrap();
    }
}

/// Session cookie of the given user, as set by the login page
pub fn session(state: &AppState, user: &User) -> Cookie<'static> {
    state
        .session_key
        .session_cookie(&AuthenticatedUser::from_user(user))
        .unwrap()
}

/// Payload of the comment form, with the extra fields browsers of the old site used to send
pub fn form_data(news: &News, author: &User) -> Vec<(&'static str, String)> {
    vec![
        ("news", news.id.to_string()),
        ("author", author.id.to_string()),
        ("text", NEW_COMMENT_TEXT.to_owned()),
    ]
}

pub fn location(response: &ServiceResponse) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("A redirection should have a location")
        .to_str()
        .unwrap()
        .to_owned()
}

pub async fn body(response: ServiceResponse) -> String {
    String::from_utf8(test::read_body(response).await.to_vec()).unwrap()
}
