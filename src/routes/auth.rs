use actix_web::{get, post, web, HttpResponse};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::forms::{FormErrors, LoginForm, SignupForm, INVALID_LOGIN, USERNAME_TAKEN};
use crate::password::verify_password;
use crate::routes::{redirect, Layout, PageError};
use crate::startup::AppState;
use crate::urls;

#[derive(Deserialize, Debug)]
pub struct NextParameter {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginPage {
    #[serde(flatten)]
    layout: Layout,
    username: String,
    next: Option<String>,
    errors: FormErrors,
}

#[derive(Debug, Serialize)]
struct SignupPage {
    #[serde(flatten)]
    layout: Layout,
    username: String,
    errors: FormErrors,
}

#[get("/auth/login/")]
#[tracing::instrument(skip(state))]
pub async fn login_form(
    state: web::Data<AppState>,
    query: web::Query<NextParameter>,
    user: Option<AuthenticatedUser>,
) -> Result<HttpResponse, PageError> {
    let page = LoginPage {
        layout: Layout::new(user),
        username: String::new(),
        next: query.into_inner().next,
        errors: FormErrors::default(),
    };

    Ok(state.templates.page("login", &page)?)
}

#[post("/auth/login/")]
#[tracing::instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, PageError> {
    let form = form.into_inner();

    if let Err(errors) = form.clean() {
        return render_login(&state, form, errors);
    }

    let user = state.users.get_user_by_username(form.username.trim()).await?;
    let authenticated = match &user {
        Some(user) => password_matches(user.password.clone(), &form).await?,
        None => false,
    };

    let user = match user {
        Some(user) if authenticated => user,
        _ => {
            tracing::info!("Failed login attempt");
            let mut errors = FormErrors::default();
            errors.add(FormErrors::NON_FIELD, INVALID_LOGIN);
            return render_login(&state, form, errors);
        }
    };

    let cookie = state
        .session_key
        .session_cookie(&AuthenticatedUser::from_user(&user))?;
    let target = form
        .next
        .as_deref()
        .filter(|next| urls::is_safe_redirect(next))
        .unwrap_or(urls::HOME);

    tracing::info!("User {} logged in", user.id);
    let mut response = redirect(target);
    response
        .add_cookie(&cookie)
        .map_err(|e| anyhow!("Could not set the session cookie: {}", e))?;
    Ok(response)
}

#[get("/auth/logout/")]
#[tracing::instrument(skip(state))]
pub async fn logout_page(state: web::Data<AppState>) -> Result<HttpResponse, PageError> {
    logout_response(&state)
}

#[post("/auth/logout/")]
#[tracing::instrument(skip(state))]
pub async fn logout(state: web::Data<AppState>) -> Result<HttpResponse, PageError> {
    logout_response(&state)
}

#[get("/auth/signup/")]
#[tracing::instrument(skip(state))]
pub async fn signup_form(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
) -> Result<HttpResponse, PageError> {
    let page = SignupPage {
        layout: Layout::new(user),
        username: String::new(),
        errors: FormErrors::default(),
    };

    Ok(state.templates.page("signup", &page)?)
}

#[post("/auth/signup/")]
#[tracing::instrument(skip(state, form), fields(username = %form.username))]
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, PageError> {
    let form = form.into_inner();
    let username = form.username.trim().to_owned();

    let mut errors = form.clean().err().unwrap_or_default();
    if errors.field("username").is_empty()
        && state.users.get_user_by_username(&username).await?.is_some()
    {
        errors.add("username", USERNAME_TAKEN);
    }

    if !errors.is_empty() {
        let page = SignupPage {
            layout: Layout::new(None),
            username,
            errors,
        };
        return Ok(state.templates.page("signup", &page)?);
    }

    state.users.create_user(&username, &form.password1).await?;

    Ok(redirect(urls::LOGIN))
}

/// Argon2 is slow on purpose, keep it off the async workers
async fn password_matches(hash: String, form: &LoginForm) -> Result<bool, PageError> {
    let candidate = form.password.clone();

    web::block(move || verify_password(&hash, &candidate))
        .await
        .map_err(|e| PageError::Unexpected(anyhow!("Password verification failed: {}", e)))
}

fn render_login(
    state: &AppState,
    form: LoginForm,
    errors: FormErrors,
) -> Result<HttpResponse, PageError> {
    let page = LoginPage {
        layout: Layout::new(None),
        username: form.username,
        next: form.next,
        errors,
    };

    Ok(state.templates.page("login", &page)?)
}

fn logout_response(state: &AppState) -> Result<HttpResponse, PageError> {
    let mut response = state.templates.page("logout", &Layout::new(None))?;
    response
        .add_cookie(&state.session_key.removal_cookie())
        .map_err(|e| anyhow!("Could not clear the session cookie: {}", e))?;

    Ok(response)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login_form)
        .service(login)
        .service(logout_page)
        .service(logout)
        .service(signup_form)
        .service(signup);
}
