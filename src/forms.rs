//! Submitted forms and their validation rules.
//!
//! Every form deserializes leniently (missing fields are empty strings) and is then
//! checked by its `clean` method, which either returns the cleaned value or the
//! errors to display next to each field.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// Words that can't be published in a comment
pub const BAD_WORDS: [&str; 2] = ["редиска", "негодяй"];
/// Error displayed when a comment contains one of the [`BAD_WORDS`]
pub const WARNING: &str = "Не ругайтесь!";
pub const REQUIRED: &str = "Обязательное поле.";
pub const INVALID_LOGIN: &str = "Пожалуйста, введите правильные имя пользователя и пароль. \
                                 Оба поля могут быть чувствительны к регистру.";
pub const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";
pub const INVALID_USERNAME: &str = "Введите правильное имя пользователя. Оно может содержать \
                                    только буквы, цифры и знаки @/./+/-/_.";
pub const PASSWORD_MISMATCH: &str = "Введенные пароли не совпадают.";
pub const PASSWORD_TOO_SHORT: &str =
    "Введённый пароль слишком короткий. Он должен содержать как минимум 8 символов.";
pub const PASSWORD_NUMERIC: &str = "Введённый пароль состоит только из цифр.";

const USERNAME_MAX_LENGTH: usize = 150;
const PASSWORD_MIN_LENGTH: usize = 8;

/// Errors of a form, by field name. `__all__` holds errors not tied to a field.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<&'static str>>);

impl FormErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.entry(field).or_default().push(message);
    }

    pub fn field(&self, field: &str) -> &[&'static str] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Whether the text contains a banned word. Matches on raw substrings, so words
/// merely containing a banned one are refused as well.
pub fn contains_bad_words(text: &str) -> bool {
    let lowered_text = text.to_lowercase();
    BAD_WORDS.iter().any(|word| lowered_text.contains(word))
}

/// # Comment creation and edition form
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    /// Return the text to store
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();

        if self.text.trim().is_empty() {
            errors.add("text", REQUIRED);
        } else if contains_bad_words(&self.text) {
            errors.add("text", WARNING);
        }

        errors.into_result(self.text.clone())
    }
}

/// # Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret")]
    pub password: Secret<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Check that both fields are filled in
    pub fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.expose_secret().is_empty() {
            errors.add("password", REQUIRED);
        }

        errors.into_result(())
    }
}

/// # Sign up form
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret")]
    pub password1: Secret<String>,
    #[serde(default = "empty_secret")]
    pub password2: Secret<String>,
}

impl SignupForm {
    /// Validate everything but the username uniqueness, which needs the database
    pub fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        let username = self.username.trim();

        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if !is_valid_username(username) {
            errors.add("username", INVALID_USERNAME);
        }

        let password1 = self.password1.expose_secret();
        let password2 = self.password2.expose_secret();
        if password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if password1 != password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        } else {
            if password1.chars().count() < PASSWORD_MIN_LENGTH {
                errors.add("password2", PASSWORD_TOO_SHORT);
            }
            if password1.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password2", PASSWORD_NUMERIC);
            }
        }

        errors.into_result(())
    }
}

fn is_valid_username(username: &str) -> bool {
    username.chars().count() <= USERNAME_MAX_LENGTH
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}
