//! Paths of the named routes, so that handlers and templates never build them by hand.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const HOME: &str = "/";
pub const LOGIN: &str = "/auth/login/";
pub const LOGOUT: &str = "/auth/logout/";
pub const SIGNUP: &str = "/auth/signup/";

/// Characters left untouched in the `next` parameter
const NEXT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn news_detail(news_id: i64) -> String {
    format!("/news/{}/", news_id)
}

/// Where to land after a comment has been posted, edited or deleted
pub fn news_comments(news_id: i64) -> String {
    format!("{}#comments", news_detail(news_id))
}

pub fn edit_comment(comment_id: i64) -> String {
    format!("/edit_comment/{}/", comment_id)
}

pub fn delete_comment(comment_id: i64) -> String {
    format!("/delete_comment/{}/", comment_id)
}

/// Login page, coming back to `next` once authenticated
pub fn login_with_next(next: &str) -> String {
    format!("{}?next={}", LOGIN, utf8_percent_encode(next, NEXT_ENCODE_SET))
}

/// Only local absolute paths are followed after a login. Browsers drop tabs and
/// newlines while parsing, so `/\t/host` would turn into `//host`.
pub fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn login_keeps_slashes_of_next() {
        assert_that(&login_with_next("/news/1/"))
            .is_equal_to(String::from("/auth/login/?next=/news/1/"));
    }

    #[test]
    fn login_encodes_query_of_next() {
        assert_that(&login_with_next("/news/1/?a=b&c"))
            .is_equal_to(String::from("/auth/login/?next=/news/1/%3Fa%3Db%26c"));
    }

    #[test]
    fn comments_anchor() {
        assert_that(&news_comments(3)).is_equal_to(String::from("/news/3/#comments"));
    }

    #[test]
    fn only_local_redirects_are_safe() {
        assert_that(&is_safe_redirect("/news/1/")).is_true();
        assert_that(&is_safe_redirect("//evil.example")).is_false();
        assert_that(&is_safe_redirect("https://evil.example")).is_false();
        assert_that(&is_safe_redirect("/\\evil.example")).is_false();
        assert_that(&is_safe_redirect("")).is_false();
    }

    #[test]
    fn control_characters_are_not_safe() {
        for target in ["/\t/evil.example", "/\n/evil.example", "/\r/evil.example", "/news/\u{0}"] {
            assert_that(&is_safe_redirect(target)).named(target).is_false();
        }
    }
}
