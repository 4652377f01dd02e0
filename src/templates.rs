use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use anyhow::Context;
use handlebars::Handlebars;
use serde::Serialize;

/// Page templates, embedded in the binary
const PAGES: [(&str, &str); 7] = [
    ("home", include_str!("../templates/home.hbs")),
    ("detail", include_str!("../templates/detail.hbs")),
    ("comment_edit", include_str!("../templates/comment_edit.hbs")),
    ("comment_delete", include_str!("../templates/comment_delete.hbs")),
    ("login", include_str!("../templates/login.hbs")),
    ("logout", include_str!("../templates/logout.hbs")),
    ("signup", include_str!("../templates/signup.hbs")),
];

const PARTIALS: [(&str, &str); 2] = [
    ("layout", include_str!("../templates/partials/layout.hbs")),
    ("field_errors", include_str!("../templates/partials/field_errors.hbs")),
];

/// # Renders the HTML pages
#[derive(Clone)]
pub struct Templates {
    registry: Arc<Handlebars<'static>>,
}

impl Templates {
    pub fn new() -> anyhow::Result<Self> {
        let mut registry = Handlebars::new();

        for (name, source) in PARTIALS {
            registry
                .register_partial(name, source)
                .with_context(|| format!("Invalid partial {}", name))?;
        }
        for (name, source) in PAGES {
            registry
                .register_template_string(name, source)
                .with_context(|| format!("Invalid template {}", name))?;
        }

        Ok(Templates {
            registry: Arc::new(registry),
        })
    }

    #[tracing::instrument(skip(self, data), level = "debug")]
    pub fn render<T: Serialize>(
        &self,
        name: &str,
        data: &T,
    ) -> Result<String, handlebars::RenderError> {
        self.registry.render(name, data)
    }

    /// Render the page as a 200 HTML response
    pub fn page<T: Serialize>(
        &self,
        name: &str,
        data: &T,
    ) -> Result<HttpResponse, handlebars::RenderError> {
        let body = self.render(name, data)?;

        Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(body))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn every_template_compiles() {
        assert_that(&Templates::new().is_ok()).is_true();
    }

    #[test]
    fn layout_shows_login_link_to_anonymous() {
        let templates = Templates::new().unwrap();

        let page = templates
            .render(
                "logout",
                &json!({
                    "user": null,
                    "urls": {
                        "login": "/auth/login/",
                        "signup": "/auth/signup/",
                        "home": "/",
                        "logout": "/auth/logout/"
                    }
                }),
            )
            .unwrap();

        assert_that(&page).contains("href=\"/auth/login/\"");
        assert_that(&page).does_not_contain("Выйти");
    }

    #[test]
    fn text_is_escaped() {
        let templates = Templates::new().unwrap();

        let page = templates
            .render(
                "home",
                &json!({
                    "user": null,
                    "urls": {},
                    "news_list": [{
                        "id": 1,
                        "title": "<script>",
                        "text": "",
                        "date": "2024-01-01",
                        "url": "/news/1/"
                    }]
                }),
            )
            .unwrap();

        assert_that(&page).does_not_contain("<script>");
        assert_that(&page).contains("&lt;script&gt;");
    }
}
