use askama::{Error as AskamaError, Template};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub origin: &'static str,
    pub public_message: &'static str,
    #[source]
    pub error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(origin: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            origin,
            public_message,
            error,
        }
    }
}

pub fn render_template<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
    })
}

#[derive(Clone, Debug)]
pub struct DocumentCard {
    pub href: String,
    pub title: String,
    /// First description line, empty when the note has none.
    pub summary: String,
    pub views: u64,
    pub links: u64,
    pub age: String,
}

#[derive(Clone, Debug)]
pub struct FeedListView {
    pub source_name: String,
    pub cards: Vec<DocumentCard>,
    pub view_all_href: String,
    pub view_all_label: String,
}

#[derive(Template)]
#[template(path = "feed/list.html")]
pub struct FeedListTemplate {
    pub view: FeedListView,
}

#[derive(Template)]
#[template(path = "feed/unavailable.html")]
pub struct FeedUnavailableTemplate {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn render_error_keeps_origin_and_cause() {
        let err = TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            AskamaError::Fmt,
        );
        assert_eq!(err.origin, "presentation::views::render_template");
        assert_eq!(err.to_string(), "Template rendering failed");
        assert!(err.source().is_some());
    }
}
