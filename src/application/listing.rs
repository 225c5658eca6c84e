//! HTML list fragment for the latest notes.

use time::OffsetDateTime;

use crate::domain::documents::{Document, FeedCollection};
use crate::presentation::views::{
    DocumentCard, FeedListTemplate, FeedListView, FeedUnavailableTemplate, TemplateRenderError,
    render_template,
};
use crate::util::encoding::encode_component;
use crate::util::locale::Locale;
use crate::util::relative_time::RelativeTimeFormatter;

#[derive(Debug, Clone)]
pub struct ListingRenderer {
    remote_origin: String,
    formatter: RelativeTimeFormatter,
    locale: Locale,
}

impl ListingRenderer {
    pub fn new(remote_origin: impl Into<String>, formatter: RelativeTimeFormatter, locale: Locale) -> Self {
        Self {
            remote_origin: remote_origin.into().trim_end_matches('/').to_string(),
            formatter,
            locale,
        }
    }

    /// Renders one card per document, or the localized placeholder when the collection
    /// is missing or empty.
    pub fn render(
        &self,
        collection: Option<&FeedCollection>,
        now: OffsetDateTime,
    ) -> Result<String, TemplateRenderError> {
        match collection {
            Some(collection) if !collection.is_empty() => {
                render_template(FeedListTemplate {
                    view: self.list_view(collection, now),
                })
            }
            _ => render_template(FeedUnavailableTemplate {
                message: self.locale.unavailable_message().to_string(),
            }),
        }
    }

    fn list_view(&self, collection: &FeedCollection, now: OffsetDateTime) -> FeedListView {
        let source = &collection.source_name;
        FeedListView {
            source_name: source.clone(),
            cards: collection
                .documents
                .iter()
                .map(|document| self.card(source, document, now))
                .collect(),
            view_all_href: format!("{}/{}", self.remote_origin, encode_component(source)),
            view_all_label: self.locale.view_all_label().to_string(),
        }
    }

    fn card(&self, source: &str, document: &Document, now: OffsetDateTime) -> DocumentCard {
        DocumentCard {
            href: format!(
                "{}/{}/{}",
                self.remote_origin,
                encode_component(source),
                encode_component(&document.title)
            ),
            title: document.title.clone(),
            summary: document.summary().unwrap_or_default().to_string(),
            views: document.view_count,
            links: document.link_count,
            age: self.formatter.format(document.updated_at, now),
        }
    }
}
