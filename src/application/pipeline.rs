//! Build-time callers of the aggregator.
//!
//! The page-data path degrades to a placeholder when the feed is unavailable. The
//! artifact path refuses to write a partial sitemap or redirect set and fails the build.

use std::path::PathBuf;

use chrono_tz::Tz;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::application::aggregate::{AggregationError, FeedAggregator};
use crate::application::embed::{EmbedError, embed_payload};
use crate::application::listing::ListingRenderer;
use crate::application::redirects::{RedirectSection, redirect_rules};
use crate::application::sitemap::{collection_sitemap_xml, site_sitemap_xml};
use crate::domain::documents::{FeedCollection, FeedWindow};
use crate::infra::error::InfraError;
use crate::infra::output::OutputDir;
use crate::presentation::views::TemplateRenderError;

pub const PAGE_SHELL: &str = "index.html";
pub const SITE_SITEMAP: &str = "sitemap.xml";
pub const REDIRECTS_FILE: &str = "_redirects";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Embed(#[from] EmbedError),
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
    #[error("page shell `{}` does not exist", path.display())]
    MissingPageShell { path: PathBuf },
}

/// Fetches the latest notes for the page; failures never abort the build.
#[derive(Clone)]
pub struct PageDataLoader {
    aggregator: FeedAggregator,
    source_name: String,
    window: FeedWindow,
}

impl PageDataLoader {
    pub fn new(aggregator: FeedAggregator, source_name: impl Into<String>, window: FeedWindow) -> Self {
        Self {
            aggregator,
            source_name: source_name.into(),
            window,
        }
    }

    pub async fn load(&self) -> Option<FeedCollection> {
        match self.aggregator.aggregate(&self.source_name, &self.window).await {
            Ok(collection) => Some(collection),
            Err(err) => {
                warn!(
                    target = "application::pipeline::page",
                    source = %self.source_name,
                    error = %err,
                    "feed unavailable, rendering placeholder"
                );
                None
            }
        }
    }
}

/// Injects the list fragment and the data payload into the built page shell.
#[derive(Debug, Clone)]
pub struct PageShell {
    listing: ListingRenderer,
    list_marker: String,
    payload_global: String,
}

impl PageShell {
    pub fn new(
        listing: ListingRenderer,
        list_marker: impl Into<String>,
        payload_global: impl Into<String>,
    ) -> Self {
        Self {
            listing,
            list_marker: list_marker.into(),
            payload_global: payload_global.into(),
        }
    }

    /// Pure transformation of the shell markup.
    pub fn apply(
        &self,
        markup: &str,
        collection: Option<&FeedCollection>,
        now: OffsetDateTime,
    ) -> Result<String, PipelineError> {
        let mut page = if markup.contains(&self.list_marker) {
            let fragment = self.listing.render(collection, now).inspect_err(|err| {
                error!(
                    target = "application::pipeline::page",
                    origin = err.origin,
                    error = %err.error,
                    "list fragment rendering failed"
                );
            })?;
            markup.replacen(&self.list_marker, &fragment, 1)
        } else {
            warn!(
                target = "application::pipeline::page",
                marker = %self.list_marker,
                "list marker not found in page shell"
            );
            markup.to_string()
        };

        if let Some(collection) = collection {
            page = embed_payload(&page, collection, &self.payload_global)?;
        }
        Ok(page)
    }

    pub async fn write(
        &self,
        output: &OutputDir,
        collection: Option<&FeedCollection>,
        now: OffsetDateTime,
    ) -> Result<PathBuf, PipelineError> {
        let Some(markup) = output.read_optional(PAGE_SHELL).await? else {
            return Err(PipelineError::MissingPageShell {
                path: output.path(PAGE_SHELL),
            });
        };
        let page = self.apply(&markup, collection, now)?;
        Ok(output.write(PAGE_SHELL, &page).await?)
    }
}

/// Everything the artifact path needs, resolved up front from settings.
#[derive(Debug, Clone)]
pub struct ArtifactOptions {
    pub source_name: String,
    pub window: FeedWindow,
    pub site_url: String,
    pub path_prefix: String,
    pub remote_origin: String,
    pub redirects_label: String,
    pub timezone: Tz,
}

#[derive(Debug, Clone)]
pub struct ArtifactSummary {
    pub site_sitemap: PathBuf,
    pub collection_sitemap: PathBuf,
    pub redirects: PathBuf,
    pub documents: usize,
}

/// Emits both sitemaps and the redirect section.
#[derive(Clone)]
pub struct ArtifactPipeline {
    aggregator: FeedAggregator,
    output: OutputDir,
    options: ArtifactOptions,
}

impl ArtifactPipeline {
    pub fn new(aggregator: FeedAggregator, output: OutputDir, options: ArtifactOptions) -> Self {
        Self {
            aggregator,
            output,
            options,
        }
    }

    pub fn collection_sitemap_path(&self) -> String {
        format!("{}/{SITE_SITEMAP}", self.options.path_prefix.trim_matches('/'))
    }

    pub async fn run(&self, now: OffsetDateTime) -> Result<ArtifactSummary, PipelineError> {
        let options = &self.options;

        let site_sitemap = self
            .output
            .write(SITE_SITEMAP, &site_sitemap_xml(&options.site_url, now))
            .await?;

        let collection = self
            .aggregator
            .aggregate(&options.source_name, &options.window)
            .await?;

        let collection_sitemap = self
            .output
            .write(
                &self.collection_sitemap_path(),
                &collection_sitemap_xml(
                    &options.site_url,
                    &options.path_prefix,
                    &collection.documents,
                    options.timezone,
                ),
            )
            .await?;

        let section = RedirectSection::new(options.redirects_label.as_str());
        let rules = redirect_rules(
            &options.path_prefix,
            &options.remote_origin,
            &collection.source_name,
            &collection.documents,
        );
        let existing = self.output.read_optional(REDIRECTS_FILE).await?;
        let merged = section.merge(existing.as_deref(), &section.render(&rules));
        let redirects = self.output.write(REDIRECTS_FILE, &merged).await?;

        info!(
            target = "application::pipeline::artifacts",
            source = %options.source_name,
            documents = collection.len(),
            rules = rules.len(),
            "artifacts generated"
        );

        Ok(ArtifactSummary {
            site_sitemap,
            collection_sitemap,
            redirects,
            documents: collection.len(),
        })
    }
}
