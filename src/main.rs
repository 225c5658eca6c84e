use std::{process, sync::Arc};

use folio::{
    application::{
        aggregate::FeedAggregator,
        error::AppError,
        listing::ListingRenderer,
        pipeline::{ArtifactOptions, ArtifactPipeline, PageDataLoader, PageShell},
    },
    config::{self, Command, Settings},
    infra::{output::OutputDir, scrapbox::ScrapboxSource, telemetry},
    util::relative_time::RelativeTimeFormatter,
};
use time::OffsetDateTime;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    let chain = report.chain();
    if dispatcher::has_been_set() {
        error!(origin = report.source, error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(origin = report.source, error = %chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    let command = cli_args.command.unwrap_or_default();

    telemetry::init(&settings.logging)?;

    let aggregator = build_aggregator(&settings)?;
    match command {
        Command::Build(_) => {
            run_page(&settings, &aggregator).await?;
            run_sitemap(&settings, &aggregator).await
        }
        Command::Page(_) => run_page(&settings, &aggregator).await,
        Command::Sitemap(_) => run_sitemap(&settings, &aggregator).await,
        Command::Fetch(args) => run_fetch(&settings, &aggregator, args.all).await,
    }
}

fn build_aggregator(settings: &Settings) -> Result<FeedAggregator, AppError> {
    let source = ScrapboxSource::new(settings.feed.api_base.clone(), settings.feed.timeout)?;
    Ok(FeedAggregator::with_pacing(
        Arc::new(source),
        settings.feed.pacing,
    ))
}

async fn run_page(settings: &Settings, aggregator: &FeedAggregator) -> Result<(), AppError> {
    let loader = PageDataLoader::new(
        aggregator.clone(),
        settings.feed.project.clone(),
        settings.feed.listing_window()?,
    );
    let collection = loader.load().await;

    let formatter = RelativeTimeFormatter::new(settings.site.timezone, settings.site.locale);
    let shell = PageShell::new(
        ListingRenderer::new(settings.feed.origin.clone(), formatter, settings.site.locale),
        settings.output.list_marker.clone(),
        settings.output.payload_global.clone(),
    );
    let output = OutputDir::new(&settings.output.directory);
    let path = shell
        .write(&output, collection.as_ref(), OffsetDateTime::now_utc())
        .await?;

    info!(
        target = "folio::page",
        path = %path.display(),
        documents = collection.as_ref().map_or(0, |c| c.len()),
        available = collection.is_some(),
        "page data injected"
    );
    Ok(())
}

async fn run_sitemap(settings: &Settings, aggregator: &FeedAggregator) -> Result<(), AppError> {
    let options = ArtifactOptions {
        source_name: settings.feed.project.clone(),
        window: settings.feed.archive_window()?,
        site_url: settings.site.url.clone(),
        path_prefix: settings.output.path_prefix.clone(),
        remote_origin: settings.feed.origin.clone(),
        redirects_label: settings.output.redirects_label.clone(),
        timezone: settings.site.timezone,
    };
    let pipeline = ArtifactPipeline::new(
        aggregator.clone(),
        OutputDir::new(&settings.output.directory),
        options,
    );
    let summary = pipeline.run(OffsetDateTime::now_utc()).await?;

    info!(
        target = "folio::sitemap",
        documents = summary.documents,
        sitemap = %summary.collection_sitemap.display(),
        redirects = %summary.redirects.display(),
        "sitemaps and redirects written"
    );
    Ok(())
}

async fn run_fetch(
    settings: &Settings,
    aggregator: &FeedAggregator,
    all: bool,
) -> Result<(), AppError> {
    let window = if all {
        settings.feed.archive_window()?
    } else {
        settings.feed.listing_window()?
    };
    let collection = aggregator
        .aggregate(&settings.feed.project, &window)
        .await?;
    let json = serde_json::to_string_pretty(&collection)
        .map_err(|err| AppError::unexpected(format!("failed to encode collection: {err}")))?;
    println!("{json}");
    Ok(())
}
