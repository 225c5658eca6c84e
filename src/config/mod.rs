//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::embed::{DEFAULT_PAYLOAD_GLOBAL, is_identifier};
use crate::domain::documents::{FeedWindow, MAX_PAGE_LIMIT};
use crate::domain::error::DomainError;
use crate::domain::types::{SortKey, WindowSpan};
use crate::util::locale::Locale;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const ENV_PREFIX: &str = "FOLIO";
const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
const DEFAULT_API_BASE: &str = "https://scrapbox.io/api/pages";
const DEFAULT_ORIGIN: &str = "https://scrapbox.io";
const DEFAULT_LISTING_LIMIT: u32 = 5;
const DEFAULT_ARCHIVE_LIMIT: u32 = MAX_PAGE_LIMIT;
const DEFAULT_PACING_MS: u64 = 1_000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OUTPUT_DIR: &str = "dist";
const DEFAULT_PATH_PREFIX: &str = "scrapbox";
const DEFAULT_REDIRECTS_LABEL: &str = "Scrapbox";
pub(crate) const DEFAULT_LIST_MARKER: &str = "<!-- feed-list -->";

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Mirror a remote notes feed into static site artifacts"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "FOLIO_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Inject the latest notes into the page and emit sitemaps and redirects.
    Build(BuildArgs),
    /// Only inject the latest notes into the page shell.
    Page(BuildArgs),
    /// Only emit sitemaps and redirect rules.
    Sitemap(BuildArgs),
    /// Print the fetched collection as JSON.
    Fetch(FetchArgs),
}

impl Command {
    pub fn overrides(&self) -> &Overrides {
        match self {
            Command::Build(args) | Command::Page(args) | Command::Sitemap(args) => &args.overrides,
            Command::Fetch(args) => &args.overrides,
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Command::Build(BuildArgs::default())
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub overrides: Overrides,

    /// Fetch the whole archive instead of the latest page.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub all: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the remote project name.
    #[arg(long = "project", value_name = "NAME")]
    pub project: Option<String>,

    /// Override the public site URL.
    #[arg(long = "site-url", value_name = "URL")]
    pub site_url: Option<String>,

    /// Override the output directory.
    #[arg(long = "out-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub site: SiteSettings,
    pub feed: FeedSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Public base URL without a trailing slash.
    pub url: String,
    pub timezone: Tz,
    pub locale: Locale,
}

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub project: String,
    pub api_base: Url,
    pub origin: String,
    pub sort: SortKey,
    pub skip: u64,
    pub limit: u32,
    pub archive_limit: u32,
    pub pacing: Duration,
    pub timeout: Duration,
}

impl FeedSettings {
    /// Window for the latest-notes listing: one page of `limit` documents.
    pub fn listing_window(&self) -> Result<FeedWindow, DomainError> {
        FeedWindow::new(self.sort, self.skip, self.limit, WindowSpan::FirstPage)
    }

    /// Window for sitemap and redirect generation: every document from `skip` on.
    pub fn archive_window(&self) -> Result<FeedWindow, DomainError> {
        FeedWindow::new(self.sort, self.skip, self.archive_limit, WindowSpan::All)
    }
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub path_prefix: String,
    pub redirects_label: String,
    pub payload_global: String,
    pub list_marker: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    if let Some(command) = cli.command.as_ref() {
        raw.apply_overrides(command.overrides());
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    site: RawSiteSettings,
    feed: RawFeedSettings,
    output: RawOutputSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(project) = overrides.project.as_ref() {
            self.feed.project = Some(project.clone());
        }
        if let Some(url) = overrides.site_url.as_ref() {
            self.site.url = Some(url.clone());
        }
        if let Some(directory) = overrides.out_dir.as_ref() {
            self.output.directory = Some(directory.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            site,
            feed,
            output,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            site: build_site_settings(site)?,
            feed: build_feed_settings(feed)?,
            output: build_output_settings(output)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let url = required(site.url, "site.url")?;
    let parsed =
        Url::parse(&url).map_err(|err| LoadError::invalid("site.url", err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoadError::invalid("site.url", "scheme must be http or https"));
    }

    let timezone = site
        .timezone
        .as_deref()
        .unwrap_or(DEFAULT_TIMEZONE)
        .parse::<Tz>()
        .map_err(|err| LoadError::invalid("site.timezone", err.to_string()))?;

    let locale = match site.locale {
        Some(value) => {
            Locale::from_str(&value).map_err(|reason| LoadError::invalid("site.locale", reason))?
        }
        None => Locale::default(),
    };

    Ok(SiteSettings {
        url: url.trim_end_matches('/').to_string(),
        timezone,
        locale,
    })
}

fn build_feed_settings(feed: RawFeedSettings) -> Result<FeedSettings, LoadError> {
    let project = required(feed.project, "feed.project")?;
    if project.contains('/') {
        return Err(LoadError::invalid("feed.project", "must not contain `/`"));
    }

    let api_base = feed
        .api_base
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let api_base =
        Url::parse(&api_base).map_err(|err| LoadError::invalid("feed.api_base", err.to_string()))?;
    if api_base.cannot_be_a_base() {
        return Err(LoadError::invalid("feed.api_base", "must be a base URL"));
    }

    let origin = feed.origin.unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
    Url::parse(&origin).map_err(|err| LoadError::invalid("feed.origin", err.to_string()))?;

    let sort = match feed.sort {
        Some(value) => SortKey::from_str(&value)
            .map_err(|err| LoadError::invalid("feed.sort", err.to_string()))?,
        None => SortKey::default(),
    };

    let limit = page_limit(feed.limit.unwrap_or(DEFAULT_LISTING_LIMIT), "feed.limit")?;
    let archive_limit = page_limit(
        feed.archive_limit.unwrap_or(DEFAULT_ARCHIVE_LIMIT),
        "feed.archive_limit",
    )?;

    let timeout_secs = feed.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "feed.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(FeedSettings {
        project,
        api_base,
        origin: origin.trim_end_matches('/').to_string(),
        sort,
        skip: feed.skip.unwrap_or(0),
        limit,
        archive_limit,
        pacing: Duration::from_millis(feed.pacing_ms.unwrap_or(DEFAULT_PACING_MS)),
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_output_settings(output: RawOutputSettings) -> Result<OutputSettings, LoadError> {
    let directory = output
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "output.directory",
            "path must not be empty",
        ));
    }

    let path_prefix = output
        .path_prefix
        .unwrap_or_else(|| DEFAULT_PATH_PREFIX.to_string())
        .trim_matches('/')
        .to_string();
    if path_prefix.is_empty() {
        return Err(LoadError::invalid(
            "output.path_prefix",
            "must not be empty",
        ));
    }

    let list_marker = output
        .list_marker
        .unwrap_or_else(|| DEFAULT_LIST_MARKER.to_string());
    if list_marker.trim().is_empty() {
        return Err(LoadError::invalid(
            "output.list_marker",
            "must not be empty",
        ));
    }

    let payload_global = output
        .payload_global
        .unwrap_or_else(|| DEFAULT_PAYLOAD_GLOBAL.to_string());
    if !is_identifier(&payload_global) {
        return Err(LoadError::invalid(
            "output.payload_global",
            format!("`{payload_global}` is not a valid identifier"),
        ));
    }

    Ok(OutputSettings {
        directory,
        path_prefix,
        redirects_label: output
            .redirects_label
            .unwrap_or_else(|| DEFAULT_REDIRECTS_LABEL.to_string()),
        payload_global,
        list_marker,
    })
}

fn required(value: Option<String>, key: &'static str) -> Result<String, LoadError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LoadError::invalid(key, "value is required"))
}

fn page_limit(value: u32, key: &'static str) -> Result<u32, LoadError> {
    if value == 0 || value > MAX_PAGE_LIMIT {
        return Err(LoadError::invalid(
            key,
            format!("must be within 1..={MAX_PAGE_LIMIT}"),
        ));
    }
    Ok(value)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    url: Option<String>,
    timezone: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawFeedSettings {
    project: Option<String>,
    api_base: Option<String>,
    origin: Option<String>,
    sort: Option<String>,
    skip: Option<u64>,
    limit: Option<u32>,
    archive_limit: Option<u32>,
    pacing_ms: Option<u64>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawOutputSettings {
    directory: Option<PathBuf>,
    path_prefix: Option<String>,
    redirects_label: Option<String>,
    payload_global: Option<String>,
    list_marker: Option<String>,
}
