//! Command-line interface parsing for QuoteVault
//!
//! This module handles parsing of CLI arguments using clap. Connection
//! settings can come from flags or from `QUOTEVAULT_*` environment variables
//! and are turned into a [`StartupConfig`] for the binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::cache::CacheManager;
use crate::data::supabase::{SupabaseConfig, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::data::QuoteCategory;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified category name is not recognized
    #[error("Invalid category: '{0}'. Valid categories: motivation, love, success, wisdom, humor, general")]
    InvalidCategory(String),

    /// A setting required by the command was not provided
    #[error("Missing setting: {0} (pass the flag or set the matching QUOTEVAULT_* variable)")]
    MissingSetting(&'static str),

    /// A setting was provided but is unusable
    #[error("Invalid {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    /// No cache directory was given and none could be determined
    #[error("Could not determine a cache directory; pass --cache-dir")]
    NoCacheDir,
}

/// QuoteVault - today's quote and quote browsing from the terminal
#[derive(Parser, Debug)]
#[command(name = "quotevault")]
#[command(about = "Quote of the day and quote browsing for QuoteVault")]
#[command(version)]
pub struct Cli {
    /// Supabase project URL
    #[arg(long, env = "QUOTEVAULT_SUPABASE_URL", global = true)]
    pub supabase_url: Option<String>,

    /// Supabase anon key
    #[arg(long, env = "QUOTEVAULT_ANON_KEY", global = true, hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Session token of a signed-in user
    #[arg(long, env = "QUOTEVAULT_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub access_token: Option<String>,

    /// User whose favorites are marked in results
    #[arg(long, env = "QUOTEVAULT_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Directory for the quote-of-the-day cache (defaults to the XDG cache dir)
    #[arg(long, env = "QUOTEVAULT_CACHE_DIR", global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Network request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true, value_name = "SECS")]
    pub timeout_secs: u64,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands; `today` runs when none is given
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show today's quote
    Today {
        /// Drop the cached quote and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// Remove the cached quote of the day
    ClearCache,
    /// List quotes page by page
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1, value_parser = page_number_parser())]
        page: usize,
        /// Quotes per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = page_size_parser())]
        page_size: usize,
    },
    /// List quotes in a category, newest first
    Category {
        /// motivation, love, success, wisdom, humor or general
        #[arg(value_parser = parse_category_arg)]
        category: QuoteCategory,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1, value_parser = page_number_parser())]
        page: usize,
    },
    /// Search quote text and authors
    Search {
        /// Text to look for
        query: String,
        /// Only search within this category
        #[arg(long, value_parser = parse_category_arg)]
        category: Option<QuoteCategory>,
    },
    /// List quotes by an author
    Author {
        /// Author name or part of it
        name: String,
    },
    /// Show a single quote
    Show {
        /// Quote id
        id: String,
    },
    /// List the configured user's favorite quotes
    Favorites,
}

/// Largest page size accepted on the command line
pub const MAX_PAGE_SIZE: usize = 1000;

fn page_number_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..)
}

fn page_size_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..=MAX_PAGE_SIZE as u64)
}

/// Parses a category string argument into a QuoteCategory.
///
/// # Returns
/// * `Ok(QuoteCategory)` if the string names a category
/// * `Err(CliError::InvalidCategory)` if it doesn't
pub fn parse_category_arg(s: &str) -> Result<QuoteCategory, CliError> {
    QuoteCategory::parse(s).ok_or_else(|| CliError::InvalidCategory(s.to_string()))
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// What to run
    pub command: Command,
    /// Explicit cache directory, if any
    pub cache_dir: Option<PathBuf>,
    /// Whether to print JSON
    pub json: bool,
    /// Whether debug logging was requested
    pub verbose: bool,
    /// Backend settings, when both URL and key were given
    supabase: Option<SupabaseConfig>,
}

/// Returns the value if it is present and not blank
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// Backend settings are optional here because `clear-cache` works
    /// offline; giving only one of URL and key is still an error.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the backend settings are partial or malformed
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let url = non_blank(&cli.supabase_url);
        let key = non_blank(&cli.anon_key);

        let supabase = match (url, key) {
            (None, None) => None,
            (Some(_), None) => return Err(CliError::MissingSetting("--anon-key")),
            (None, Some(_)) => return Err(CliError::MissingSetting("--supabase-url")),
            (Some(url), Some(key)) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(CliError::InvalidSetting {
                        name: "--supabase-url",
                        reason: format!("'{}' is not an http(s) URL", url),
                    });
                }
                if cli.timeout_secs == 0 {
                    return Err(CliError::InvalidSetting {
                        name: "--timeout-secs",
                        reason: "must be at least 1".to_string(),
                    });
                }
                Some(SupabaseConfig {
                    url,
                    anon_key: key,
                    access_token: non_blank(&cli.access_token),
                    user_id: non_blank(&cli.user_id),
                    timeout: Duration::from_secs(cli.timeout_secs),
                })
            }
        };

        Ok(StartupConfig {
            command: cli
                .command
                .clone()
                .unwrap_or(Command::Today { refresh: false }),
            cache_dir: cli.cache_dir.clone(),
            json: cli.json,
            verbose: cli.verbose,
            supabase,
        })
    }

    /// Backend settings, required by every command that goes online
    pub fn supabase(&self) -> Result<&SupabaseConfig, CliError> {
        self.supabase
            .as_ref()
            .ok_or(CliError::MissingSetting("--supabase-url"))
    }

    /// Cache store at the configured or default location
    pub fn cache_manager(&self) -> Result<CacheManager, CliError> {
        match &self.cache_dir {
            Some(dir) => Ok(CacheManager::with_dir(dir.clone())),
            None => CacheManager::new().ok_or(CliError::NoCacheDir),
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "quotevault=debug"
        } else {
            "quotevault=warn"
        }
    }
}
