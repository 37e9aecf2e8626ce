//! QuoteVault CLI - today's quote and quote browsing
//!
//! Reads quotes from a Supabase project. The quote of the day is cached on
//! disk so it is fetched at most once per day and still shown when offline.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quotevault::cache::CacheStore;
use quotevault::cli::{Cli, Command, StartupConfig};
use quotevault::daily::{DailyQuote, DailyQuoteCache};
use quotevault::data::{Quote, SupabaseClient};

/// Installs a stderr `tracing` subscriber, honouring `RUST_LOG` when set
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Prints a single quote in plain text
fn print_quote(quote: &Quote) {
    println!("\"{}\"", quote.text);
    if !quote.author.is_empty() {
        println!("  - {}", quote.author);
    }
    let favorite = if quote.is_favorite { " *" } else { "" };
    println!("  [{}]{} id: {}", quote.category, favorite, quote.id);
}

/// Prints a list of quotes as text or JSON
fn print_quotes(quotes: &[Quote], json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(quotes)?);
        return Ok(());
    }

    if quotes.is_empty() {
        println!("No quotes found.");
    }
    for (i, quote) in quotes.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_quote(quote);
    }
    Ok(())
}

/// Prints the quote of the day, flagging stale fallbacks
fn print_daily(daily: &DailyQuote, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(daily)?);
        return Ok(());
    }

    print_quote(&daily.quote);
    if daily.is_stale() {
        println!(
            "  (possibly outdated: could not reach the server, showing the quote from day {})",
            daily.day_key
        );
    }
    Ok(())
}

/// Builds the Supabase client from the startup settings
fn connect(config: &StartupConfig) -> Result<SupabaseClient, Box<dyn Error>> {
    Ok(SupabaseClient::new(config.supabase()?.clone())?)
}

async fn run(config: &StartupConfig) -> Result<(), Box<dyn Error>> {
    match &config.command {
        Command::Today { refresh } => {
            let store = config.cache_manager()?;
            let daily = DailyQuoteCache::new(connect(config)?, store);
            if *refresh {
                daily.clear_cache();
            }
            let quote = daily.get_quote_of_the_day().await?;
            print_daily(&quote, config.json)?;
        }
        Command::ClearCache => {
            let store = config.cache_manager()?;
            store.delete_entry()?;
            println!(
                "Cleared cached quote of the day in {}",
                store.cache_dir().display()
            );
        }
        Command::List { page, page_size } => {
            let quotes = connect(config)?.get_quotes(*page, *page_size).await?;
            print_quotes(&quotes, config.json)?;
        }
        Command::Category { category, page } => {
            let quotes = connect(config)?
                .get_quotes_by_category(*category, *page)
                .await?;
            print_quotes(&quotes, config.json)?;
        }
        Command::Search { query, category } => {
            let quotes = connect(config)?.search_quotes(query, *category).await?;
            print_quotes(&quotes, config.json)?;
        }
        Command::Author { name } => {
            let quotes = connect(config)?.search_by_author(name).await?;
            print_quotes(&quotes, config.json)?;
        }
        Command::Show { id } => {
            let quote = connect(config)?.get_quote_by_id(id).await?;
            print_quotes(std::slice::from_ref(&quote), config.json)?;
        }
        Command::Favorites => {
            let quotes = connect(config)?.get_favorites().await?;
            print_quotes(&quotes, config.json)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_filter());

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
