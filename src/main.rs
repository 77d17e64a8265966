use std::time::Duration;

use clap::Parser;

use labtrend_lib::config::{self, FetchConfig};
use labtrend_lib::store::{fetch_corpus, HttpSessionStore};
use labtrend_lib::trend::{build_trend, catalog_test_names};

#[derive(Parser)]
#[command(name = "labtrend", version, about = "Trend one lab test across report sessions")]
struct Cli {
    /// Test name as printed on a report, e.g. "Total Cholesterol".
    #[arg(required_unless_present = "catalog")]
    test_name: Option<String>,

    /// Session store base URL (overrides LABTREND_STORE_URL).
    #[arg(long)]
    store_url: Option<String>,

    /// Deadline for fetching the whole corpus, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Maximum concurrent session fetches.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Print the series as JSON.
    #[arg(long)]
    json: bool,

    /// List groups of equivalent test names instead of a trend.
    #[arg(long)]
    catalog: bool,
}

impl Cli {
    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig::from_env();
        if let Some(url) = &self.store_url {
            config.store_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.corpus_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = self.concurrency {
            config.max_concurrency = n;
        }
        config.normalized()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    labtrend_lib::init_tracing();
    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let fetch_config = cli.fetch_config();
    let store = HttpSessionStore::from_config(&fetch_config)?;
    let corpus = fetch_corpus(&store, &fetch_config).await?;

    if cli.catalog {
        let groups = catalog_test_names(&corpus);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&groups)?);
        } else {
            for group in &groups {
                println!("{} ({} results): {}", group.display_name, group.occurrences, group.variants.join(" | "));
            }
        }
        return Ok(());
    }

    let test_name = cli.test_name.as_deref().unwrap_or_default();
    let series = build_trend(test_name, &corpus);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        println!("{series}");
    }

    Ok(())
}
