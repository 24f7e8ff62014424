use cli_helpers::prelude::*;
use lr_core::text;
use lr_resolver::{batch::unique_urls, Config, Resolver};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let opts: Opts = Opts::parse();
    opts.verbose.init_logging()?;

    let resolver = Resolver::new(opts.resolver_config()?)?;
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling outstanding requests");
            interrupt.cancel();
        }
    });

    match opts.command {
        Command::Restore { input } => {
            let content = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut content = String::new();
                    std::io::stdin().read_to_string(&mut content)?;
                    content
                }
            };

            let links = text::find_short_links(&content);

            if links.is_empty() {
                log::info!("No links found");
                print!("{}", content);
            } else {
                let results = resolver.resolve_all_until(&links, &cancel).await?;
                let stats = text::Stats::new(links.len(), results.len());

                print!("{}", text::restore(&content, &results));

                log::info!("Found {} links, expanded {}", stats.found, stats.expanded);
            }
        }
        Command::Resolve => {
            let lines = BufReader::new(std::io::stdin())
                .lines()
                .collect::<Result<Vec<_>, _>>()?;
            let urls = unique_urls(
                lines
                    .iter()
                    .map(|line| line.trim())
                    .filter(|line| !line.is_empty()),
            );

            let results = resolver.resolve_all_until(&urls, &cancel).await?;
            let mut by_original = results
                .into_iter()
                .map(|result| (result.original.clone(), result))
                .collect::<HashMap<_, _>>();

            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(std::io::stdout());

            for url in urls {
                if let Some(result) = by_original.remove(&url) {
                    writer.serialize(result)?;
                }
            }

            writer.flush()?;
        }
    }

    Ok(())
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("CLI argument reading error")]
    Args(#[from] cli_helpers::Error),
    #[error("CSV error")]
    Csv(#[from] csv::Error),
    #[error("Configuration error")]
    Config(#[from] lr_resolver::config::Error),
    #[error("Resolver error")]
    Resolver(#[from] lr_resolver::Error),
}

#[derive(Debug, Parser)]
#[clap(name = "lr", version, author)]
struct Opts {
    #[clap(flatten)]
    verbose: Verbosity,
    /// Resolver configuration file (TOML)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Per-link timeout in milliseconds
    #[clap(long)]
    timeout_ms: Option<u64>,
    /// Maximum number of links resolved at once
    #[clap(long)]
    concurrency: Option<usize>,
    #[clap(subcommand)]
    command: Command,
}

impl Opts {
    fn resolver_config(&self) -> Result<Config, Error> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }

        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }

        Ok(config)
    }
}

#[derive(Debug, Parser)]
enum Command {
    /// Replace the short links in a text with their destinations
    Restore {
        /// Input file (standard input by default)
        #[clap(long)]
        input: Option<PathBuf>,
    },
    /// Resolve URLs read one per line from standard input, writing CSV
    Resolve,
}
