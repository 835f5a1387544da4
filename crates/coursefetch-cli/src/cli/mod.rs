//! CLI for the course content fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use coursefetch_core::config;

use commands::{run_crawl, run_download, run_login, run_status};

/// Top-level CLI for the course content fetcher.
#[derive(Debug, Parser)]
#[command(name = "coursefetch")]
#[command(about = "Crawl an LMS portal and download course videos and PDFs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Crawl pinned courses and build the download queue.
    Crawl {
        /// Also queue PDFs, overriding the config setting.
        #[arg(long)]
        pdfs: bool,
    },

    /// Download everything in the queue built by a previous crawl.
    Download,

    /// Log in interactively and persist fresh session credentials.
    Login,

    /// Show the queue and session state.
    Status,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Crawl { pdfs } => {
                if pdfs {
                    cfg.download_pdfs = true;
                }
                run_crawl(&cfg)?;
            }
            CliCommand::Download => run_download(&cfg)?,
            CliCommand::Login => run_login(&cfg)?,
            CliCommand::Status => run_status(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn crawl_accepts_the_pdfs_flag() {
        let cli = Cli::parse_from(["coursefetch", "crawl", "--pdfs"]);
        assert!(matches!(cli.command, CliCommand::Crawl { pdfs: true }));
    }

    #[test]
    fn download_takes_no_arguments() {
        let cli = Cli::parse_from(["coursefetch", "download"]);
        assert!(matches!(cli.command, CliCommand::Download));
    }
}
