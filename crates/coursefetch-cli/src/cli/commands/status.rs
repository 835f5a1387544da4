//! `coursefetch status` – show queue and session state.

use anyhow::Result;
use coursefetch_core::config::CrawlConfig;
use coursefetch_core::queue::persist;
use coursefetch_core::session::store::CredentialStore;
use std::path::Path;

pub fn run_status(cfg: &CrawlConfig) -> Result<()> {
    let store = CredentialStore::open_default()?;
    let credentials = store.load()?;
    if credentials.is_empty() {
        println!("Session: none (run `coursefetch login`).");
    } else {
        println!("Session: saved at {}.", store.path().display());
    }

    let queue_path = Path::new(&cfg.queue_file);
    if !queue_path.exists() {
        println!("Queue: none (run `coursefetch crawl`).");
        return Ok(());
    }
    let entries = persist::load(queue_path)?;
    if entries.is_empty() {
        println!("Queue: empty.");
    } else {
        println!(
            "Queue: {} items in {}.",
            entries.len(),
            cfg.queue_file.display()
        );
        println!("{:<8} {}", "TYPE", "TITLE");
        for entry in &entries {
            println!("{:<8} {}", entry.content_type.tag(), entry.title);
        }
    }
    Ok(())
}
