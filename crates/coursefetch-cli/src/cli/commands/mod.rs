//! CLI command handlers. Each command is in its own file.

mod crawl;
mod download;
mod login;
mod status;

pub use crawl::run_crawl;
pub use download::run_download;
pub use login::run_login;
pub use status::run_status;
