use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use bookstore_harness::{
    clients::{AuthorsClient, BooksClient, HttpClient},
    config::Config,
    observability,
    util::fs::clear_dir_files,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 前回実行分のログを先に消してからシンクを開く。件数はシンクが
    // 開いた後に記録する。
    let removed_logs = clear_dir_files(Path::new("logs"));
    observability::init().context("failed to initialize logging")?;
    info!(removed = removed_logs, "cleared previous log files");

    let config = match Config::resolve(None) {
        Ok(config) => config,
        Err(e) => {
            error!(target: "forensic", error = %e, "configuration resolution failed");
            return Err(e.into());
        }
    };

    let http = match HttpClient::build(&config) {
        Ok(http) => http,
        Err(e) => {
            // HttpClient::build already logged the missing base URL.
            error!(target: "forensic", error = %e, "client construction failed");
            return Err(e.into());
        }
    };

    info!(environment = %config.environment(), "starting smoke pass");

    let books = BooksClient::new(http.clone());
    let authors = AuthorsClient::new(http);

    let calls = [
        ("books list", books.list().await?),
        ("authors list", authors.list().await?),
    ];

    let mut failures = 0_u32;
    for (name, outcome) in calls {
        if outcome.is_success() {
            info!(call = name, status = ?outcome.status(), "smoke call succeeded");
        } else {
            failures += 1;
            warn!(call = name, status = ?outcome.status(), "smoke call failed");
        }
    }

    if failures > 0 {
        anyhow::bail!("smoke pass finished with {failures} failing calls");
    }

    info!("smoke pass finished");
    Ok(())
}
