//! knectar-import - build data/menu.json from the project spreadsheet
//!
//! **Usage:**
//! ```bash
//! knectar-import project_data.csv [-o data/menu.json] [--publish http://localhost:8000 --secret S]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use knectar_common::menu::save_menu;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for knectar-import
#[derive(Parser, Debug)]
#[command(name = "knectar-import")]
#[command(about = "Convert the project spreadsheet CSV into the site menu")]
#[command(version)]
struct Args {
    /// CSV export of the project spreadsheet
    csv: PathBuf,

    /// Menu document to write
    #[arg(short, long, default_value = "data/menu.json")]
    out: PathBuf,

    /// Also replace the menu of the site running at this URL
    #[arg(long, value_name = "URL", requires = "secret")]
    publish: Option<String>,

    /// Shared edit secret for --publish
    #[arg(long, env = "EDIT_SECRET", hide_env_values = true)]
    secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knectar_import=info,knectar_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let tree = knectar_import::build_menu_from_path(&args.csv)
        .with_context(|| format!("Failed to import {}", args.csv.display()))?;

    save_menu(&args.out, &tree)
        .await
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    info!(
        "Converted {} -> {} with {} top-level entries",
        args.csv.display(),
        args.out.display(),
        tree.nodes().len()
    );

    if let (Some(url), Some(secret)) = (args.publish.as_deref(), args.secret.as_deref()) {
        knectar_import::publish(url, secret, &tree)
            .await
            .with_context(|| format!("Failed to publish menu to {}", url))?;
    }

    Ok(())
}
