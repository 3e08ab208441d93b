//! Product Compare CLI - browse a paginated catalog and compare products.
//!
//! # Usage
//!
//! ```bash
//! # First page, server order
//! pc-cli products
//!
//! # Page 3, most expensive first
//! pc-cli products --page 3 --sort-by price --order desc
//!
//! # Accumulate the first five pages
//! pc-cli browse --pages 5
//!
//! # One product
//! pc-cli product 7
//!
//! # Side-by-side comparison of two to four products
//! pc-cli compare 1 2 3
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_BASE_URL` - Catalog service (overridden by `--base-url`)
//! - `CATALOG_PAGE_SIZE` - Products per page (overridden by `--page-size`)
//! - `CATALOG_MAX_PRODUCTS` - Cap on products kept while browsing
//! - `RUST_LOG` - Log filter (default: `info`, `debug` with `--verbose`)
//! - `PC_LOG_JSON` - Emit logs as JSON lines (same as `--log-json`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use product_compare_core::{ProductId, SortField, SortOrder};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "pc-cli")]
#[command(author, version, about = "Browse a product catalog and compare products")]
struct Cli {
    /// Catalog service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Products per page (1-100)
    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Log request details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "PC_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of the catalog
    Products {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Sort field (`id`, `title`, `price`, `brand`, `category`)
        #[arg(long)]
        sort_by: Option<SortField>,

        /// Sort order (`asc`, `desc`)
        #[arg(long)]
        order: Option<SortOrder>,
    },
    /// Load several pages and list everything loaded
    Browse {
        /// Number of pages to load
        #[arg(long, default_value_t = 3)]
        pages: u32,

        /// Sort field (`id`, `title`, `price`, `brand`, `category`)
        #[arg(long)]
        sort_by: Option<SortField>,

        /// Sort order (`asc`, `desc`)
        #[arg(long)]
        order: Option<SortOrder>,
    },
    /// Show a single product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// Compare products side by side
    Compare {
        /// Product IDs, in display order
        #[arg(required = true)]
        ids: Vec<ProductId>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr so table output on stdout stays clean.
fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{default},product_compare_catalog={level},product_compare_cli={level}",
            level = if verbose { "debug" } else { "info" }
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let session = commands::Session::connect(cli.base_url.as_deref(), cli.page_size)?;

    match cli.command {
        Commands::Products {
            page,
            sort_by,
            order,
        } => commands::catalog::list_page(&session, page, sort_by, order).await,
        Commands::Browse {
            pages,
            sort_by,
            order,
        } => commands::catalog::browse(&session, pages, sort_by, order).await,
        Commands::Product { id } => commands::catalog::show_product(&session, id).await,
        Commands::Compare { ids } => commands::compare::compare(&session, &ids).await,
    }
}
