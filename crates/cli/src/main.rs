//! Vitrina CLI - drive the storefront and back-office from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Load the seed catalog into the data directory
//! vitrina seed
//!
//! # Browse and search
//! vitrina catalog list --category audio --sort price-asc
//! vitrina catalog search "auri"
//!
//! # Fill the cart and place an order
//! vitrina cart add p-001 --quantity 2
//! vitrina checkout --name "Ana Pérez" --email ana@example.com --phone 04141234567 \
//!     --delivery pickup --pickup-point "Centro" --payment zelle
//!
//! # Back-office
//! vitrina orders list --status processing
//! vitrina orders status ORD-1781710200000 shipped
//! vitrina dashboard --visitors 1200
//! tail -f events.jsonl | vitrina events
//! ```
//!
//! # Environment Variables
//!
//! - `VITRINA_DATA_DIR` - Data directory (`none` keeps state in memory)
//! - `VITRINA_SEED_DIR` - Directory holding the seed JSON files
//! - `VITRINA_ORDER_PREFIX` - Prefix of generated order ids
//! - `VITRINA_LOW_STOCK_THRESHOLD` - Stock level that raises a low-stock alert
//! - `VITRINA_BACKEND_URL` / `VITRINA_BACKEND_TOKEN` - Optional backend API
//! - `SENTRY_DSN` - Optional error tracking

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrina_core::{OrderStatus, ProductStatus};
use vitrina_storefront::config::StorefrontConfig;

mod commands;

use commands::checkout::CheckoutArgs;

#[derive(Parser)]
#[command(name = "vitrina")]
#[command(author, version, about = "Vitrina storefront and back-office tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the catalog with the seed documents
    Seed,
    /// Browse and edit the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout(Box<CheckoutArgs>),
    /// Order console
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Customer account (requires a backend)
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Print the back-office dashboard as JSON
    Dashboard {
        /// Unique visitors in the period, for the conversion rate
        #[arg(long, default_value_t = 0)]
        visitors: u64,
    },
    /// Read operator events as JSON lines from stdin and print their toasts
    Events,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List published products
    List {
        /// Category slug
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum price
        #[arg(long)]
        max_price: Option<rust_decimal::Decimal>,

        /// Only products with an old price
        #[arg(long)]
        on_sale: bool,

        /// Attribute filter as `name=value`, repeatable
        #[arg(short, long = "attr")]
        attributes: Vec<String>,

        /// `featured`, `price-asc`, `price-desc` or `name`
        #[arg(short, long, default_value = "featured")]
        sort: String,
    },
    /// List categories with product counts
    Categories,
    /// Search products by name, category or tag
    Search { query: String },
    /// Compare up to three products side by side
    Compare {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Import products from a JSON array of rows
    Import {
        path: std::path::PathBuf,

        /// Status for rows that set none
        #[arg(long, default_value = "draft")]
        status: ProductStatus,
    },
    /// Show the deal of the day, or make a product the deal
    Deal { id: Option<String> },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product
    Add {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity by a signed amount
    Update {
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Remove a line
    Remove { id: String },
    /// Show the cart
    Show,
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders, newest first
    List {
        #[arg(short, long)]
        status: Option<OrderStatus>,

        /// Match on order id, customer name or email
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Set an order's status
    Status { id: String, status: OrderStatus },
    /// Show an order's fulfillment timeline
    Timeline { id: String },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// The signed-in customer's orders
    Orders,
}

/// Log filter used when `RUST_LOG` is unset. The binary logs under its own
/// crate name (`vitrina`), the libraries under theirs.
const DEFAULT_LOG_FILTER: &str = concat!(
    env!("CARGO_CRATE_NAME"),
    "=info,vitrina_storefront=info,vitrina_admin=info"
);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> commands::CommandResult {
    match cli.command {
        Commands::Seed => commands::seed::run(config)?,
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                category,
                max_price,
                on_sale,
                attributes,
                sort,
            } => commands::catalog::list(
                config,
                &commands::catalog::ListArgs {
                    category,
                    max_price,
                    on_sale,
                    attributes,
                    sort,
                },
            )?,
            CatalogAction::Categories => commands::catalog::categories(config)?,
            CatalogAction::Search { query } => commands::catalog::search(config, &query)?,
            CatalogAction::Compare { ids } => commands::catalog::compare(config, &ids)?,
            CatalogAction::Import { path, status } => {
                commands::catalog::import(config, &path, status)?;
            }
            CatalogAction::Deal { id } => commands::catalog::deal(config, id.as_deref())?,
        },
        Commands::Cart { action } => match action {
            CartAction::Add { id, quantity } => commands::cart::add(config, &id, quantity)?,
            CartAction::Update { id, delta } => commands::cart::update(config, &id, delta)?,
            CartAction::Remove { id } => commands::cart::remove(config, &id)?,
            CartAction::Show => commands::cart::show(config)?,
            CartAction::Clear => commands::cart::clear(config)?,
        },
        Commands::Checkout(args) => commands::checkout::run(config, *args).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List { status, query } => {
                commands::orders::list(config, status, query)?;
            }
            OrdersAction::Status { id, status } => {
                commands::orders::set_status(config, &id, status)?;
            }
            OrdersAction::Timeline { id } => commands::orders::timeline(config, &id)?,
        },
        Commands::Account { action } => match action {
            AccountAction::Login { email, password } => {
                commands::account::login(config, &email, password).await?;
            }
            AccountAction::Logout => commands::account::logout(config).await?,
            AccountAction::Orders => commands::account::orders(config)?,
        },
        Commands::Dashboard { visitors } => commands::dashboard::run(config, visitors)?,
        Commands::Events => commands::events::run()?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_covers_every_crate() {
        let own_target = module_path!().split("::").next().unwrap();
        let targets: Vec<&str> = DEFAULT_LOG_FILTER
            .split(',')
            .map(|directive| directive.split('=').next().unwrap())
            .collect();
        assert_eq!(targets, vec![own_target, "vitrina_storefront", "vitrina_admin"]);
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
