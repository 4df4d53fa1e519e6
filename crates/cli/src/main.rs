//! Tey CLI - Drive the storefront cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Add one shirt (stock 3) to the cart
//! tey-cli cart add --id 7 --title Shirt --price 50000 --stock 3
//!
//! # Change its quantity (refused if above stock)
//! tey-cli cart update --id 7 --quantity 2
//!
//! # Show the cart
//! tey-cli cart show
//!
//! # Stage selected items and print the transaction body
//! tey-cli cart checkout --select 7 --payment-method 2 --discount HEMAT10
//!
//! # Record a successful checkout
//! tey-cli cart complete
//! ```
//!
//! # Commands
//!
//! - `cart add` / `remove` / `update` / `clear` - Mutate the cart
//! - `cart show` - Print the cart, optionally as JSON
//! - `cart checkout` / `complete` - Stage and finish a checkout

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::{CliConfig, LogFormat};

#[derive(Parser)]
#[command(name = "tey-cli")]
#[command(author, version, about = "Tey storefront cart tools")]
struct Cli {
    /// Cart storage directory (overrides `TEY_CART_DIR`)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product to the cart
    Add {
        /// Product ID
        #[arg(long)]
        id: i32,

        /// Product title
        #[arg(long)]
        title: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Available stock
        #[arg(long)]
        stock: u32,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        #[arg(long)]
        id: i32,
    },
    /// Set a product's quantity (0 removes it)
    Update {
        /// Product ID
        #[arg(long)]
        id: i32,

        /// New quantity
        #[arg(short, long)]
        quantity: u32,
    },
    /// Empty the cart
    Clear,
    /// Print the cart
    Show {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Stage selected products for checkout
    Checkout {
        /// Product IDs to check out (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        select: Vec<i32>,

        /// Payment method ID; prints the transaction body when given
        #[arg(long)]
        payment_method: Option<i32>,

        /// Discount code
        #[arg(long)]
        discount: Option<String>,
    },
    /// Record a successful checkout, removing purchased items
    Complete,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the tracing subscriber.
///
/// Defaults to info level for the cart crates if `RUST_LOG` is not set.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tey_cart=info,tey_cli=info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn main() {
    let cli = Cli::parse();

    let mut config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };
    if let Some(dir) = cli.dir {
        config.cart_dir = dir;
    }

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli.command, &config);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Cart { action } => match action {
            CartAction::Add {
                id,
                title,
                price,
                stock,
                quantity,
            } => commands::cart::add(config, id, &title, price, stock, quantity)?,
            CartAction::Remove { id } => commands::cart::remove(config, id)?,
            CartAction::Update { id, quantity } => commands::cart::update(config, id, quantity)?,
            CartAction::Clear => commands::cart::clear(config)?,
            CartAction::Show { json } => commands::cart::show(config, json)?,
            CartAction::Checkout {
                select,
                payment_method,
                discount,
            } => commands::cart::checkout(config, &select, payment_method, discount.as_deref())?,
            CartAction::Complete => commands::cart::complete(config)?,
        },
    }
    Ok(())
}
