//! Cracker Cart CLI - shop from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart and its grand total
//! cc-cli --user-id 21 cart
//!
//! # List saved delivery addresses
//! cc-cli --user-id 21 addresses
//!
//! # Check whether a coupon applies
//! cc-cli --user-id 21 coupon DIWALI50
//!
//! # Save a new address
//! cc-cli --user-id 21 add-address --line1 "4 Car Street" --line2 "Opp. Post Office" \
//!     --city Sivakasi --state "Tamil Nadu" --pin-code 626123 \
//!     --contact-no 9876543210 --alternate-contact 9123456780
//!
//! # Place a cash-on-delivery order with a coupon
//! cc-cli --user-id 21 checkout --address-id 4 --payment cod --coupon DIWALI50
//! ```
//!
//! # Environment Variables
//!
//! - `CC_STORE_BASE_URL` - store backend base URL (required)
//! - `CC_USER_ID` - default for `--user-id`
//! - `CC_LOG_FORMAT` - set to `json` for JSON log lines
//! - `PAYU_*` - enables `--payment online`
//! - `SENTRY_DSN` - enables error reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cracker_cart_client::{ClientConfig, ClientError};
use cracker_cart_core::{AddressId, PaymentMode, UserId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "cc-cli")]
#[command(author, version, about = "Cracker Cart shopper CLI")]
struct Cli {
    /// Store user id to act as
    #[arg(short, long, env = "CC_USER_ID")]
    user_id: UserId,

    /// Display name, sent with online payments
    #[arg(long, env = "CC_USER_NAME")]
    user_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart lines and grand total
    Cart,
    /// List saved delivery addresses
    Addresses,
    /// Check whether a coupon applies to the cart
    Coupon {
        /// Coupon code (at least 4 characters)
        code: String,
    },
    /// Save a new delivery address
    AddAddress(commands::AddressArgs),
    /// Place an order
    Checkout {
        /// Saved address to deliver to
        #[arg(short, long)]
        address_id: AddressId,

        /// Payment mode (`cod`, `online`)
        #[arg(short, long)]
        payment: PaymentMode,

        /// Coupon code to apply first
        #[arg(short, long)]
        coupon: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cc_cli=info,cracker_cart_client=info".into());
    let json = std::env::var("CC_LOG_FORMAT").is_ok_and(|format| format == "json");

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Sentry must exist before the subscriber so the layer has a client
    let config = ClientConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            tracing::error!(reason = %e, "{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), ClientError> {
    let shopper = commands::Shopper::open(config, cli.user_id, cli.user_name)?;
    match cli.command {
        Commands::Cart => commands::cart(shopper).await,
        Commands::Addresses => commands::addresses(shopper).await,
        Commands::Coupon { code } => commands::coupon(shopper, &code).await,
        Commands::AddAddress(args) => commands::add_address(shopper, args).await,
        Commands::Checkout {
            address_id,
            payment,
            coupon,
        } => commands::checkout(shopper, address_id, payment, coupon.as_deref()).await,
    }
}
