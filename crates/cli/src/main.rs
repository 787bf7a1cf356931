//! KeyNest CLI - drive the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! keynest catalog list
//! keynest catalog search tactile
//!
//! # Sign in, fill the cart and pay
//! keynest auth sign-in -e test@example.com -p secret
//! keynest cart add 7
//! keynest cart show
//! keynest checkout pay --method qr
//! ```
//!
//! # Commands
//!
//! - `catalog` - List or search the catalog
//! - `cart` - Inspect and edit the persisted cart
//! - `auth` - Mock sign-in, sign-up, sign-out and password reset
//! - `checkout` - Order summary, buy-now and simulated payment
//!
//! State persists between invocations under `KEYNEST_DATA_DIR`; see
//! [`keynest_storefront::config`] for every variable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use keynest_storefront::notify::TracingNotifier;
use keynest_storefront::services::PaymentMethod;
use keynest_storefront::{Storefront, StorefrontConfig};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "keynest")]
#[command(author, version, about = "KeyNest storefront CLI")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Review and pay for the cart
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List every item
    List,
    /// Search names, descriptions, stores and badges
    Search {
        /// Text to look for (case-insensitive)
        term: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add one unit of an item (requires sign-in)
    Add {
        /// Catalog id
        id: u32,
    },
    /// Remove one unit of an item
    Dec {
        /// Catalog id
        id: u32,
    },
    /// Remove an item entirely
    Remove {
        /// Catalog id
        id: u32,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in (any email and non-empty password)
    SignIn {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    SignUp {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Must match --password
        #[arg(short, long)]
        confirm: String,
    },
    /// Sign out and empty the cart
    SignOut,
    /// Show who is signed in and until when
    Status,
    /// Request a password reset link
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Show the order summary for the cart
    Summary,
    /// Add one item and show the order summary
    BuyNow {
        /// Catalog id
        id: u32,
    },
    /// Pay for the cart and empty it
    Pay {
        /// `card` or `qr`
        #[arg(short, long, default_value = "card")]
        method: PaymentMethod,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "keynest_cli=info,keynest_storefront::notify=info,keynest_storefront=warn".into()
    });
    if cli.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
            .init();
    }

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = StorefrontConfig::from_env()?;
    let mut shop = Storefront::open(config, Arc::new(TracingNotifier))?;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list(&shop),
            CatalogAction::Search { term } => commands::catalog::search(&shop, &term),
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&mut shop),
            CartAction::Add { id } => commands::cart::add(&mut shop, id)?,
            CartAction::Dec { id } => commands::cart::decrement(&mut shop, id)?,
            CartAction::Remove { id } => commands::cart::remove(&mut shop, id)?,
            CartAction::Clear => commands::cart::clear(&mut shop)?,
        },
        Commands::Auth { action } => match action {
            AuthAction::SignIn { email, password } => {
                commands::auth::sign_in(&mut shop, &email, password)?;
            }
            AuthAction::SignUp {
                name,
                email,
                password,
                confirm,
            } => commands::auth::sign_up(&mut shop, name, email, password, confirm)?,
            AuthAction::SignOut => commands::auth::sign_out(&mut shop)?,
            AuthAction::Status => commands::auth::status(&shop),
            AuthAction::ForgotPassword { email } => {
                commands::auth::forgot_password(&shop, &email).await?;
            }
        },
        Commands::Checkout { action } => match action {
            CheckoutAction::Summary => commands::checkout::summary(&mut shop)?,
            CheckoutAction::BuyNow { id } => commands::checkout::buy_now(&mut shop, id)?,
            CheckoutAction::Pay { method } => commands::checkout::pay(&mut shop, method)?,
        },
    }
    Ok(())
}
