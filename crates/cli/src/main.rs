//! Pipo CLI - drive the cart from a terminal.
//!
//! Plays the part of the storefront pages: every subcommand is one button
//! press on the menu or cart page, run against a JSON file store.
//!
//! # Usage
//!
//! ```bash
//! # Add a product (menu page "add to cart" button)
//! pipo add --title "Pipoca Doce" --price 12,90 --image img/doce.png
//!
//! # Adjust quantities and remove lines (cart page +, -, X)
//! pipo increment 1717171717171
//! pipo decrement 1717171717171
//! pipo remove 1717171717171
//!
//! # Simulate shipping and checkout
//! pipo shipping 08790-000
//! pipo checkout
//!
//! # Render the cart or the badge count
//! pipo show
//! pipo show --json
//! pipo count
//! ```
//!
//! # Environment Variables
//!
//! See `pipo_cart::config` (`PIPO_STORE_PATH`, `PIPO_CART_KEY`, ...).
//! `RUST_LOG` controls log output (default: `pipo_cart=info,pipo_cli=info`).
//!
//! # Exit Status
//!
//! `0` on success, `2` when the cart refuses the request (the reason has
//! already been printed), `1` for storage, configuration, or output failures.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use pipo_core::{LineItemId, Price};

mod commands;

#[derive(Parser)]
#[command(name = "pipo")]
#[command(author, version, about = "Pipo storefront cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product to the cart
    Add {
        /// Product title (lines are merged by exact title)
        #[arg(short, long)]
        title: String,

        /// Unit price in reais, `12.90` or `12,90`
        #[arg(short, long, value_parser = commands::parse_price)]
        price: Price,

        /// Product image path or URL
        #[arg(short, long)]
        image: String,
    },
    /// Add one unit to a cart line
    Increment {
        /// Line item id as shown by `pipo show`
        id: LineItemId,
    },
    /// Take one unit from a cart line (removes it at quantity 1)
    Decrement {
        /// Line item id as shown by `pipo show`
        id: LineItemId,
    },
    /// Remove a cart line
    Remove {
        /// Line item id as shown by `pipo show`
        id: LineItemId,
    },
    /// Calculate simulated shipping for a postal code (CEP)
    Shipping {
        /// Eight-digit CEP; separators are ignored
        postal_code: String,
    },
    /// Finalize the order and clear the cart
    Checkout {
        /// CEP currently in the postal code field
        #[arg(long)]
        cep: Option<String>,
    },
    /// Show the cart with totals
    Show {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the number of units in the cart
    Count,
}

fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pipo_cart=info,pipo_cli=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        // Refusals were already reported by the cart.
        if e.is_validation() {
            tracing::debug!("Command refused: {e}");
            std::process::exit(2);
        }
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let mut service = commands::open_service()?;

    match cli.command {
        Commands::Add {
            title,
            price,
            image,
        } => commands::add(&mut service, title, price, image)?,
        Commands::Increment { id } => {
            commands::change_quantity(&mut service, id, pipo_core::QuantityDirection::Increment)?;
        }
        Commands::Decrement { id } => {
            commands::change_quantity(&mut service, id, pipo_core::QuantityDirection::Decrement)?;
        }
        Commands::Remove { id } => commands::remove(&mut service, id)?,
        Commands::Shipping { postal_code } => commands::shipping(&mut service, &postal_code)?,
        Commands::Checkout { cep } => commands::checkout(&mut service, cep)?,
        Commands::Show { json } => commands::show(&service, json)?,
        Commands::Count => commands::count(&service)?,
    }
    Ok(())
}
