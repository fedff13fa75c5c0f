//! Subcommand handlers.
//!
//! Each handler is one presentation-layer call into [`CartService`]. Notices
//! raised by the engine are printed as they arrive; render and badge events
//! are answered by printing the refreshed cart or count where useful.

#![allow(clippy::print_stdout)]

use std::str::FromStr;

use pipo_cart::{
    CartConfig, CartError, CartEvent, CartService, CartSummary, ConfigError, FileStore,
    NoticeLevel, Product, QuantityChange, StorageError,
};
use pipo_core::{LineItemId, Price, QuantityDirection};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while running a subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not open store: {0}")]
    Store(#[from] StorageError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Could not encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    /// Whether the command was refused because of what the shopper asked
    /// for. The cart has already reported these to the shopper.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Cart(e) if e.is_validation())
    }
}

/// Parse a price argument, accepting `,` or `.` as the decimal separator.
pub fn parse_price(raw: &str) -> Result<Price, String> {
    let normalized = raw.trim().trim_start_matches("R$").trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .map(Price::new)
        .map_err(|e| format!("invalid price {raw:?}: {e}"))
}

/// Open the file store named by the environment and wire up notice output.
pub fn open_service() -> Result<CartService<FileStore>, CommandError> {
    let config = CartConfig::from_env()?;
    let store = FileStore::open(&config.store_path)?;
    tracing::debug!(path = %store.path().display(), "Using file store");

    let mut service = CartService::from_config(store, &config);
    tracing::debug!(
        cart_key = service.store().cart_key(),
        shipping_key = service.store().shipping_key(),
        "Using storage keys"
    );
    service.subscribe(|event: &CartEvent| {
        if let CartEvent::Notice(notice) = event {
            let marker = match notice.level {
                NoticeLevel::Info => "i",
                NoticeLevel::Success => "✓",
                NoticeLevel::Warning => "!",
            };
            println!("[{marker}] {}", notice.message);
        }
    });
    Ok(service)
}

pub fn add(
    service: &mut CartService<FileStore>,
    title: String,
    price: Price,
    image: String,
) -> Result<(), CommandError> {
    let line = service.add_item(Product::new(title, price, image))?;
    println!(
        "Adicionado! {} x{} (id {})",
        line.title, line.quantity, line.id
    );
    count(service)
}

pub fn change_quantity(
    service: &mut CartService<FileStore>,
    id: LineItemId,
    direction: QuantityDirection,
) -> Result<(), CommandError> {
    match service.change_quantity(id, direction)? {
        QuantityChange::Updated(line) => println!("{} agora x{}", line.title, line.quantity),
        QuantityChange::Removed(line) => println!("{} removido do carrinho", line.title),
        QuantityChange::NotFound => println!("Nenhum item com id {id}"),
    }
    show(service, false)
}

pub fn remove(service: &mut CartService<FileStore>, id: LineItemId) -> Result<(), CommandError> {
    match service.remove_item(id)? {
        Some(line) => println!("{} removido do carrinho", line.title),
        None => println!("Nenhum item com id {id}"),
    }
    show(service, false)
}

pub fn shipping(
    service: &mut CartService<FileStore>,
    postal_code: &str,
) -> Result<(), CommandError> {
    let result = service.calculate_shipping(postal_code);
    // Totals are refreshed even when the CEP was rejected.
    if !matches!(result, Err(CartError::EmptyCart)) {
        print_totals(&service.cart_summary()?);
    }
    result?;
    Ok(())
}

pub fn checkout(
    service: &mut CartService<FileStore>,
    cep: Option<String>,
) -> Result<(), CommandError> {
    if let Some(cep) = cep {
        service.set_postal_code_field(cep);
    }
    service.finalize_order()?;
    Ok(())
}

pub fn show(service: &CartService<FileStore>, json: bool) -> Result<(), CommandError> {
    let summary = service.cart_summary()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.is_empty {
        println!("Seu carrinho está vazio. Visite o cardápio para começar a montar seu pedido!");
        return Ok(());
    }

    for line in &summary.lines {
        println!(
            "{:>15}  {:<30} {:>3} x {:>12} = {:>12}",
            line.id.to_string(),
            line.title,
            line.quantity,
            line.unit_price,
            line.line_total
        );
    }
    print_totals(&summary);
    Ok(())
}

pub fn count(service: &CartService<FileStore>) -> Result<(), CommandError> {
    println!("{}", service.item_count()?);
    Ok(())
}

fn print_totals(summary: &CartSummary) {
    println!("Subtotal: {}", summary.subtotal_display);
    println!("{}", summary.shipping_label);
    println!("Total:    {}", summary.total_display);
}
