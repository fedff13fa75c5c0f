//! Cart service: the command handlers the presentation layer calls.
//!
//! Every command reloads the cart from storage, applies its change, persists
//! it, and then tells observers what happened. Nothing is cached between
//! calls, so services whose backends share state (such as two [`FileStore`]s
//! on one path) see each other's changes on their next command.
//!
//! [`FileStore`]: crate::FileStore
//!
//! When both the cart and the shipping fee must change, the shipping fee is
//! written first. If the second write fails the store still satisfies "an
//! empty cart has no shipping value".

use pipo_core::{LineItemId, PostalCode, Price, QuantityDirection};
use serde::Serialize;
use tracing::instrument;

use crate::checkout::{self, OrderReceipt};
use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::events::{CartEvent, CartObserver, Notice};
use crate::ids::{ClockIdGenerator, IdGenerator};
use crate::model::{Cart, LineItem, Product};
use crate::shipping::{ShippingQuote, ShippingRules};
use crate::storage::{CartStore, KeyValueStore};
use crate::totals::{CartSummary, Totals};

const QUANTITY_LIMIT_NOTICE: &str = "Quantidade máxima deste item já está no carrinho.";

/// Outcome of [`CartService::change_quantity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "item", rename_all = "snake_case")]
pub enum QuantityChange {
    /// The line now has the contained quantity.
    Updated(LineItem),
    /// The line was at quantity 1 and has been removed.
    Removed(LineItem),
    /// No line has that id; nothing was written.
    NotFound,
}

/// Cart engine over an injected key-value store.
pub struct CartService<S> {
    store: CartStore<S>,
    ids: Box<dyn IdGenerator>,
    rules: ShippingRules,
    observers: Vec<Box<dyn CartObserver>>,
    postal_code_field: Option<String>,
}

impl<S: KeyValueStore> CartService<S> {
    /// Service with timestamp ids and default shipping rules.
    pub fn new(store: CartStore<S>) -> Self {
        Self {
            store,
            ids: Box::new(ClockIdGenerator::new()),
            rules: ShippingRules::default(),
            observers: Vec::new(),
            postal_code_field: None,
        }
    }

    /// Service over `backend` using the keys and shipping rules in `config`.
    pub fn from_config(backend: S, config: &CartConfig) -> Self {
        let store = CartStore::with_keys(backend, &config.cart_key, &config.shipping_key);
        Self::new(store).with_shipping_rules(config.shipping.clone())
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    #[must_use]
    pub fn with_shipping_rules(mut self, rules: ShippingRules) -> Self {
        self.rules = rules;
        self
    }

    /// Register an observer for cart events.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    pub fn into_store(self) -> CartStore<S> {
        self.store
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current cart, freshly loaded.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be loaded.
    pub fn cart(&self) -> Result<Cart> {
        Ok(self.store.load_cart()?)
    }

    /// Sum of price times quantity; zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be loaded.
    pub fn subtotal(&self) -> Result<Price> {
        Ok(self.cart()?.subtotal())
    }

    /// Total units in the cart, for the navbar badge.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be loaded.
    pub fn item_count(&self) -> Result<u32> {
        Ok(self.cart()?.item_count())
    }

    /// Subtotal, persisted shipping (zero if absent), and total.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the store cannot be read.
    pub fn compute_totals(&self) -> Result<Totals> {
        let cart = self.cart()?;
        Ok(Totals::for_cart(&cart, self.store.load_shipping()?))
    }

    /// Everything the cart page needs to render.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the store cannot be read.
    pub fn cart_summary(&self) -> Result<CartSummary> {
        let cart = self.cart()?;
        Ok(CartSummary::new(&cart, self.store.load_shipping()?))
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Add one unit of `product`, merging with an existing line of the same
    /// title.
    ///
    /// # Errors
    ///
    /// - `CartError::IncompleteProduct` if the product lacks a title, price,
    ///   or image; the cart is not touched
    /// - `CartError::QuantityLimit` if the matching line is already full
    /// - `CartError::Storage` if the cart cannot be loaded or saved
    #[instrument(skip(self, product), fields(title = %product.title))]
    pub fn add_item(&mut self, product: Product) -> Result<LineItem> {
        if let Err(e) = product.validate() {
            tracing::error!("Rejecting product with incomplete data: {e}");
            return Err(e);
        }

        let mut cart = self.store.load_cart()?;
        let taken: Vec<LineItemId> = cart.items().iter().map(|item| item.id).collect();
        let ids = &mut self.ids;
        let added = cart.add(product, || loop {
            let id = ids.next_id();
            if !taken.contains(&id) {
                break id;
            }
        });
        let line = match added {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Not adding item: {e}");
                self.notice(Notice::warning(QUANTITY_LIMIT_NOTICE));
                return Err(e);
            }
        };
        self.store.save_cart(&cart)?;

        tracing::info!(id = %line.id, quantity = line.quantity, "Added item to cart");
        self.emit(&CartEvent::BadgeChanged {
            count: cart.item_count(),
        });
        Ok(line)
    }

    /// Move a line's quantity up or down by one. Decrementing a line at
    /// quantity 1 removes it.
    ///
    /// # Errors
    ///
    /// - `CartError::QuantityLimit` when incrementing a full line; nothing is
    ///   written
    /// - `CartError::Storage` if the cart cannot be loaded or saved
    #[instrument(skip(self))]
    pub fn change_quantity(
        &mut self,
        id: LineItemId,
        direction: QuantityDirection,
    ) -> Result<QuantityChange> {
        let mut cart = self.store.load_cart()?;
        let Some(line) = cart.get_mut(id) else {
            tracing::debug!("No line with that id; ignoring");
            return Ok(QuantityChange::NotFound);
        };

        match direction {
            QuantityDirection::Increment => {
                if let Err(e) = line.increment() {
                    tracing::warn!("Not incrementing: {e}");
                    self.notice(Notice::warning(QUANTITY_LIMIT_NOTICE));
                    return Err(e);
                }
            }
            QuantityDirection::Decrement if line.quantity > 1 => line.quantity -= 1,
            QuantityDirection::Decrement => {
                return Ok(self
                    .remove_item(id)?
                    .map_or(QuantityChange::NotFound, QuantityChange::Removed));
            }
        }
        let updated = line.clone();

        self.store.save_cart(&cart)?;
        tracing::info!(quantity = updated.quantity, "Changed item quantity");
        self.refresh(&cart);
        Ok(QuantityChange::Updated(updated))
    }

    /// Remove the line with `id`. Emptying the cart also clears the stored
    /// shipping fee.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the store cannot be read or written.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: LineItemId) -> Result<Option<LineItem>> {
        let mut cart = self.store.load_cart()?;
        let removed = cart.remove(id);

        if cart.is_empty() {
            self.store.clear_shipping()?;
        }

        let Some(removed) = removed else {
            tracing::debug!("No line with that id; ignoring");
            return Ok(None);
        };

        self.store.save_cart(&cart)?;
        tracing::info!(title = %removed.title, "Removed item from cart");
        self.refresh(&cart);
        Ok(Some(removed))
    }

    /// Record what the shopper typed in the postal code field without
    /// calculating shipping. Checkout consults it.
    pub fn set_postal_code_field(&mut self, raw: impl Into<String>) {
        self.postal_code_field = Some(raw.into());
    }

    /// Last value seen in the postal code field.
    #[must_use]
    pub fn postal_code_field(&self) -> Option<&str> {
        self.postal_code_field.as_deref()
    }

    /// Estimate shipping for `raw_postal_code` and persist the fee.
    ///
    /// # Errors
    ///
    /// - `CartError::EmptyCart` if there is nothing to ship; nothing is written
    /// - `CartError::InvalidPostalCode` if the input does not have 8 digits;
    ///   the stored fee is reset to zero
    /// - `CartError::Storage` if the store cannot be read or written
    #[instrument(skip(self))]
    pub fn calculate_shipping(&mut self, raw_postal_code: &str) -> Result<ShippingQuote> {
        self.postal_code_field = Some(raw_postal_code.to_owned());

        let cart = self.store.load_cart()?;
        if cart.is_empty() {
            tracing::warn!("Shipping requested for an empty cart");
            self.notice(Notice::warning(
                "Adicione itens ao carrinho antes de calcular o frete.",
            ));
            return Err(CartError::EmptyCart);
        }

        let postal_code = match PostalCode::parse(raw_postal_code) {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!("Invalid postal code: {e}");
                self.store.save_shipping(Price::ZERO)?;
                self.notice(Notice::warning(
                    "Por favor, insira um CEP válido de 8 dígitos para calcular o frete.",
                ));
                self.emit(&CartEvent::CartChanged);
                return Err(e.into());
            }
        };

        let quote = self.rules.quote(&postal_code, cart.subtotal());
        self.store.save_shipping(quote.fee)?;
        tracing::info!(
            postal_code = %postal_code,
            region = ?quote.region,
            distance_km = %quote.distance_km,
            fee = %quote.fee.amount(),
            "Calculated shipping"
        );

        let notice = if quote.free {
            Notice::success(format!(
                "Frete grátis! Seu pedido é acima de {} (região próxima simulada).",
                self.rules.free_shipping_threshold
            ))
        } else {
            Notice::info(format!(
                "Frete simulado calculado em {} (distância simulada: {} km).",
                quote.fee,
                quote.distance_label()
            ))
        };
        self.notice(notice);
        self.emit(&CartEvent::CartChanged);
        Ok(quote)
    }

    /// Simulate placing the order: confirm the total, then clear the cart and
    /// the stored shipping fee.
    ///
    /// # Errors
    ///
    /// - `CartError::EmptyCart` if the cart is empty
    /// - `CartError::ShippingNotCalculated` if shipping is zero or missing and
    ///   the postal code field does not hold a valid CEP
    /// - `CartError::Storage` if the store cannot be read or written
    #[instrument(skip(self))]
    pub fn finalize_order(&mut self) -> Result<OrderReceipt> {
        let cart = self.store.load_cart()?;
        let shipping = self.store.load_shipping()?;

        if let Err(e) = checkout::ensure_ready(&cart, shipping, self.postal_code_field.as_deref()) {
            tracing::warn!("Checkout refused: {e}");
            let message = match e {
                CartError::EmptyCart => {
                    "Seu carrinho está vazio. Adicione itens antes de finalizar."
                }
                _ => "Por favor, insira e calcule o frete antes de finalizar o pedido.",
            };
            self.notice(Notice::warning(message));
            return Err(e);
        }

        let receipt = OrderReceipt {
            totals: Totals::for_cart(&cart, shipping),
            items: cart.into_items(),
        };
        tracing::info!(
            lines = receipt.items.len(),
            total = %receipt.totals.total.amount(),
            "Order finalized"
        );
        self.notice(Notice::success(receipt.confirmation_message()));

        self.store.clear_shipping()?;
        self.store.clear_cart()?;
        self.refresh(&Cart::default());
        Ok(receipt)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    fn emit(&mut self, event: &CartEvent) {
        for observer in &mut self.observers {
            observer.notify(event);
        }
    }

    fn notice(&mut self, notice: Notice) {
        self.emit(&CartEvent::Notice(notice));
    }

    /// Ask for a re-render and a badge update.
    fn refresh(&mut self, cart: &Cart) {
        self.emit(&CartEvent::CartChanged);
        self.emit(&CartEvent::BadgeChanged {
            count: cart.item_count(),
        });
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for CartService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService")
            .field("store", &self.store)
            .field("rules", &self.rules)
            .field("observers", &self.observers.len())
            .field("postal_code_field", &self.postal_code_field)
            .finish_non_exhaustive()
    }
}
