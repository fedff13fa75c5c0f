//! Integration tests for shopper journeys through the cart service.
//!
//! These drive `CartService` the way the menu and cart pages do, checking
//! both the persisted store and the events a presentation layer would see.

use pipo_cart::{CartError, CartEvent, KeyValueStore, NoticeLevel, QuantityChange};
use pipo_core::{Price, QuantityDirection};
use pipo_integration_tests::{memory_service, product};

// =============================================================================
// Menu Page
// =============================================================================

#[test]
fn test_repeat_add_merges_by_title() {
    let (mut cart, log) = memory_service();

    cart.add_item(product("Pipoca Doce", 1_290)).unwrap();
    cart.add_item(product("Pipoca Salgada", 1_090)).unwrap();
    cart.add_item(product("Pipoca Doce", 1_290)).unwrap();

    let items = cart.cart().unwrap().into_items();
    assert_eq!(items.len(), 2);
    assert_eq!(items.first().map(|i| i.quantity), Some(2));
    assert_eq!(cart.item_count().unwrap(), 3);

    // Only badge refreshes come out of the menu page.
    assert!(log
        .events()
        .iter()
        .all(|e| matches!(e, CartEvent::BadgeChanged { .. })));
    assert_eq!(log.last_badge_count(), Some(3));
}

// =============================================================================
// Cart Page
// =============================================================================

#[test]
fn test_quantity_buttons_down_to_removal() {
    let (mut cart, log) = memory_service();
    let id = cart.add_item(product("Refrigerante", 600)).unwrap().id;
    cart.add_item(product("Combo", 3_500)).unwrap();

    cart.change_quantity(id, QuantityDirection::Increment).unwrap();
    assert_eq!(cart.subtotal().unwrap(), Price::from_cents(4_700));

    cart.change_quantity(id, QuantityDirection::Decrement).unwrap();
    let last = cart.change_quantity(id, QuantityDirection::Decrement).unwrap();

    assert!(matches!(last, QuantityChange::Removed(_)));
    assert_eq!(cart.cart().unwrap().len(), 1);
    assert_eq!(log.last_badge_count(), Some(1));
}

#[test]
fn test_emptying_cart_resets_shipping_and_totals() {
    let (mut cart, _) = memory_service();
    let id = cart.add_item(product("Combo", 3_500)).unwrap().id;
    cart.calculate_shipping("20040-000").unwrap();
    assert_eq!(cart.compute_totals().unwrap().total, Price::from_cents(4_000));

    cart.change_quantity(id, QuantityDirection::Decrement).unwrap();

    let totals = cart.compute_totals().unwrap();
    assert_eq!(totals.subtotal, Price::ZERO);
    assert_eq!(totals.shipping, Price::ZERO);
    assert!(
        cart.store()
            .backend()
            .get_item("freteValor")
            .unwrap()
            .is_none()
    );

    let summary = cart.cart_summary().unwrap();
    assert!(summary.is_empty);
    assert_eq!(summary.shipping_label, "Frete: Grátis / Não calculado");
}

// =============================================================================
// Shipping
// =============================================================================

#[test]
fn test_free_shipping_promotion() {
    let (mut cart, log) = memory_service();
    cart.add_item(product("Balde Gigante", 7_500)).unwrap();

    let quote = cart.calculate_shipping("08790000").unwrap();

    assert!(quote.free);
    assert_eq!(cart.compute_totals().unwrap().total, Price::from_cents(7_500));
    let notice = log.notices().pop().unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert!(notice.message.contains("R$ 70,00"));
}

#[test]
fn test_nearby_shipping_below_threshold_is_base_fee() {
    let (mut cart, _) = memory_service();
    cart.add_item(product("Pipoca Doce", 1_290)).unwrap();

    let quote = cart.calculate_shipping("08790-000").unwrap();

    assert!(!quote.free);
    assert_eq!(quote.fee, Price::from_cents(300));
}

#[test]
fn test_far_shipping_fee() {
    let (mut cart, _) = memory_service();
    cart.add_item(product("Pipoca Doce", 1_290)).unwrap();

    let quote = cart.calculate_shipping("01310000").unwrap();

    assert_eq!(quote.fee, Price::from_cents(800));
    assert_eq!(cart.compute_totals().unwrap().total, Price::from_cents(2_090));
}

#[test]
fn test_short_postal_code_resets_fee_without_touching_cart() {
    let (mut cart, log) = memory_service();
    cart.add_item(product("Pipoca Doce", 1_290)).unwrap();
    cart.calculate_shipping("01310000").unwrap();
    let before = cart.cart().unwrap();

    let err = cart.calculate_shipping("1234").unwrap_err();

    assert!(matches!(err, CartError::InvalidPostalCode(_)));
    assert_eq!(cart.compute_totals().unwrap().shipping, Price::ZERO);
    assert_eq!(cart.cart().unwrap(), before);
    assert_eq!(
        log.notices().pop().map(|n| n.level),
        Some(NoticeLevel::Warning)
    );
}

// =============================================================================
// Checkout
// =============================================================================

#[test]
fn test_checkout_on_empty_cart_changes_nothing() {
    let (mut cart, log) = memory_service();

    assert!(matches!(cart.finalize_order(), Err(CartError::EmptyCart)));
    assert_eq!(log.notices().len(), 1);
    assert!(cart.store().backend().is_empty());
}

#[test]
fn test_checkout_after_invalid_postal_code_is_refused() {
    let (mut cart, _) = memory_service();
    cart.add_item(product("Pipoca Doce", 1_290)).unwrap();
    let _ = cart.calculate_shipping("0879");

    assert!(matches!(
        cart.finalize_order(),
        Err(CartError::ShippingNotCalculated)
    ));
    assert_eq!(cart.item_count().unwrap(), 1);
}

#[test]
fn test_full_order_journey() {
    let (mut cart, log) = memory_service();
    let doce = cart.add_item(product("Pipoca Doce", 1_290)).unwrap().id;
    cart.add_item(product("Refrigerante", 600)).unwrap();
    cart.change_quantity(doce, QuantityDirection::Increment).unwrap();
    cart.calculate_shipping("05010-000").unwrap();

    let receipt = cart.finalize_order().unwrap();

    // 2 x 12,90 + 6,00 + 8,00 shipping
    assert_eq!(receipt.totals.subtotal, Price::from_cents(3_180));
    assert_eq!(receipt.totals.total, Price::from_cents(3_980));
    assert!(cart.cart().unwrap().is_empty());
    assert!(cart.store().backend().is_empty());

    let confirmation = log.notices().pop().unwrap();
    assert_eq!(confirmation.level, NoticeLevel::Success);
    assert!(confirmation.message.contains("R$ 39,80"));
    assert_eq!(log.last_badge_count(), Some(0));
}
