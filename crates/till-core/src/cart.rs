//! # Cart
//!
//! The register cart: an ordered list of line items keyed by item id.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           Method                  Cart Change           │
//! │  ──────────────           ──────                  ───────────           │
//! │                                                                         │
//! │  Tap item card ──────────► add_item() ──────────► push or qty += n      │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ───► qty = n (0 removes)   │
//! │                                                                         │
//! │  Tap remove ─────────────► remove_item() ───────► items.remove(i)       │
//! │                                                                         │
//! │  Cancel / bill created ──► clear() ─────────────► items.clear()         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Items are unique by `item_id`; adding an existing item bumps quantity
//! - Every quantity is in `1..=MAX_ITEM_QUANTITY`
//! - At most `MAX_CART_ITEMS` distinct items
//! - Insertion order is kept, so the invoice lists items as they were rung up

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CatalogItem, LineItem};
use crate::validation::{validate_cart_size, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from client-supplied lines, merging duplicate ids.
    ///
    /// Two lines with the same `item_id` but different unit prices are
    /// rejected rather than guessed at.
    pub fn from_line_items<I>(lines: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = LineItem>,
    {
        let mut cart = Cart::new();
        for line in lines {
            cart.add_line(line)?;
        }
        Ok(cart)
    }

    /// Adds a catalog item, freezing its current name and price.
    pub fn add_item(&mut self, item: &CatalogItem, quantity: i64) -> CoreResult<()> {
        self.add_line(LineItem::from_catalog(item, quantity))
    }

    /// Adds a line or increases the quantity of an existing one.
    pub fn add_line(&mut self, line: LineItem) -> CoreResult<()> {
        validate_quantity(line.quantity)?;

        if let Some(existing) = self.items.iter_mut().find(|i| i.item_id == line.item_id) {
            if existing.unit_price != line.unit_price {
                return Err(ValidationError::ConflictingPrice {
                    item_id: line.item_id,
                }
                .into());
            }
            let new_qty = existing.quantity + line.quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            return Ok(());
        }

        if validate_cart_size(self.items.len()).is_err() {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(line);
        Ok(())
    }

    /// Sets the quantity of an item. Zero removes it.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(item_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(quantity)?;

        match self.items.iter_mut().find(|i| i.item_id == item_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ItemNotInCart(item_id.to_string())),
        }
    }

    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.item_id != item_id);

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotInCart(item_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Copies the lines out for billing.
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Subtotal before tax, or `None` on overflow.
    pub fn subtotal(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(), |acc, i| acc.checked_add(i.line_total()?))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What the register shows while ringing up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
}

impl TryFrom<&Cart> for CartView {
    type Error = CoreError;

    fn try_from(cart: &Cart) -> CoreResult<Self> {
        let subtotal = cart
            .subtotal()
            .ok_or_else(|| ValidationError::overflow("cart subtotal"))?;
        Ok(CartView {
            items: cart.snapshot(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn catalog_item(id: &str, name: &str, major: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            price: Money::from_major(major),
            image: None,
            category: "drinks".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        cart.add_item(&catalog_item("tea", "Tea", 20), 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal(), Some(Money::from_major(40)));
    }

    #[test]
    fn test_cart_add_same_item_increases_quantity() {
        let mut cart = Cart::new();
        let tea = catalog_item("tea", "Tea", 20);

        cart.add_item(&tea, 2).unwrap();
        cart.add_item(&tea, 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_cart_keeps_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(&catalog_item("cake", "Cake", 150), 1).unwrap();
        cart.add_item(&catalog_item("tea", "Tea", 20), 1).unwrap();
        cart.add_item(&catalog_item("cake", "Cake", 150), 1).unwrap();

        let names: Vec<_> = cart.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Cake", "Tea"]);
    }

    #[test]
    fn test_cart_price_is_frozen_at_add_time() {
        let mut cart = Cart::new();
        let mut tea = catalog_item("tea", "Tea", 20);
        cart.add_item(&tea, 1).unwrap();

        tea.price = Money::from_major(25);
        assert_eq!(cart.items()[0].unit_price, Money::from_major(20));
        assert!(matches!(
            cart.add_item(&tea, 1),
            Err(CoreError::InvalidInput(ValidationError::ConflictingPrice { .. }))
        ));
    }

    #[test]
    fn test_cart_quantity_limit() {
        let mut cart = Cart::new();
        let tea = catalog_item("tea", "Tea", 20);
        cart.add_item(&tea, MAX_ITEM_QUANTITY).unwrap();

        assert!(matches!(
            cart.add_item(&tea, 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(matches!(
            cart.add_item(&tea, 0),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_cart_item_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&catalog_item(&format!("i{i}"), "Item", 1), 1)
                .unwrap();
        }
        assert!(matches!(
            cart.add_item(&catalog_item("one-more", "Item", 1), 1),
            Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS })
        ));
    }

    #[test]
    fn test_cart_update_and_remove() {
        let mut cart = Cart::new();
        cart.add_item(&catalog_item("tea", "Tea", 20), 1).unwrap();

        cart.update_quantity("tea", 4).unwrap();
        assert_eq!(cart.total_quantity(), 4);

        assert!(matches!(
            cart.update_quantity("coffee", 1),
            Err(CoreError::ItemNotInCart(_))
        ));
        assert!(cart.update_quantity("tea", -2).is_err());

        cart.update_quantity("tea", 0).unwrap();
        assert!(cart.is_empty());
        assert!(cart.remove_item("tea").is_err());
    }

    #[test]
    fn test_cart_from_line_items_merges_duplicates() {
        let cart = Cart::from_line_items(vec![
            LineItem::new("tea", "Tea", Money::from_major(20), 2),
            LineItem::new("cake", "Cake", Money::from_major(150), 1),
            LineItem::new("tea", "Tea", Money::from_major(20), 1),
        ])
        .unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_cart_view() {
        let mut cart = Cart::new();
        cart.add_item(&catalog_item("tea", "Tea", 20), 3).unwrap();

        let view = CartView::try_from(&cart).unwrap();
        assert_eq!(view.item_count, 1);
        assert_eq!(view.subtotal, Money::from_major(60));

        cart.clear();
        let view = CartView::try_from(&cart).unwrap();
        assert!(view.items.is_empty());
        assert!(view.subtotal.is_zero());
    }
}
