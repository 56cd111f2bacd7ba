//! # Register Cart State
//!
//! The single server-side cart the register works on.
//!
//! ## Locking
//! ```text
//! add / update / remove / clear      checkout
//! ─────────────────────────────      ─────────────────────────────────────
//! lock ─► mutate ─► unlock           lock ─► create_invoice ─► apply
//!                                           (await store)      directive
//!                                                   └─► unlock
//! ```
//! Checkout holds the lock across the billing call, so an item added while
//! a bill is being saved can't be wiped by the clear that follows.
//! `tokio::sync::Mutex` is used because the guard lives across `.await`.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use till_core::cart::CartView;
use till_core::{Cart, CoreResult};

#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with a shared view of the cart.
    pub async fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().await;
        f(&cart)
    }

    /// Runs `f` with exclusive access to the cart.
    pub async fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().await;
        f(&mut cart)
    }

    /// Exclusive access held across awaits (checkout).
    pub async fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().await
    }

    pub async fn view(&self) -> CoreResult<CartView> {
        self.with_cart(|cart| CartView::try_from(cart)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{LineItem, Money};

    #[tokio::test]
    async fn test_mutations_are_visible_to_clones() {
        let state = CartState::new();
        let handle = state.clone();

        handle
            .with_cart_mut(|c| c.add_line(LineItem::new("tea", "Tea", Money::from_major(20), 2)))
            .await
            .unwrap();

        let view = state.view().await.unwrap();
        assert_eq!(view.item_count, 1);
        assert_eq!(view.total_quantity, 2);
        assert_eq!(view.subtotal, Money::from_major(40));
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let state = CartState::new();
        let guard = state.lock().await;
        assert!(state.cart.try_lock().is_err());
        drop(guard);
        assert!(state.cart.try_lock().is_ok());
    }
}
