//! Cart line items and total arithmetic.
//!
//! The cart keeps two quantities per line: `quantity` as reported by the
//! store backend and `cart_quantity`, which the customer changes locally
//! before checking out. Every mutation recomputes the line total and the
//! grand total, so `grand_total == round2(Σ net_price × cart_quantity)`
//! holds whenever control returns to the caller.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub net_price: Price,
    /// Quantity as tracked by the server.
    pub quantity: u32,
    /// Quantity the customer currently wants.
    #[serde(default)]
    pub cart_quantity: u32,
    /// `net_price × cart_quantity`, rounded to two decimals.
    #[serde(default)]
    pub total_amount: Price,
    #[serde(default)]
    pub is_favourite: bool,
}

impl CartItem {
    /// Create a line with `cart_quantity` initialised from `quantity`.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, net_price: Price, quantity: u32) -> Self {
        let mut item = Self {
            id,
            name: name.into(),
            net_price,
            quantity,
            cart_quantity: quantity,
            total_amount: Price::ZERO,
            is_favourite: false,
        };
        item.recompute_total();
        item
    }

    /// Unrounded line amount.
    fn line_amount(&self) -> Price {
        self.net_price * self.cart_quantity
    }

    fn recompute_total(&mut self) {
        self.total_amount = self.line_amount().round2();
    }
}

/// What happened to a line after [`Cart::remove_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// One unit was taken off; the line remains.
    Decremented { cart_quantity: u32 },
    /// The last unit was taken off and the line was dropped.
    LineRemoved,
}

/// The customer's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
    grand_total: Price,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from lines fetched from the server.
    ///
    /// Each line's `cart_quantity` starts at its server `quantity`.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self {
            items,
            grand_total: Price::ZERO,
        };
        for item in &mut cart.items {
            item.cart_quantity = item.quantity;
            item.recompute_total();
        }
        cart.recompute_grand_total();
        cart
    }

    /// Lines currently in the cart.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn item(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rounded sum of all line amounts.
    #[must_use]
    pub const fn grand_total(&self) -> Price {
        self.grand_total
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.cart_quantity))
            .sum()
    }

    /// "Continue" stays disabled until the cart is worth something.
    #[must_use]
    pub fn continue_disabled(&self) -> bool {
        !self.grand_total.is_positive()
    }

    /// Add one unit of a product. Returns `false` if it is not in the cart.
    pub fn add_item(&mut self, id: ProductId) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.cart_quantity = item.cart_quantity.saturating_add(1);
        self.recompute_item_total(id);
        true
    }

    /// Take one unit of a product off, dropping the line at zero.
    ///
    /// Returns `None` if the product is not in the cart.
    pub fn remove_item(&mut self, id: ProductId) -> Option<Removal> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let item = self.items.get_mut(index)?;
        item.cart_quantity = item.cart_quantity.saturating_sub(1);
        let remaining = item.cart_quantity;

        if remaining == 0 {
            self.items.remove(index);
            self.recompute_grand_total();
            Some(Removal::LineRemoved)
        } else {
            self.recompute_item_total(id);
            Some(Removal::Decremented {
                cart_quantity: remaining,
            })
        }
    }

    /// Mark or unmark a line as a wishlist favourite.
    pub fn set_favourite(&mut self, id: ProductId, favourite: bool) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.is_favourite = favourite;
                true
            }
            None => false,
        }
    }

    /// Recompute one line's total, then the grand total.
    pub fn recompute_item_total(&mut self, id: ProductId) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.recompute_total();
        }
        self.recompute_grand_total();
    }

    /// Recompute the grand total from unrounded line amounts.
    pub fn recompute_grand_total(&mut self) {
        self.grand_total = self
            .items
            .iter()
            .map(CartItem::line_amount)
            .sum::<Price>()
            .round2();
    }
}
