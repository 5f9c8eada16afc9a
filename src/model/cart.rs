//! Shopping cart data model.
//!
//! The cart holds at most one entry per product id. Quantities only move by
//! stepper deltas; an entry whose quantity would reach zero is removed.

use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};

/// A product in the cart with its quantity.
///
/// Serialized as the product fields plus `quantity`, which is also the
/// persisted format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn id(&self) -> ProductId {
        self.product.id
    }

    /// `price * quantity`, full precision.
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// One line of the checkout order summary.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from persisted items.
    ///
    /// Entries with zero quantity are dropped and duplicate ids are merged
    /// (first occurrence wins for product fields, quantities are summed).
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 {
                log::debug!("Dropping persisted cart entry {} with zero quantity", item.id());
                continue;
            }
            match cart.items.iter_mut().find(|existing| existing.id() == item.id()) {
                Some(existing) => {
                    log::debug!("Merging duplicate persisted cart entry {}", item.id());
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Add one unit of `product`. Returns the new quantity.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(item) = self.items.iter_mut().find(|item| item.id() == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }
        self.items.push(CartItem {
            product: product.clone(),
            quantity: 1,
        });
        1
    }

    /// Move the quantity of `id` by `delta`, removing the entry at zero or below.
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn update_quantity(&mut self, id: ProductId, delta: i32) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id() == id) else {
            return false;
        };

        let next = i64::from(self.items[index].quantity) + i64::from(delta);
        if next <= 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
        true
    }

    /// Remove the entry for `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    /// Sum of `price * quantity`. Round only for display, see [`format_amount`].
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Sum of quantities across all entries.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Line items for the checkout hand-off, in cart order.
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                title: item.product.title.clone(),
                quantity: item.quantity,
                unit_price: item.product.price,
                subtotal: item.subtotal(),
            })
            .collect()
    }
}

/// Format a monetary amount with two decimals for display.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}
