//! Data models for the storefront.

mod cart;
mod product;

pub use cart::{Cart, CartItem, OrderLine, format_amount};
pub use product::{Product, ProductId, product_id_from_number};
