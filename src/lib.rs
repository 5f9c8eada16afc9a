//! Storefront core
//!
//! Catalog filtering, sorting and pagination, a persisted shopping cart, and
//! the product image viewer state, for a static-feed web storefront.

pub mod app;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod modal_stack;
pub mod model;
pub mod pagination;
pub mod search;
pub mod storage;

pub use app::StorefrontApp;
pub use catalog::{CatalogEngine, FilterParams, LoadState, PriceRange, SortKey, ViewMode};
pub use config::{AppConfig, Theme};
pub use error::CatalogError;
pub use model::{Cart, CartItem, Product, ProductId};
pub use storage::{CartStore, MemoryCartStore};

pub use storefront_viewer as viewer;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
