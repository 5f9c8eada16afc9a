//! Catalog state engine.
//!
//! Single source of truth for the product list, the filter parameters and the
//! cart. Derived views (filtered list, page count, current page slice) are
//! rebuilt from the current parameters by [`CatalogEngine::recompute`] and are
//! never edited directly, so they cannot go stale.
//!
//! Pipeline: search -> price range -> stable sort -> page count/clamp -> slice.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{CatalogSettings, FeedConfig};
use crate::error::CatalogError;
use crate::feed::{RawRow, normalize_rows, parse_feed};
use crate::model::{Cart, Product, ProductId};
use crate::search::{collation_key, fold_for_search, matches_folded};
use crate::storage::CartStore;


/// Sort order for the product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Alphabetical by title; accents then case break ties
    #[default]
    #[serde(rename = "name")]
    Name,
    /// Cheapest first
    #[serde(rename = "price-asc")]
    PriceAsc,
    /// Most expensive first
    #[serde(rename = "price-desc")]
    PriceDesc,
}

impl SortKey {
    /// Wire value used by the sort selector.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            other => Err(format!("Unknown sort key '{}'", other)),
        }
    }
}

/// Product grid layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("Unknown view mode '{}'", other)),
        }
    }
}

/// Inclusive price filter. Always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

impl PriceRange {
    /// Whether `price` lies within the range (both ends inclusive).
    pub fn contains(&self, price: f64) -> bool {
        price >= f64::from(self.min) && price <= f64::from(self.max)
    }
}

/// Current search/sort/price/page parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub search_query: String,
    pub price_range: PriceRange,
    pub sort_by: SortKey,
    /// 1-based page number
    pub current_page: usize,
}

impl FilterParams {
    fn new(max_price: u32) -> Self {
        Self {
            search_query: String::new(),
            price_range: PriceRange {
                min: 0,
                max: max_price,
            },
            sort_by: SortKey::default(),
            current_page: 1,
        }
    }
}

/// Feed load status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No feed has been applied yet
    #[default]
    Loading,
    /// A feed was loaded
    Ready,
    /// The last load failed; the shopper may retry
    Failed(String),
}

/// The catalog state engine.
pub struct CatalogEngine {
    settings: CatalogSettings,
    feed: FeedConfig,
    all_products: Vec<Product>,
    params: FilterParams,
    max_price: f64,
    view_mode: ViewMode,
    load_state: LoadState,

    // Derived, rebuilt by `recompute`
    filtered: Vec<usize>,
    total_pages: usize,
    displayed: Range<usize>,

    cart: Cart,
    store: Box<dyn CartStore>,
}

impl fmt::Debug for CatalogEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEngine")
            .field("products", &self.all_products.len())
            .field("params", &self.params)
            .field("filtered", &self.filtered.len())
            .field("total_pages", &self.total_pages)
            .field("load_state", &self.load_state)
            .field("cart", &self.cart.len())
            .finish()
    }
}

impl CatalogEngine {
    /// Create an empty engine, restoring the cart from `store`.
    pub fn new(settings: CatalogSettings, feed: FeedConfig, store: Box<dyn CartStore>) -> Self {
        let cart = store.load().unwrap_or_default();
        let default_max = settings.default_max_price;

        let mut engine = Self {
            settings,
            feed,
            all_products: Vec::new(),
            params: FilterParams::new(default_max),
            max_price: f64::from(default_max),
            view_mode: ViewMode::default(),
            load_state: LoadState::default(),
            filtered: Vec::new(),
            total_pages: 1,
            displayed: 0..0,
            cart,
            store,
        };
        engine.recompute();
        engine
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Apply a retrieved feed body, or record why retrieval failed.
    ///
    /// On failure the product list is left as it was and exactly one
    /// `FeedUnavailable` is returned.
    pub fn load_feed(&mut self, fetched: Result<String, CatalogError>) -> Result<(), CatalogError> {
        match fetched.and_then(|body| parse_feed(&body)) {
            Ok(rows) => {
                self.load_catalog(rows);
                Ok(())
            }
            Err(e) => {
                let reason = match e {
                    CatalogError::FeedUnavailable { reason } => reason,
                    other => other.to_string(),
                };
                log::error!("Catalog feed unavailable: {}", reason);
                self.load_state = LoadState::Failed(reason.clone());
                Err(CatalogError::FeedUnavailable { reason })
            }
        }
    }

    /// Normalize raw feed rows and make them the catalog.
    pub fn load_catalog(&mut self, rows: Vec<RawRow>) {
        let products = normalize_rows(rows, &self.feed);
        self.set_products(products);
    }

    /// Replace the catalog with already-normalized products.
    ///
    /// Resets the price ceiling to the most expensive product (or the
    /// configured default when empty) and recomputes.
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.max_price = products
            .iter()
            .map(|p| p.price)
            .reduce(f64::max)
            .unwrap_or_else(|| f64::from(self.settings.default_max_price));
        self.all_products = products;

        let ceiling = price_ceiling(self.max_price);
        self.params.price_range.max = ceiling;
        self.params.price_range.min = self.params.price_range.min.min(ceiling);
        self.load_state = LoadState::Ready;

        log::info!(
            "Catalog loaded: {} products, max price {}",
            self.all_products.len(),
            self.max_price
        );
        self.recompute();
    }

    // =========================================================================
    // Filter parameters
    // =========================================================================

    /// Set the search text. Resets to page 1.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.params.search_query = query.into();
        self.params.current_page = 1;
        self.recompute();
    }

    /// Set the sort order. Resets to page 1.
    pub fn set_sort_by(&mut self, key: SortKey) {
        self.params.sort_by = key;
        self.params.current_page = 1;
        self.recompute();
    }

    /// Set both price bounds. Resets to page 1.
    ///
    /// If the bounds would invert, the edge that moved is clamped onto the
    /// other one (when both moved, `max` is raised to `min`).
    pub fn set_price_range(&mut self, min: u32, max: u32) {
        let current = self.params.price_range;
        let range = if min <= max {
            PriceRange { min, max }
        } else if min != current.min && max == current.max {
            PriceRange { min: max, max }
        } else {
            PriceRange { min, max: min }
        };
        self.apply_price_range(range);
    }

    /// Move the lower bound (single slider). Clamped to the upper bound.
    pub fn set_price_min(&mut self, min: u32) {
        let max = self.params.price_range.max;
        self.apply_price_range(PriceRange {
            min: min.min(max),
            max,
        });
    }

    /// Move the upper bound (single slider). Clamped to the lower bound.
    pub fn set_price_max(&mut self, max: u32) {
        let min = self.params.price_range.min;
        self.apply_price_range(PriceRange {
            min,
            max: max.max(min),
        });
    }

    fn apply_price_range(&mut self, range: PriceRange) {
        log::debug!("Price range {}..={}", range.min, range.max);
        self.params.price_range = range;
        self.params.current_page = 1;
        self.recompute();
    }

    /// Jump to page `page` and re-slice without filtering or sorting again.
    ///
    /// The page is clamped into `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: usize) {
        self.params.current_page = page.clamp(1, self.total_pages);
        self.reslice();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Rebuild every derived view from the current parameters.
    ///
    /// Idempotent: with unchanged parameters the views come out identical.
    pub fn recompute(&mut self) {
        let query = fold_for_search(self.params.search_query.trim());
        let range = self.params.price_range;
        let products = &self.all_products;

        let mut filtered: Vec<usize> = products
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                matches_folded(&p.title, &query) || matches_folded(&p.description, &query)
            })
            .filter(|(_, p)| range.contains(p.price))
            .map(|(index, _)| index)
            .collect();

        // All sorts are stable: ties keep feed order
        match self.params.sort_by {
            SortKey::Name => filtered.sort_by_cached_key(|&i| collation_key(&products[i].title)),
            SortKey::PriceAsc => {
                filtered.sort_by(|&a, &b| products[a].price.total_cmp(&products[b].price))
            }
            SortKey::PriceDesc => {
                filtered.sort_by(|&a, &b| products[b].price.total_cmp(&products[a].price))
            }
        }

        let page_size = self.settings.page_size();
        self.total_pages = filtered.len().div_ceil(page_size).max(1);
        self.params.current_page = self.params.current_page.clamp(1, self.total_pages);
        self.filtered = filtered;
        self.reslice();

        log::trace!(
            "Recomputed: {} of {} products, page {}/{}",
            self.filtered.len(),
            self.all_products.len(),
            self.params.current_page,
            self.total_pages
        );
    }

    fn reslice(&mut self) {
        let page_size = self.settings.page_size();
        let len = self.filtered.len();
        let start = ((self.params.current_page - 1) * page_size).min(len);
        let end = (start + page_size).min(len);
        self.displayed = start..end;
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of a product. Unknown ids are ignored.
    pub fn add_to_cart(&mut self, id: ProductId) -> bool {
        let Some(product) = self.all_products.iter().find(|p| p.id == id) else {
            log::debug!("Ignoring add for unknown product {}", id);
            return false;
        };
        let quantity = self.cart.add(product);
        log::debug!("Cart: product {} quantity {}", id, quantity);
        self.persist_cart();
        true
    }

    /// Step a cart entry's quantity by `delta`; the entry is removed at zero.
    pub fn update_cart_quantity(&mut self, id: ProductId, delta: i32) -> bool {
        if !self.cart.update_quantity(id, delta) {
            log::debug!("Ignoring quantity change for product {} not in cart", id);
            return false;
        }
        self.persist_cart();
        true
    }

    /// Remove a product from the cart.
    pub fn remove_from_cart(&mut self, id: ProductId) -> bool {
        let removed = self.cart.remove(id);
        self.persist_cart();
        removed
    }

    /// Sum of `price * quantity`, full precision.
    pub fn cart_total(&self) -> f64 {
        self.cart.total()
    }

    /// Sum of quantities.
    pub fn cart_item_count(&self) -> u64 {
        self.cart.item_count()
    }

    fn persist_cart(&mut self) {
        self.store.save(&self.cart);
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub fn all_products(&self) -> &[Product] {
        &self.all_products
    }

    /// Products passing the current search and price filters, sorted.
    pub fn filtered_products(&self) -> impl ExactSizeIterator<Item = &Product> + '_ {
        self.filtered.iter().map(|&i| &self.all_products[i])
    }

    /// Products on the current page.
    pub fn displayed_products(&self) -> impl ExactSizeIterator<Item = &Product> + '_ {
        self.filtered[self.displayed.clone()]
            .iter()
            .map(|&i| &self.all_products[i])
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn current_page(&self) -> usize {
        self.params.current_page
    }

    pub fn page_size(&self) -> usize {
        self.settings.page_size()
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn search_query(&self) -> &str {
        &self.params.search_query
    }

    pub fn sort_by(&self) -> SortKey {
        self.params.sort_by
    }

    pub fn price_range(&self) -> PriceRange {
        self.params.price_range
    }

    /// Most expensive product's price, or the configured default when empty.
    pub fn max_price(&self) -> f64 {
        self.max_price
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.all_products.iter().find(|p| p.id == id)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    pub fn feed_config(&self) -> &FeedConfig {
        &self.feed
    }
}

/// Smallest whole price bound that still includes `max_price`.
fn price_ceiling(max_price: f64) -> u32 {
    if max_price.is_finite() && max_price > 0.0 {
        max_price.ceil().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
