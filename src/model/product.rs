//! Product data model.

use serde::{Deserialize, Serialize};

/// Stable product identifier from the catalog feed.
pub type ProductId = u64;

/// Largest integer a JavaScript number holds exactly (2^53 - 1).
const MAX_EXACT_NUMBER: f64 = 9_007_199_254_740_991.0;

/// Convert an id passed as a JavaScript number.
///
/// `None` for negative, fractional or non-finite values and for values past
/// 2^53 - 1, which a number cannot carry exactly.
pub fn product_id_from_number(value: f64) -> Option<ProductId> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= MAX_EXACT_NUMBER {
        Some(value as ProductId)
    } else {
        None
    }
}

/// A catalog product. Immutable once loaded from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Long description
    pub description: String,
    /// Unit price, never negative
    pub price: f64,
    /// Image URLs in display order
    #[serde(default)]
    pub images: Vec<String>,
    /// First image, or the placeholder when there are none
    pub main_image: String,
}

impl Product {
    /// Create a product; `main_image` is derived from `images`.
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        images: Vec<String>,
        placeholder: &str,
    ) -> Self {
        let main_image = images
            .first()
            .cloned()
            .unwrap_or_else(|| placeholder.to_string());
        Self {
            id,
            title: title.into(),
            description: description.into(),
            price,
            images,
            main_image,
        }
    }
}
