//! Product feed parsing and normalization.
//!
//! The feed is a JSON array of loosely typed rows:
//!
//! ```json
//! [
//!   { "id": 1, "Titulo": "Mesa", "Descripcion": "Roble", "Precio": "120.50",
//!     "NombreImg": "mesa_1.jpg; mesa_2.jpg" }
//! ]
//! ```
//!
//! A bad row never fails the load: each field falls back to its default.
//! Only an unreachable or non-array feed is an error.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::config::FeedConfig;
use crate::constants::{NO_DESCRIPTION, UNTITLED_PRODUCT};
use crate::error::CatalogError;
use crate::model::{Product, ProductId};

/// One feed row as published, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(rename = "Titulo", default)]
    pub title: Option<Value>,
    #[serde(rename = "Descripcion", default)]
    pub description: Option<Value>,
    #[serde(rename = "Precio", default)]
    pub price: Option<Value>,
    /// `;`-separated image filenames
    #[serde(rename = "NombreImg", default)]
    pub images: Option<Value>,
}

impl RawRow {
    /// Interpret any JSON value as a row; non-objects become an empty row.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(row) => row,
            Err(e) => {
                log::debug!("Malformed feed row, using defaults: {}", e);
                Self::default()
            }
        }
    }
}

/// Parse the feed body into raw rows.
pub fn parse_feed(json: &str) -> Result<Vec<RawRow>, CatalogError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| CatalogError::feed_unavailable(format!("Invalid feed JSON: {}", e)))?;

    match value {
        Value::Array(rows) => Ok(rows.into_iter().map(RawRow::from_value).collect()),
        other => Err(CatalogError::feed_unavailable(format!(
            "Feed must be a JSON array, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalize raw rows into products.
///
/// Rows whose id repeats an earlier row are dropped so ids stay unique.
pub fn normalize_rows(rows: Vec<RawRow>, feed: &FeedConfig) -> Vec<Product> {
    let mut seen: HashSet<ProductId> = HashSet::with_capacity(rows.len());
    let mut products = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let product = normalize_row(row, index, feed);
        if !seen.insert(product.id) {
            log::warn!(
                "Feed row {} repeats product id {}, skipping",
                index + 1,
                product.id
            );
            continue;
        }
        products.push(product);
    }

    products
}

/// Normalize a single row. `index` is the 0-based row position.
pub fn normalize_row(row: RawRow, index: usize, feed: &FeedConfig) -> Product {
    let id = row
        .id
        .as_ref()
        .and_then(parse_id)
        .unwrap_or(index as ProductId + 1);
    let title = row
        .title
        .as_ref()
        .and_then(text_field)
        .unwrap_or_else(|| UNTITLED_PRODUCT.to_string());
    let description = row
        .description
        .as_ref()
        .and_then(text_field)
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let price = row.price.as_ref().map(parse_price).unwrap_or(0.0);
    let images = row
        .images
        .as_ref()
        .map(|value| image_list(value, feed))
        .unwrap_or_default();

    Product::new(id, title, description, price, images, &feed.placeholder_path())
}

fn parse_id(value: &Value) -> Option<ProductId> {
    match value {
        Value::Number(n) => n.as_u64().filter(|id| *id > 0),
        Value::String(s) => s.trim().parse::<ProductId>().ok().filter(|id| *id > 0),
        _ => None,
    }
}

fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a price: numbers as-is, strings by their leading number
/// ("12.50 Bs" is 12.5). Anything unparseable, negative or non-finite is 0.
pub fn parse_price(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    };
    match parsed {
        Some(price) if price.is_finite() && price >= 0.0 => price,
        _ => 0.0,
    }
}

/// Parse the longest numeric prefix of `s` (after leading whitespace).
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Optional exponent, only consumed when complete
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

fn image_list(value: &Value, feed: &FeedConfig) -> Vec<String> {
    let names: Vec<&str> = match value {
        Value::String(s) => s.split(';').collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| feed.image_path(name))
        .collect()
}

/// Fetch the feed body over HTTP (WASM only).
///
/// Network failures and non-OK statuses become `FeedUnavailable`.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_feed(url: &str) -> Result<String, CatalogError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let window = web_sys::window()
        .ok_or_else(|| CatalogError::feed_unavailable("No window object available"))?;

    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| CatalogError::feed_unavailable(format!("Request to {} failed: {:?}", url, e)))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| CatalogError::feed_unavailable("Fetch did not return a Response"))?;

    if !response.ok() {
        return Err(CatalogError::feed_unavailable(format!(
            "Error loading {}: {} {}",
            url,
            response.status(),
            response.status_text()
        )));
    }

    let body = response
        .text()
        .map_err(|e| CatalogError::feed_unavailable(format!("Unreadable body: {:?}", e)))?;
    let text = JsFuture::from(body)
        .await
        .map_err(|e| CatalogError::feed_unavailable(format!("Unreadable body: {:?}", e)))?;

    text.as_string()
        .ok_or_else(|| CatalogError::feed_unavailable("Feed body is not text"))
}

/// Read the feed body from disk (native only).
#[cfg(not(target_arch = "wasm32"))]
pub fn read_feed_file(path: &std::path::Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|e| {
        CatalogError::feed_unavailable(format!("Could not read {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed() -> FeedConfig {
        FeedConfig {
            json_file: "data.json".to_string(),
            images_folder: "img/".to_string(),
            placeholder_image: "placeholder.jpg".to_string(),
        }
    }

    fn row(value: Value) -> RawRow {
        RawRow::from_value(value)
    }

    #[test]
    fn test_full_row() {
        let p = normalize_row(
            row(json!({
                "id": 5,
                "Titulo": "Mesa",
                "Descripcion": "Roble macizo",
                "Precio": "120.50",
                "NombreImg": "mesa_1.jpg; mesa_2.jpg"
            })),
            0,
            &feed(),
        );

        assert_eq!(p.id, 5);
        assert_eq!(p.title, "Mesa");
        assert_eq!(p.description, "Roble macizo");
        assert_eq!(p.price, 120.5);
        assert_eq!(p.images, vec!["img/mesa_1.jpg", "img/mesa_2.jpg"]);
        assert_eq!(p.main_image, "img/mesa_1.jpg");
    }

    #[test]
    fn test_empty_row_uses_defaults() {
        let p = normalize_row(row(json!({})), 3, &feed());

        assert_eq!(p.id, 4);
        assert_eq!(p.title, UNTITLED_PRODUCT);
        assert_eq!(p.description, NO_DESCRIPTION);
        assert_eq!(p.price, 0.0);
        assert!(p.images.is_empty());
        assert_eq!(p.main_image, "img/placeholder.jpg");
    }

    #[test]
    fn test_non_object_row_uses_defaults() {
        let p = normalize_row(row(json!("not a row")), 0, &feed());
        assert_eq!(p.id, 1);
        assert_eq!(p.title, UNTITLED_PRODUCT);
    }

    #[test]
    fn test_wrongly_typed_fields_use_defaults() {
        let p = normalize_row(
            row(json!({"id": "abc", "Titulo": "", "Precio": {"x": 1}, "NombreImg": 7})),
            1,
            &feed(),
        );
        assert_eq!(p.id, 2);
        assert_eq!(p.title, UNTITLED_PRODUCT);
        assert_eq!(p.price, 0.0);
        assert!(p.images.is_empty());
    }

    #[test]
    fn test_price_parsing() {
        assert_eq!(parse_price(&json!(99)), 99.0);
        assert_eq!(parse_price(&json!("12.5 Bs")), 12.5);
        assert_eq!(parse_price(&json!("  7")), 7.0);
        assert_eq!(parse_price(&json!(".5")), 0.5);
        assert_eq!(parse_price(&json!("1e2")), 100.0);
        assert_eq!(parse_price(&json!("3e")), 3.0);
        assert_eq!(parse_price(&json!("Bs 12")), 0.0);
        assert_eq!(parse_price(&json!("-4")), 0.0);
        assert_eq!(parse_price(&json!(null)), 0.0);
    }

    #[test]
    fn test_empty_image_names_are_dropped() {
        let p = normalize_row(row(json!({"NombreImg": "a.jpg;; ;b.jpg;"})), 0, &feed());
        assert_eq!(p.images, vec!["img/a.jpg", "img/b.jpg"]);
    }

    #[test]
    fn test_duplicate_ids_are_skipped() {
        let rows = parse_feed(r#"[{"id": 1, "Titulo": "A"}, {"id": 1, "Titulo": "B"}, {"Titulo": "C"}]"#)
            .unwrap();
        let products = normalize_rows(rows, &feed());

        let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(products[1].id, 3);
    }

    #[test]
    fn test_invalid_json_is_feed_unavailable() {
        let err = parse_feed("{not json").unwrap_err();
        assert!(err.is_feed_unavailable());
    }

    #[test]
    fn test_non_array_is_feed_unavailable() {
        let err = parse_feed(r#"{"products": []}"#).unwrap_err();
        assert!(err.is_feed_unavailable());
        assert!(err.to_string().contains("an object"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_file_is_feed_unavailable() {
        let err = read_feed_file(std::path::Path::new("/nonexistent/productos.json")).unwrap_err();
        assert!(err.is_feed_unavailable());
    }
}
