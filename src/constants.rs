//! Global constants for the storefront

/// Products shown per catalog page
pub const PRODUCTS_PER_PAGE: usize = 12;

/// Quiet interval before a search query is applied
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Upper price bound used before a catalog is loaded or when it is empty
pub const DEFAULT_MAX_PRICE: u32 = 1000;

/// Number of page buttons shown by the paginator
pub const PAGE_WINDOW: usize = 7;

/// Catalog feed location
pub const DEFAULT_FEED_FILE: &str = "./data/productos.json";

/// Base path prepended to feed image filenames
pub const DEFAULT_IMAGES_FOLDER: &str = "./imagenes_descargadas/";

/// Image shown for products without images (relative to the images folder)
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "placeholder.jpg";

/// Currency label used in amounts shown to the shopper
pub const DEFAULT_CURRENCY: &str = "Bs";

/// Fallback title for feed rows without one
pub const UNTITLED_PRODUCT: &str = "Producto sin título";

/// Fallback description for feed rows without one
pub const NO_DESCRIPTION: &str = "Sin descripción";

/// Key under which the cart is persisted
pub const CART_STORAGE_KEY: &str = "cart";
