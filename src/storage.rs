//! Persisted cart storage.
//!
//! The cart is the only state that survives a reload. It is written as one
//! JSON array under a fixed key on every mutation (last write wins) and read
//! once at startup. Unparseable data is discarded and the cart starts empty.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::model::{Cart, CartItem};

/// Storage capability injected into the catalog engine.
pub trait CartStore {
    /// Read the persisted cart. `None` when nothing usable is stored.
    fn load(&self) -> Option<Cart>;

    /// Overwrite the persisted cart. Failures are logged, never returned.
    fn save(&mut self, cart: &Cart);
}

/// Serialize a cart to its persisted JSON form.
pub fn encode_cart(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(cart.items())
}

/// Parse persisted cart JSON, discarding it when corrupt.
pub fn decode_cart(json: &str) -> Option<Cart> {
    match serde_json::from_str::<Vec<CartItem>>(json) {
        Ok(items) => Some(Cart::from_items(items)),
        Err(e) => {
            log::warn!("Discarding corrupt persisted cart: {}", e);
            None
        }
    }
}

/// In-memory store. Clones share the same slot, like tabs sharing localStorage.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    slot: Rc<RefCell<Option<String>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with raw persisted text.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::new();
        *store.slot.borrow_mut() = Some(raw.into());
        store
    }

    /// Raw persisted text, if any.
    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Number of saves performed.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> Option<Cart> {
        self.slot.borrow().as_deref().and_then(decode_cart)
    }

    fn save(&mut self, cart: &Cart) {
        match encode_cart(cart) {
            Ok(json) => {
                *self.slot.borrow_mut() = Some(json);
                self.writes.set(self.writes.get() + 1);
            }
            Err(e) => log::warn!("Failed to encode cart: {}", e),
        }
    }
}

/// Browser localStorage store (WASM only).
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageCartStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageCartStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, crate::error::CatalogError> {
        use crate::error::CatalogError;

        let window = web_sys::window()
            .ok_or_else(|| CatalogError::Storage("No window object available".to_string()))?;
        window
            .local_storage()
            .map_err(|e| CatalogError::Storage(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| CatalogError::Storage("localStorage not available".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageCartStore {
    fn default() -> Self {
        Self::new(crate::constants::CART_STORAGE_KEY)
    }
}

#[cfg(target_arch = "wasm32")]
impl CartStore for LocalStorageCartStore {
    fn load(&self) -> Option<Cart> {
        let storage = match Self::storage() {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("Cart not loaded: {}", e);
                return None;
            }
        };

        match storage.get_item(&self.key) {
            Ok(Some(json)) => {
                let cart = decode_cart(&json);
                if let Some(cart) = &cart {
                    log::info!("Loaded cart with {} products from localStorage", cart.len());
                }
                cart
            }
            Ok(None) => {
                log::debug!("No cart found in localStorage");
                None
            }
            Err(e) => {
                log::warn!("Failed to read cart from localStorage: {:?}", e);
                None
            }
        }
    }

    fn save(&mut self, cart: &Cart) {
        let json = match encode_cart(cart) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to encode cart: {}", e);
                return;
            }
        };

        match Self::storage() {
            Ok(storage) => {
                if let Err(e) = storage.set_item(&self.key, &json) {
                    log::warn!("Failed to save cart to localStorage: {:?}", e);
                }
            }
            Err(e) => log::warn!("Cart not saved: {}", e),
        }
    }
}

/// JSON file store (native only).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileCartStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileCartStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `cart.json` next to the config file, if a config directory exists.
    pub fn in_config_dir() -> Option<Self> {
        crate::config::AppConfig::config_dir().map(|dir| Self::new(dir.join("cart.json")))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn write(&self, json: &str) -> Result<(), crate::error::CatalogError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl CartStore for FileCartStore {
    fn load(&self) -> Option<Cart> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => {
                let cart = decode_cart(&json);
                if let Some(cart) = &cart {
                    log::info!("Loaded cart with {} products from {:?}", cart.len(), self.path);
                }
                cart
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No cart file at {:?}", self.path);
                None
            }
            Err(e) => {
                log::warn!("Failed to read cart file {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn save(&mut self, cart: &Cart) {
        let result = encode_cart(cart)
            .map_err(crate::error::CatalogError::from)
            .and_then(|json| self.write(&json));
        if let Err(e) = result {
            log::warn!("Failed to save cart to {:?}: {}", self.path, e);
        }
    }
}
