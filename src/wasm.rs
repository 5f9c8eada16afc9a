use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_time::Instant;

use crate::app::StorefrontApp;
use crate::catalog::{SortKey, ViewMode};
use crate::config::AppConfig;
use crate::feed::fetch_feed;
use crate::model::{ProductId, product_id_from_number};
use crate::storage::{LocalStorageCartStore, encode_cart};
use storefront_viewer::{Size, ViewTransform};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Ids arrive as JS numbers; anything that is not an exact non-negative
/// integer names no product.
fn id_arg(id: f64) -> Option<ProductId> {
    let parsed = product_id_from_number(id);
    if parsed.is_none() {
        log::debug!("Ignoring invalid product id {}", id);
    }
    parsed
}

fn css(transform: ViewTransform) -> String {
    transform.to_css()
}

/// Handle the page script holds. All state lives in the wrapped app; the
/// script calls intents and re-renders from the JSON accessors.
#[wasm_bindgen]
pub struct Storefront {
    app: Rc<RefCell<StorefrontApp>>,
}

#[wasm_bindgen]
impl Storefront {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Storefront {
        let config = AppConfig::load_or_default();
        if let Err(e) = console_log::init_with_level(config.preferences.log_level.to_level()) {
            web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
        }
        log::info!("Storefront starting");

        let app = StorefrontApp::new(config, Box::new(LocalStorageCartStore::default()));
        Storefront {
            app: Rc::new(RefCell::new(app)),
        }
    }

    /// Fetch the feed and load it. Rejects with the reason when unavailable;
    /// call again to retry.
    pub fn load(&self) -> js_sys::Promise {
        let app = Rc::clone(&self.app);
        let url = app.borrow().config().feed.json_file.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let fetched = fetch_feed(&url).await;
            app.borrow_mut()
                .load_feed(fetched)
                .map(|()| JsValue::UNDEFINED)
                .map_err(to_js)
        })
    }

    // Catalog

    #[wasm_bindgen(js_name = searchInput)]
    pub fn search_input(&self, text: String) {
        self.app.borrow_mut().search_input(text, Instant::now());
    }

    /// Returns true when a debounced search was applied and the grid must re-render.
    #[wasm_bindgen(js_name = pollSearch)]
    pub fn poll_search(&self) -> bool {
        self.app.borrow_mut().poll_search(Instant::now())
    }

    /// Enter in the search box: apply now, skipping the debounce.
    #[wasm_bindgen(js_name = submitSearch)]
    pub fn submit_search(&self, text: String) {
        self.app.borrow_mut().submit_search(text);
    }

    #[wasm_bindgen(js_name = setSortBy)]
    pub fn set_sort_by(&self, key: &str) -> Result<(), JsValue> {
        let key: SortKey = key.parse().map_err(to_js)?;
        self.app.borrow_mut().set_sort_by(key);
        Ok(())
    }

    #[wasm_bindgen(js_name = setPriceMin)]
    pub fn set_price_min(&self, min: u32) {
        self.app.borrow_mut().catalog_mut().set_price_min(min);
    }

    #[wasm_bindgen(js_name = setPriceMax)]
    pub fn set_price_max(&self, max: u32) {
        self.app.borrow_mut().catalog_mut().set_price_max(max);
    }

    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&self, page: usize) {
        self.app.borrow_mut().catalog_mut().go_to_page(page);
    }

    /// Products on the current page as a JSON array.
    #[wasm_bindgen(js_name = displayedProducts)]
    pub fn displayed_products(&self) -> Result<String, JsValue> {
        let app = self.app.borrow();
        let products: Vec<_> = app.catalog().displayed_products().collect();
        serde_json::to_string(&products).map_err(to_js)
    }

    #[wasm_bindgen(js_name = filteredCount)]
    pub fn filtered_count(&self) -> usize {
        self.app.borrow().catalog().filtered_count()
    }

    #[wasm_bindgen(js_name = currentPage)]
    pub fn current_page(&self) -> usize {
        self.app.borrow().catalog().current_page()
    }

    #[wasm_bindgen(js_name = totalPages)]
    pub fn total_pages(&self) -> usize {
        self.app.borrow().catalog().total_pages()
    }

    /// Page numbers to render as buttons.
    #[wasm_bindgen(js_name = pageWindow)]
    pub fn page_window(&self) -> Vec<u32> {
        self.app
            .borrow()
            .page_window()
            .pages
            .into_iter()
            .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
            .collect()
    }

    #[wasm_bindgen(js_name = maxPrice)]
    pub fn max_price(&self) -> f64 {
        self.app.borrow().catalog().max_price()
    }

    // Cart

    #[wasm_bindgen(js_name = addToCart)]
    pub fn add_to_cart(&self, id: f64) -> bool {
        id_arg(id).is_some_and(|id| self.app.borrow_mut().catalog_mut().add_to_cart(id))
    }

    #[wasm_bindgen(js_name = updateCartQuantity)]
    pub fn update_cart_quantity(&self, id: f64, delta: i32) -> bool {
        id_arg(id).is_some_and(|id| {
            self.app
                .borrow_mut()
                .catalog_mut()
                .update_cart_quantity(id, delta)
        })
    }

    #[wasm_bindgen(js_name = removeFromCart)]
    pub fn remove_from_cart(&self, id: f64) -> bool {
        id_arg(id).is_some_and(|id| self.app.borrow_mut().catalog_mut().remove_from_cart(id))
    }

    #[wasm_bindgen(js_name = cartJson)]
    pub fn cart_json(&self) -> Result<String, JsValue> {
        encode_cart(self.app.borrow().catalog().cart()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = cartTotal)]
    pub fn cart_total(&self) -> f64 {
        self.app.borrow().catalog().cart_total()
    }

    #[wasm_bindgen(js_name = cartItemCount)]
    pub fn cart_item_count(&self) -> f64 {
        self.app.borrow().catalog().cart_item_count() as f64
    }

    // Modals

    #[wasm_bindgen(js_name = openProduct)]
    pub fn open_product(&self, id: f64) -> bool {
        id_arg(id).is_some_and(|id| self.app.borrow_mut().open_product(id))
    }

    #[wasm_bindgen(js_name = selectImage)]
    pub fn select_image(&self, index: usize) -> Option<String> {
        self.app
            .borrow_mut()
            .select_image(index)
            .map(str::to_string)
    }

    #[wasm_bindgen(js_name = navigateCarousel)]
    pub fn navigate_carousel(&self, direction: i32) -> Option<String> {
        self.app
            .borrow_mut()
            .navigate_carousel(direction)
            .map(str::to_string)
    }

    pub fn swipe(&self, start_x: f32, end_x: f32) -> Option<String> {
        self.app.borrow_mut().swipe(start_x, end_x).map(str::to_string)
    }

    #[wasm_bindgen(js_name = addCurrentProductToCart)]
    pub fn add_current_product_to_cart(&self) -> bool {
        self.app.borrow_mut().add_current_product_to_cart()
    }

    #[wasm_bindgen(js_name = openCart)]
    pub fn open_cart(&self) {
        self.app.borrow_mut().open_cart();
    }

    /// Browser "back": close the top modal.
    #[wasm_bindgen(js_name = openSidebar)]
    pub fn open_sidebar(&self) {
        self.app.borrow_mut().open_sidebar();
    }

    #[wasm_bindgen(js_name = closeModal)]
    pub fn close_modal(&self) -> bool {
        self.app.borrow_mut().close_modal().is_some()
    }

    /// Toggle and persist the theme. Returns the `data-theme` value.
    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) -> String {
        let mut app = self.app.borrow_mut();
        let theme = app.toggle_theme();
        if app.take_preferences_changed() {
            app.config().persist();
        }
        theme.as_str().to_string()
    }

    /// Switch and persist the grid/list layout.
    #[wasm_bindgen(js_name = setViewMode)]
    pub fn set_view_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: ViewMode = mode.parse().map_err(to_js)?;
        let mut app = self.app.borrow_mut();
        app.set_view_mode(mode);
        if app.take_preferences_changed() {
            app.config().persist();
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = viewMode)]
    pub fn view_mode(&self) -> String {
        self.app.borrow().catalog().view_mode().as_str().to_string()
    }

    // Zoom viewer. Methods return the CSS transform to apply, if any.

    #[wasm_bindgen(js_name = openZoom)]
    pub fn open_zoom(
        &self,
        natural_width: f32,
        natural_height: f32,
        container_width: f32,
        container_height: f32,
    ) -> Option<String> {
        self.app
            .borrow_mut()
            .open_zoom(
                Size::new(natural_width, natural_height),
                Size::new(container_width, container_height),
            )
            .map(css)
    }

    #[wasm_bindgen(js_name = closeZoom)]
    pub fn close_zoom(&self) -> String {
        css(self.app.borrow_mut().close_zoom())
    }

    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&self, key: &str) -> Option<String> {
        self.app.borrow_mut().handle_viewer_key(key).map(css)
    }

    pub fn wheel(&self, delta_y: f32) -> String {
        css(self.app.borrow_mut().viewer_mut().wheel(delta_y))
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&self) -> String {
        css(self.app.borrow_mut().viewer_mut().zoom_in())
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&self) -> String {
        css(self.app.borrow_mut().viewer_mut().zoom_out())
    }

    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&self) -> String {
        css(self.app.borrow_mut().viewer_mut().reset())
    }

    #[wasm_bindgen(js_name = startDrag)]
    pub fn start_drag(&self, x: f32, y: f32) -> bool {
        self.app.borrow_mut().viewer_mut().start_drag(x, y)
    }

    #[wasm_bindgen(js_name = performDrag)]
    pub fn perform_drag(&self, x: f32, y: f32) -> Option<String> {
        self.app.borrow_mut().viewer_mut().perform_drag(x, y).map(css)
    }

    /// Returns true when a bounce-back started; drive it with `tick` from
    /// `requestAnimationFrame` until it returns `undefined`.
    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&self) -> bool {
        let mut app = self.app.borrow_mut();
        app.viewer_mut().end_drag(Instant::now());
        app.viewer().is_animating()
    }

    pub fn tick(&self) -> Option<String> {
        self.app.borrow_mut().tick(Instant::now()).map(css)
    }

    #[wasm_bindgen(js_name = pinchStart)]
    pub fn pinch_start(&self, ax: f32, ay: f32, bx: f32, by: f32) {
        self.app.borrow_mut().pinch_start((ax, ay), (bx, by));
    }

    #[wasm_bindgen(js_name = pinchMove)]
    pub fn pinch_move(&self, ax: f32, ay: f32, bx: f32, by: f32) -> Option<String> {
        self.app
            .borrow_mut()
            .pinch_move((ax, ay), (bx, by))
            .map(css)
    }

    #[wasm_bindgen(js_name = pinchEnd)]
    pub fn pinch_end(&self) {
        self.app.borrow_mut().pinch_end();
    }

    #[wasm_bindgen(js_name = zoomPercent)]
    pub fn zoom_percent(&self) -> u32 {
        self.app.borrow().viewer().transform().zoom_percent()
    }
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new()
    }
}
