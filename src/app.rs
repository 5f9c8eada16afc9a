//! Storefront application state.
//!
//! `StorefrontApp` is the composition root: it owns the catalog engine, the
//! search debouncer, the modal stack and the image viewer, and exposes the
//! intent methods a presentation layer calls. It never renders anything; the
//! presentation layer reads the accessors and applies returned transforms.

use std::time::Duration;

use storefront_viewer::{
    ImageCarousel, PinchTracker, Size, ViewTransform, ViewerCommand, ZoomViewer, command_for_key,
    detect_swipe,
};
use web_time::Instant;

use crate::catalog::{CatalogEngine, SortKey, ViewMode};
use crate::config::{AppConfig, Theme};
use crate::debounce::SearchDebouncer;
use crate::error::CatalogError;
use crate::modal_stack::{Modal, ModalStack};
use crate::model::{OrderLine, Product, ProductId};
use crate::pagination::{PageWindow, page_window};
use crate::storage::CartStore;

/// Top-level storefront state.
pub struct StorefrontApp {
    config: AppConfig,
    catalog: CatalogEngine,
    debouncer: SearchDebouncer,
    modals: ModalStack,
    viewer: ZoomViewer,
    pinch: PinchTracker,
    /// Carousel for the product modal currently open
    carousel: Option<ImageCarousel>,
    /// Set when a preference changes; cleared by `take_preferences_changed`
    preferences_changed: bool,
}

impl StorefrontApp {
    /// Build the app from a loaded config and a cart store.
    pub fn new(config: AppConfig, store: Box<dyn CartStore>) -> Self {
        let mut catalog = CatalogEngine::new(config.catalog.clone(), config.feed.clone(), store);
        catalog.set_view_mode(config.preferences.view_mode);

        let debouncer = SearchDebouncer::new()
            .with_delay(Duration::from_millis(config.catalog.search_debounce_ms));
        let viewer = ZoomViewer::new(config.viewer);

        log::info!(
            "{} initialized (theme {}, {} per page)",
            config.app_name,
            config.preferences.theme.as_str(),
            config.catalog.page_size()
        );

        Self {
            config,
            catalog,
            debouncer,
            modals: ModalStack::new(),
            viewer,
            pinch: PinchTracker::new(),
            carousel: None,
            preferences_changed: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogEngine {
        &self.catalog
    }

    /// Direct engine access for intents without an app-level wrapper
    /// (sort, price sliders, paging, cart steppers).
    pub fn catalog_mut(&mut self) -> &mut CatalogEngine {
        &mut self.catalog
    }

    pub fn modals(&self) -> &ModalStack {
        &self.modals
    }

    pub fn viewer(&self) -> &ZoomViewer {
        &self.viewer
    }

    /// Direct viewer access for pointer and wheel input.
    pub fn viewer_mut(&mut self) -> &mut ZoomViewer {
        &mut self.viewer
    }

    pub fn carousel(&self) -> Option<&ImageCarousel> {
        self.carousel.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.config.preferences.theme
    }

    /// Page buttons for the current result set.
    pub fn page_window(&self) -> PageWindow {
        page_window(self.catalog.current_page(), self.catalog.total_pages())
    }

    /// The product whose detail modal is open.
    pub fn current_product(&self) -> Option<&Product> {
        self.modals
            .open_product()
            .and_then(|id| self.catalog.product(id))
    }

    /// Checkout hand-off: cart lines and the full-precision total.
    pub fn order_summary(&self) -> (Vec<OrderLine>, f64) {
        let cart = self.catalog.cart();
        (cart.order_lines(), cart.total())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Apply the result of a feed retrieval.
    pub fn load_feed(&mut self, fetched: Result<String, CatalogError>) -> Result<(), CatalogError> {
        self.catalog.load_feed(fetched)
    }

    /// A keystroke changed the search box. The query applies after the quiet
    /// interval, see [`StorefrontApp::poll_search`].
    pub fn search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.debouncer.request(text, now);
    }

    /// Apply a debounced search whose quiet interval has elapsed.
    ///
    /// Returns whether the catalog was recomputed.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(query) => {
                log::debug!("Search: '{}'", query);
                self.catalog.set_search_query(query);
                true
            }
            None => false,
        }
    }

    /// Apply the search box immediately (e.g. on Enter), dropping any pending
    /// debounced request.
    pub fn submit_search(&mut self, text: impl Into<String>) {
        self.debouncer.cancel();
        self.catalog.set_search_query(text);
    }

    pub fn set_sort_by(&mut self, key: SortKey) {
        self.catalog.set_sort_by(key);
    }

    /// Switch grid/list layout and remember it.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.config.preferences.view_mode == mode {
            return;
        }
        self.catalog.set_view_mode(mode);
        self.config.preferences.view_mode = mode;
        self.preferences_changed = true;
    }

    /// Flip light/dark theme. Returns the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.config.preferences.theme.toggled();
        self.config.preferences.theme = theme;
        self.preferences_changed = true;
        log::debug!("Theme: {}", theme.as_str());
        theme
    }

    /// Whether preferences changed since the last call; the caller persists
    /// the config when this returns `true`.
    pub fn take_preferences_changed(&mut self) -> bool {
        std::mem::take(&mut self.preferences_changed)
    }

    // =========================================================================
    // Product modal and carousel
    // =========================================================================

    /// Open the detail modal for `id`. Stale ids are ignored, as is any
    /// open while the zoom viewer covers the current product.
    pub fn open_product(&mut self, id: ProductId) -> bool {
        if self.viewer.is_open() {
            log::debug!("Ignoring open for product {} while zoomed", id);
            return false;
        }
        let Some(product) = self.catalog.product(id) else {
            log::debug!("Ignoring open for unknown product {}", id);
            return false;
        };
        let placeholder = self.config.feed.placeholder_path();
        self.carousel = Some(ImageCarousel::new(product.images.clone(), &placeholder));
        self.modals.push(Modal::Product(id));
        true
    }

    /// Step the product carousel. Returns the image now shown.
    pub fn navigate_carousel(&mut self, direction: i32) -> Option<&str> {
        self.carousel.as_mut()?.navigate(direction)
    }

    /// Jump to an image by dot or thumbnail.
    pub fn select_image(&mut self, index: usize) -> Option<&str> {
        self.carousel.as_mut()?.select(index)
    }

    /// A horizontal touch swipe on the product image.
    ///
    /// Navigates the carousel unless the zoom viewer is open.
    pub fn swipe(&mut self, start_x: f32, end_x: f32) -> Option<&str> {
        if self.viewer.is_open() {
            return None;
        }
        let swipe = detect_swipe(start_x, end_x)?;
        self.navigate_carousel(swipe.direction())
    }

    /// Add the product shown in the detail modal to the cart.
    pub fn add_current_product_to_cart(&mut self) -> bool {
        match self.modals.open_product() {
            Some(id) => self.catalog.add_to_cart(id),
            None => false,
        }
    }

    // =========================================================================
    // Zoom viewer
    // =========================================================================

    /// Open the zoom viewer on the carousel's current image.
    ///
    /// Only available while a product modal is open.
    pub fn open_zoom(&mut self, image_size: Size, container_size: Size) -> Option<ViewTransform> {
        self.modals.open_product()?;
        self.carousel.as_ref()?.current()?;
        self.pinch.end();
        self.modals.push(Modal::ZoomViewer);
        Some(self.viewer.open(image_size, container_size))
    }

    /// Close the zoom viewer, returning to the product modal.
    pub fn close_zoom(&mut self) -> ViewTransform {
        self.modals.close(Modal::ZoomViewer);
        self.pinch.end();
        self.viewer.close()
    }

    /// Keyboard shortcut while the viewer is open.
    pub fn handle_viewer_key(&mut self, key: &str) -> Option<ViewTransform> {
        if !self.viewer.is_open() {
            return None;
        }
        match command_for_key(key)? {
            ViewerCommand::Close => Some(self.close_zoom()),
            command => command.apply(&mut self.viewer),
        }
    }

    /// Two fingers touched down on the zoomed image.
    pub fn pinch_start(&mut self, a: (f32, f32), b: (f32, f32)) {
        if self.viewer.is_open() {
            self.pinch.begin(a, b);
        }
    }

    /// Two-finger move. Returns a transform when a zoom step fired.
    pub fn pinch_move(&mut self, a: (f32, f32), b: (f32, f32)) -> Option<ViewTransform> {
        if !self.viewer.is_open() {
            return None;
        }
        let step = self.pinch.update(a, b)?;
        Some(self.viewer.apply_pinch(step))
    }

    pub fn pinch_end(&mut self) {
        self.pinch.end();
    }

    /// Advance the bounce animation, once per display refresh.
    pub fn tick(&mut self, now: Instant) -> Option<ViewTransform> {
        self.viewer.tick(now)
    }

    // =========================================================================
    // Modals
    // =========================================================================

    pub fn open_cart(&mut self) {
        self.modals.push(Modal::Cart);
    }

    pub fn open_sidebar(&mut self) {
        self.modals.push(Modal::Sidebar);
    }

    /// Close the top modal ("back"), tearing down the state it owned.
    pub fn close_modal(&mut self) -> Option<Modal> {
        let modal = self.modals.pop()?;
        self.on_closed(modal);
        Some(modal)
    }

    /// Close every modal.
    pub fn close_all(&mut self) {
        while self.close_modal().is_some() {}
    }

    fn on_closed(&mut self, modal: Modal) {
        match modal {
            Modal::ZoomViewer => {
                self.pinch.end();
                self.viewer.close();
            }
            Modal::Product(_) => self.carousel = None,
            Modal::Cart | Modal::Sidebar => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryCartStore;
    use storefront_viewer::ViewerPhase;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    const FEED: &str = r#"[
        {"id": 1, "Titulo": "Café Premium", "Descripcion": "Molido", "Precio": 12.5, "NombreImg": "cafe1.jpg;cafe2.jpg"},
        {"id": 2, "Titulo": "Té verde", "Descripcion": "Hojas", "Precio": 8, "NombreImg": "te.jpg"},
        {"id": 3, "Titulo": "Taza", "Descripcion": "Cerámica", "Precio": "20"}
    ]"#;

    fn app() -> (StorefrontApp, MemoryCartStore) {
        let store = MemoryCartStore::new();
        let mut app = StorefrontApp::new(AppConfig::default(), Box::new(store.clone()));
        app.load_feed(Ok(FEED.to_string())).unwrap();
        (app, store)
    }

    #[test]
    fn test_search_is_debounced() {
        let (mut app, _) = app();
        let t0 = Instant::now();
        app.search_input("ca", t0);
        app.search_input("cafe", t0 + Duration::from_millis(100));

        assert!(!app.poll_search(t0 + Duration::from_millis(300)));
        assert_eq!(app.catalog().filtered_count(), 3);

        assert!(app.poll_search(t0 + Duration::from_millis(400)));
        assert_eq!(app.catalog().search_query(), "cafe");
        assert_eq!(app.catalog().filtered_count(), 1);
    }

    #[test]
    fn test_submit_search_cancels_pending() {
        let (mut app, _) = app();
        let t0 = Instant::now();
        app.search_input("taza", t0);
        app.submit_search("te");
        assert!(!app.poll_search(t0 + Duration::from_secs(1)));
        assert_eq!(app.catalog().search_query(), "te");
    }

    #[test]
    fn test_open_product_and_carousel() {
        let (mut app, _) = app();
        assert!(app.open_product(1));
        assert_eq!(app.current_product().map(|p| p.id), Some(1));

        let carousel = app.carousel().unwrap();
        assert!(carousel.has_controls());
        assert_eq!(
            app.navigate_carousel(1),
            Some("./imagenes_descargadas/cafe2.jpg")
        );
        assert_eq!(
            app.navigate_carousel(1),
            Some("./imagenes_descargadas/cafe1.jpg")
        );
    }

    #[test]
    fn test_product_without_images_shows_placeholder() {
        let (mut app, _) = app();
        app.open_product(3);
        let carousel = app.carousel().unwrap();
        assert!(!carousel.has_controls());
        assert_eq!(
            carousel.current(),
            Some("./imagenes_descargadas/placeholder.jpg")
        );
    }

    #[test]
    fn test_stale_product_is_ignored() {
        let (mut app, _) = app();
        assert!(!app.open_product(99));
        assert!(app.modals().is_empty());
        assert!(app.carousel().is_none());
    }

    #[test]
    fn test_swipe_navigates_carousel() {
        let (mut app, _) = app();
        app.open_product(1);
        assert_eq!(app.swipe(200.0, 100.0), Some("./imagenes_descargadas/cafe2.jpg"));
        assert_eq!(app.swipe(100.0, 130.0), None);
    }

    #[test]
    fn test_add_current_product_to_cart() {
        let (mut app, store) = app();
        assert!(!app.add_current_product_to_cart());

        app.open_product(2);
        assert!(app.add_current_product_to_cart());
        assert!(app.add_current_product_to_cart());
        assert_eq!(app.catalog().cart_item_count(), 2);
        assert!(store.raw().is_some());

        let (lines, total) = app.order_summary();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert!((total - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_requires_product() {
        let (mut app, _) = app();
        let transform = app.open_zoom(Size::square(1000.0), Size::square(500.0));
        assert!(transform.is_none());
        assert!(!app.viewer().is_open());
    }

    #[test]
    fn test_zoom_keys_and_close() {
        let (mut app, _) = app();
        app.open_product(1);
        app.open_zoom(Size::square(1000.0), Size::square(500.0)).unwrap();
        assert_eq!(app.modals().current(), Some(Modal::ZoomViewer));

        let t = app.handle_viewer_key("+").unwrap();
        assert!(approx_eq(t.scale, 1.5));
        let t = app.handle_viewer_key("=").unwrap();
        assert!(approx_eq(t.scale, 2.0));
        let t = app.handle_viewer_key("0").unwrap();
        assert!(approx_eq(t.scale, 1.0));
        assert!(app.handle_viewer_key("x").is_none());

        app.handle_viewer_key("Escape").unwrap();
        assert!(!app.viewer().is_open());
        assert_eq!(app.modals().current(), Some(Modal::Product(1)));
        assert!(app.handle_viewer_key("+").is_none());
    }

    #[test]
    fn test_open_product_refused_while_zoomed() {
        let (mut app, _) = app();
        app.open_product(1);
        app.open_zoom(Size::square(1000.0), Size::square(500.0)).unwrap();

        assert!(!app.open_product(2));
        assert_eq!(app.modals().current(), Some(Modal::ZoomViewer));
        assert_eq!(app.carousel().map(|c| c.len()), Some(2));

        app.close_modal();
        assert_eq!(app.modals().current(), Some(Modal::Product(1)));
        assert!(app.carousel().is_some());
        assert!(app.open_product(2));
    }

    #[test]
    fn test_back_closes_zoom_then_product() {
        let (mut app, _) = app();
        app.open_product(1);
        app.open_zoom(Size::square(1000.0), Size::square(500.0));
        app.viewer_mut().set_zoom(1.0);

        assert_eq!(app.close_modal(), Some(Modal::ZoomViewer));
        assert_eq!(app.viewer().phase(), ViewerPhase::Closed);
        assert!(approx_eq(app.viewer().scale(), 1.0));

        assert_eq!(app.close_modal(), Some(Modal::Product(1)));
        assert!(app.carousel().is_none());
        assert_eq!(app.close_modal(), None);
    }

    #[test]
    fn test_pinch_zooms_in_steps() {
        let (mut app, _) = app();
        app.open_product(1);
        app.open_zoom(Size::square(1000.0), Size::square(500.0));

        app.pinch_start((0.0, 0.0), (100.0, 0.0));
        assert!(app.pinch_move((0.0, 0.0), (103.0, 0.0)).is_none());
        let t = app.pinch_move((0.0, 0.0), (106.0, 0.0)).unwrap();
        assert!(approx_eq(t.scale, 1.05));
        app.pinch_end();
        assert!(app.pinch_move((0.0, 0.0), (200.0, 0.0)).is_none());
    }

    #[test]
    fn test_bounce_through_app() {
        let (mut app, _) = app();
        app.open_product(1);
        app.open_zoom(Size::square(1000.0), Size::square(500.0));
        app.viewer_mut().set_zoom(1.0);

        let t0 = Instant::now();
        assert!(app.viewer_mut().start_drag(0.0, 0.0));
        app.viewer_mut().perform_drag(1000.0, 0.0);
        assert!(approx_eq(app.viewer().pan().0, 825.0));
        app.viewer_mut().end_drag(t0);
        assert!(app.viewer().is_animating());

        let t = app.tick(t0 + Duration::from_millis(400)).unwrap();
        assert!(approx_eq(t.translate_x * t.scale, 750.0));
        assert_eq!(app.viewer().phase(), ViewerPhase::Idle);
    }

    #[test]
    fn test_preferences() {
        let (mut app, _) = app();
        assert_eq!(app.theme(), Theme::Light);
        assert_eq!(app.toggle_theme(), Theme::Dark);
        assert!(app.take_preferences_changed());
        assert!(!app.take_preferences_changed());

        app.set_view_mode("list".parse().unwrap());
        assert_eq!(app.catalog().view_mode(), ViewMode::List);
        assert_eq!(app.config().preferences.view_mode, ViewMode::List);
        assert!(app.take_preferences_changed());

        // Same mode again is not a change
        app.set_view_mode(ViewMode::List);
        assert!(!app.take_preferences_changed());
    }

    #[test]
    fn test_page_window_follows_catalog() {
        let (app, _) = app();
        assert!(app.page_window().is_empty());
    }

    #[test]
    fn test_close_all() {
        let (mut app, _) = app();
        app.open_sidebar();
        app.open_product(1);
        app.open_zoom(Size::square(800.0), Size::square(400.0));
        app.open_cart();
        app.close_all();
        assert!(app.modals().is_empty());
        assert!(!app.viewer().is_open());
    }
}
