//! Product image carousel shown in the product detail modal.

/// Ordered image URLs with a wrap-around cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageCarousel {
    images: Vec<String>,
    index: usize,
}

impl ImageCarousel {
    /// Create a carousel positioned on the first image.
    ///
    /// `fallback` is shown when `images` is empty.
    pub fn new(images: Vec<String>, fallback: &str) -> Self {
        let images = if images.is_empty() {
            vec![fallback.to_string()]
        } else {
            images
        };
        Self { images, index: 0 }
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image currently shown.
    pub fn current(&self) -> Option<&str> {
        self.images.get(self.index).map(String::as_str)
    }

    /// Whether prev/next buttons, dots and thumbnails should be shown.
    pub fn has_controls(&self) -> bool {
        self.images.len() > 1
    }

    /// Step by `direction` images, wrapping at both ends.
    pub fn navigate(&mut self, direction: i32) -> Option<&str> {
        if self.images.is_empty() {
            return None;
        }
        let len = self.images.len() as i64;
        let next = (self.index as i64 + direction as i64).rem_euclid(len);
        self.index = next as usize;
        self.current()
    }

    /// Jump to a specific image (dot or thumbnail click). Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> Option<&str> {
        if index < self.images.len() {
            self.index = index;
        }
        self.current()
    }
}
