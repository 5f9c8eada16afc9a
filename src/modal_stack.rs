//! Stack of open modal views.
//!
//! Mirrors what the browser history does for overlays: opening a modal pushes
//! it, "back" pops the top one. Kept independent of any navigation API so the
//! presentation layer decides how (or whether) to sync it with history.

use crate::model::ProductId;

/// A named overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modal {
    /// Cart drawer
    Cart,
    /// Product detail for one product
    Product(ProductId),
    /// Filter sidebar (mobile)
    Sidebar,
    /// Fullscreen image viewer, always above a product
    ZoomViewer,
}

impl Modal {
    /// Whether two modals are the same kind, ignoring the product id.
    pub fn same_kind(&self, other: &Modal) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// The open modals, bottom first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a modal on top.
    ///
    /// Re-opening the modal that is already on top is a no-op. A product
    /// replaces another product directly beneath it so back always returns
    /// to the catalog rather than walking through every product viewed.
    pub fn push(&mut self, modal: Modal) {
        if self.current() == Some(modal) {
            return;
        }
        if let (Some(top @ Modal::Product(_)), Modal::Product(_)) = (self.current(), modal) {
            log::debug!("Modal: replacing {:?} with {:?}", top, modal);
            self.stack.pop();
        } else {
            log::debug!("Modal: open {:?}", modal);
        }
        self.stack.push(modal);
    }

    /// Close the top modal ("back").
    pub fn pop(&mut self) -> Option<Modal> {
        let modal = self.stack.pop()?;
        log::debug!("Modal: close {:?}", modal);
        Some(modal)
    }

    /// The top modal, if any.
    pub fn current(&self) -> Option<Modal> {
        self.stack.last().copied()
    }

    /// Close the topmost modal of `kind` and everything above it.
    ///
    /// Returns the closed modals, top first. Nothing changes when no modal of
    /// that kind is open.
    pub fn close(&mut self, kind: Modal) -> Vec<Modal> {
        let Some(index) = self.stack.iter().rposition(|m| m.same_kind(&kind)) else {
            return Vec::new();
        };
        let mut closed: Vec<Modal> = self.stack.drain(index..).collect();
        closed.reverse();
        log::debug!("Modal: closed {:?}", closed);
        closed
    }

    /// Whether a modal of `kind` is open anywhere in the stack.
    pub fn is_open(&self, kind: Modal) -> bool {
        self.stack.iter().any(|m| m.same_kind(&kind))
    }

    /// The product whose detail modal is open, if any.
    pub fn open_product(&self) -> Option<ProductId> {
        self.stack.iter().rev().find_map(|m| match m {
            Modal::Product(id) => Some(*id),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
