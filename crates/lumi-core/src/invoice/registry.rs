//! Registry of known bill layouts.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::cemig::CemigLayout;
use super::layout::Layout;

/// Layouts by name. Populated at startup, then shared read-only.
#[derive(Default, Clone)]
pub struct LayoutRegistry {
    layouts: HashMap<String, Arc<dyn Layout>>,
}

impl LayoutRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in layout.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CemigLayout::new());
        registry
    }

    /// Register a layout under its own name, replacing any previous one.
    pub fn register(&mut self, layout: impl Layout + 'static) {
        self.register_arc(Arc::new(layout));
    }

    pub fn register_arc(&mut self, layout: Arc<dyn Layout>) {
        let name = layout.name().to_string();
        if let Some(previous) = self.layouts.insert(name.clone(), layout) {
            warn!(
                "Layout {} (version {}) replaced by a new registration",
                name,
                previous.version()
            );
        } else {
            debug!("Registered layout {}", name);
        }
    }

    /// Look up a layout by exact name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Layout>> {
        self.layouts.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.layouts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

impl std::fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutRegistry")
            .field("layouts", &self.names())
            .finish()
    }
}
