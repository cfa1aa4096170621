//! Where compiled expressions are shown
//!
//! Publishing is best-effort: a sink never reports failure back to the
//! compiler.

use std::sync::Arc;

use parking_lot::Mutex;

pub trait PreviewSink {
    fn publish(&self, expr: &str);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreview;

impl PreviewSink for NoPreview {
    fn publish(&self, _expr: &str) {}
}

/// Keeps the most recent expression, shared between clones
#[derive(Debug, Clone, Default)]
pub struct SharedPreview {
    latest: Arc<Mutex<Option<String>>>,
}

impl SharedPreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last published expression, if any
    pub fn latest(&self) -> Option<String> {
        self.latest.lock().clone()
    }

    pub fn clear(&self) {
        *self.latest.lock() = None;
    }
}

impl PreviewSink for SharedPreview {
    fn publish(&self, expr: &str) {
        *self.latest.lock() = Some(expr.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_preview_is_shared() {
        let preview = SharedPreview::new();
        let handle = preview.clone();
        assert_eq!(handle.latest(), None);

        preview.publish("Col(0.0, vec3(0.0))");
        assert_eq!(handle.latest().as_deref(), Some("Col(0.0, vec3(0.0))"));

        handle.clear();
        assert_eq!(preview.latest(), None);
    }
}
