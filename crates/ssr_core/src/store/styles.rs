use std::sync::{PoisonError, RwLock};

use serde_json::Value;

/// CSS collected while rendering on the server.
///
/// Each distinct block is kept once, in first-insertion order.
#[derive(Debug, Default)]
pub struct StyleCollector {
    styles: RwLock<Vec<String>>,
}

impl StyleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a CSS block. Returns false if it was already collected.
    pub fn insert_css(&self, css: impl Into<String>) -> bool {
        let css = css.into();
        let mut styles = self.styles.write().unwrap_or_else(PoisonError::into_inner);
        if styles.contains(&css) {
            return false;
        }
        styles.push(css);
        true
    }

    pub fn styles(&self) -> Vec<String> {
        self.styles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.styles.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All blocks joined with `separator`, or `None` when nothing was collected.
    pub fn joined(&self, separator: &str) -> Option<String> {
        let styles = self.styles.read().unwrap_or_else(PoisonError::into_inner);
        (!styles.is_empty()).then(|| styles.join(separator))
    }

    pub fn to_json(&self) -> Value {
        Value::from(self.styles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduplicates_in_insertion_order() {
        let collector = StyleCollector::new();
        assert!(collector.insert_css(".b{}"));
        assert!(collector.insert_css(".a{}"));
        assert!(!collector.insert_css(".b{}"));

        assert_eq!(collector.styles(), vec![".b{}", ".a{}"]);
        assert_eq!(collector.joined("\n").as_deref(), Some(".b{}\n.a{}"));
    }

    #[test]
    fn test_empty_collector_joins_to_none() {
        let collector = StyleCollector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.joined(""), None);
    }
}
