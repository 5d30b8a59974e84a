//! Color assignment for message senders
//!
//! Messages from the same sender (capcode, flight, device id) are tagged
//! with the same display color so a viewer can group them at a glance.
//! The cache holds at most one entry per palette color; when it is full
//! the least recently seen sender gives up its color to the newcomer.

use std::collections::VecDeque;

/// Display palette, assigned in order to the first senders seen
pub const PALETTE: [&str; 14] = [
    "#FFFFFF", "#999999", "#FF9999", "#FFCC99", "#FFFF99", "#CCFF99", "#99FF99", "#99FFCC",
    "#99FFFF", "#99CCFF", "#9999FF", "#CC99FF", "#FF99FF", "#FF99CC",
];

/// Bounded sender → color map with least-recently-used reuse
///
/// Entries are kept oldest first; a lookup moves the entry to the back.
#[derive(Debug, Clone, Default)]
pub struct ColorCache {
    entries: VecDeque<(String, &'static str)>,
}

impl ColorCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(PALETTE.len()),
        }
    }

    /// Get the color for a sender, assigning one if needed
    pub fn color_for(&mut self, id: &str) -> &'static str {
        let color = if let Some(pos) = self.entries.iter().position(|(key, _)| key == id) {
            // Refresh: pull it out so it is pushed back as the newest entry
            self.entries.remove(pos).map(|(_, color)| color)
        } else if self.entries.len() < PALETTE.len() {
            Some(PALETTE[self.entries.len()])
        } else {
            self.entries.pop_front().map(|(_, color)| color)
        }
        .unwrap_or(PALETTE[0]);

        self.entries.push_back((id.to_string(), color));
        color
    }

    /// Whether a sender currently holds a color
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorCache, PALETTE};

    #[test]
    fn test_same_id_same_color() {
        let mut cache = ColorCache::new();
        let first = cache.color_for("1234567");
        cache.color_for("7654321");
        assert_eq!(cache.color_for("1234567"), first);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_colors_assigned_in_palette_order() {
        let mut cache = ColorCache::new();
        for (i, expected) in PALETTE.iter().enumerate() {
            assert_eq!(cache.color_for(&format!("id{}", i)), *expected);
        }
        assert_eq!(cache.len(), PALETTE.len());
    }

    #[test]
    fn test_overflow_reuses_oldest_color() {
        let mut cache = ColorCache::new();
        for i in 0..PALETTE.len() {
            cache.color_for(&format!("id{}", i));
        }

        let newest = cache.color_for("newcomer");
        assert_eq!(newest, PALETTE[0]);
        assert!(!cache.contains("id0"));
        assert_eq!(cache.len(), PALETTE.len());
    }

    #[test]
    fn test_lookup_keeps_entry_alive() {
        let mut cache = ColorCache::new();
        for i in 0..PALETTE.len() {
            cache.color_for(&format!("id{}", i));
        }

        // Touch the oldest entry, id1 becomes the coldest
        assert_eq!(cache.color_for("id0"), PALETTE[0]);

        let newest = cache.color_for("newcomer");
        assert_eq!(newest, PALETTE[1]);
        assert!(cache.contains("id0"));
        assert!(!cache.contains("id1"));
    }
}
