/// In-process memo of ranked recommendations, keyed by selection fingerprint.
///
/// Owned by the session loop, so it needs no locking. Entries are immutable once
/// stored; a reload of the catalog drops all of them.
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use course_engine::model::ScoredCourse;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 64;

pub type Ranked = Arc<Vec<ScoredCourse>>;

pub struct RecommendationCache {
    capacity: usize,
    entries: HashMap<String, Ranked>,
    order: VecDeque<String>,
}

impl Default for RecommendationCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RecommendationCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, fingerprint: &str) -> Option<Ranked> {
        self.entries.get(fingerprint).cloned()
    }

    /// Return the memoized ranking or compute and store it.
    pub fn get_or_insert_with<F>(&mut self, fingerprint: &str, compute: F) -> Ranked
    where
        F: FnOnce() -> Vec<ScoredCourse>,
    {
        if let Some(hit) = self.get(fingerprint) {
            debug!(fingerprint, "recommendation cache hit");
            return hit;
        }
        let ranked = Arc::new(compute());
        self.insert(fingerprint.to_string(), Arc::clone(&ranked));
        ranked
    }

    fn insert(&mut self, fingerprint: String, ranked: Ranked) {
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(fingerprint.clone());
        self.entries.insert(fingerprint, ranked);
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once_per_fingerprint() {
        let mut cache = RecommendationCache::default();
        let mut calls = 0;
        cache.get_or_insert_with("a", || {
            calls += 1;
            Vec::new()
        });
        cache.get_or_insert_with("a", || {
            calls += 1;
            Vec::new()
        });
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut cache = RecommendationCache::with_capacity(2);
        for key in ["a", "b", "c"] {
            cache.get_or_insert_with(key, Vec::new);
        }
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn invalidate_clears_everything() {
        let mut cache = RecommendationCache::default();
        cache.get_or_insert_with("a", Vec::new);
        cache.invalidate_all();
        assert_eq!(cache.len(), 0);
        assert!(cache.get("a").is_none());
    }
}
