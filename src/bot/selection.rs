//! Random selection, with optional avoidance of already-delivered content.

use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Uniform pick; `None` on empty input.
pub fn pick_random<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::thread_rng())
}

/// Uniform pick among items not in `seen`; `None` once every item was seen.
pub fn pick_unseen<'a>(items: &'a [String], seen: &HashSet<String>) -> Option<&'a String> {
    let unseen: Vec<&String> = items.iter().filter(|item| !seen.contains(*item)).collect();
    unseen.choose(&mut rand::thread_rng()).copied()
}

/// Shuffle in place, for trying candidates in random order.
pub fn random_order<T>(items: &mut [T]) {
    items.shuffle(&mut rand::thread_rng());
}

/// What happens to the seen-set once a category is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Remember every delivered message until restart; exhausted categories go quiet.
    #[default]
    Forever,
    /// Forget a category's messages once all were delivered and start over.
    ResetWhenExhausted,
}

/// Process-wide record of delivered messages of the day.
#[derive(Debug, Default)]
pub struct SeenRegistry {
    seen: HashSet<String>,
    policy: RetentionPolicy,
}

impl SeenRegistry {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            seen: HashSet::new(),
            policy,
        }
    }

    /// Pick an undelivered message from `items` and mark it delivered.
    pub fn take_unseen(&mut self, items: &[String]) -> Option<String> {
        if let Some(item) = pick_unseen(items, &self.seen) {
            let item = item.clone();
            self.seen.insert(item.clone());
            return Some(item);
        }

        match self.policy {
            RetentionPolicy::Forever => {
                debug!("All {} messages already delivered", items.len());
                None
            }
            RetentionPolicy::ResetWhenExhausted => {
                if items.is_empty() {
                    return None;
                }
                info!("🔁 All {} messages delivered, starting over", items.len());
                for item in items {
                    self.seen.remove(item);
                }
                let item = pick_random(items)?.clone();
                self.seen.insert(item.clone());
                Some(item)
            }
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.seen.contains(item)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pick_random_empty() {
        let empty: Vec<String> = Vec::new();
        assert!(pick_random(&empty).is_none());
    }

    #[test]
    fn test_pick_random_eventually_returns_every_item() {
        let items = strings(&["A", "B"]);
        let mut got = HashSet::new();
        for _ in 0..200 {
            got.insert(pick_random(&items).unwrap().clone());
        }
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn test_pick_unseen_skips_seen() {
        let items = strings(&["A", "B", "C"]);
        let seen: HashSet<String> = strings(&["A", "C"]).into_iter().collect();
        for _ in 0..50 {
            assert_eq!(pick_unseen(&items, &seen).unwrap(), "B");
        }
    }

    #[test]
    fn test_pick_unseen_none_when_all_seen() {
        let items = strings(&["A", "B"]);
        let seen: HashSet<String> = items.iter().cloned().collect();
        assert!(pick_unseen(&items, &seen).is_none());
    }

    #[test]
    fn test_forever_registry_grows_then_goes_quiet() {
        let items = strings(&["A", "B", "C"]);
        let mut registry = SeenRegistry::new(RetentionPolicy::Forever);
        let mut delivered = HashSet::new();
        for expected_len in 1..=3 {
            let item = registry.take_unseen(&items).unwrap();
            assert!(delivered.insert(item), "message repeated");
            assert_eq!(registry.len(), expected_len);
        }
        assert!(registry.take_unseen(&items).is_none());
        assert!(registry.take_unseen(&items).is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_reset_policy_starts_over() {
        let items = strings(&["A", "B"]);
        let mut registry = SeenRegistry::new(RetentionPolicy::ResetWhenExhausted);
        registry.take_unseen(&items).unwrap();
        registry.take_unseen(&items).unwrap();
        let third = registry.take_unseen(&items).unwrap();
        assert!(items.contains(&third));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&third));
    }

    #[test]
    fn test_reset_only_forgets_that_category() {
        let other = strings(&["X"]);
        let items = strings(&["A"]);
        let mut registry = SeenRegistry::new(RetentionPolicy::ResetWhenExhausted);
        registry.take_unseen(&other).unwrap();
        registry.take_unseen(&items).unwrap();
        registry.take_unseen(&items).unwrap();
        assert!(registry.contains("X"));
    }

    #[test]
    fn test_empty_items() {
        let mut registry = SeenRegistry::new(RetentionPolicy::ResetWhenExhausted);
        assert!(registry.take_unseen(&[]).is_none());
        assert!(registry.is_empty());
    }
}
