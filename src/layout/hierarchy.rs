//! Mapping of heading font sizes to levels.

use std::collections::BTreeMap;

use crate::model::HeadingLevel;

use super::classify::HeadingCandidate;
use super::config::{HierarchyConfig, LevelOverflow};
use super::{size_from_key, size_key};

/// A heading with its assigned level.
#[derive(Debug, Clone, PartialEq)]
pub struct LeveledHeading {
    /// Assigned level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Position in document reading order
    pub order_index: usize,
}

/// Ranks distinct heading sizes into H1..H4.
pub struct HierarchyAssigner<'a> {
    config: &'a HierarchyConfig,
}

impl<'a> HierarchyAssigner<'a> {
    /// Create a new assigner.
    pub fn new(config: &'a HierarchyConfig) -> Self {
        Self { config }
    }

    /// Level of each ranked size, keyed by quantized size.
    ///
    /// The largest size is H1; equal sizes share a level.
    pub fn level_map(&self, candidates: &[HeadingCandidate]) -> BTreeMap<i32, HeadingLevel> {
        let mut keys: Vec<i32> = candidates.iter().map(|c| size_key(c.font_size)).collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys.dedup();

        let levels = self.config.max_levels.min(HeadingLevel::ALL.len());
        keys.into_iter()
            .take(levels)
            .enumerate()
            .filter_map(|(rank, key)| HeadingLevel::from_rank(rank).map(|level| (key, level)))
            .collect()
    }

    /// Assign levels, keeping candidate order.
    pub fn assign(&self, candidates: &[HeadingCandidate]) -> Vec<LeveledHeading> {
        let map = self.level_map(candidates);
        let deepest = map.values().max().copied();

        log::debug!(
            "hierarchy: {}",
            map.iter()
                .rev()
                .map(|(key, level)| format!("{}pt={}", size_from_key(*key), level))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut dropped = 0;
        let headings: Vec<LeveledHeading> = candidates
            .iter()
            .filter_map(|c| {
                let level = match (map.get(&size_key(c.font_size)), self.config.overflow) {
                    (Some(level), _) => *level,
                    (None, LevelOverflow::Clamp) => deepest?,
                    (None, LevelOverflow::Drop) => {
                        dropped += 1;
                        return None;
                    }
                };
                Some(LeveledHeading {
                    level,
                    text: c.text.clone(),
                    page: c.page,
                    order_index: c.order_index,
                })
            })
            .collect();

        if dropped > 0 {
            log::debug!("hierarchy: dropped {} headings below the deepest level", dropped);
        }

        headings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, size: f32, order_index: usize) -> HeadingCandidate {
        HeadingCandidate {
            text: text.to_string(),
            font_size: size,
            is_bold: true,
            page: 2,
            order_index,
        }
    }

    #[test]
    fn test_sizes_ranked_descending() {
        let config = HierarchyConfig::default();
        let assigner = HierarchyAssigner::new(&config);
        let headings = assigner.assign(&[
            candidate("b", 13.0, 0),
            candidate("a", 16.0, 1),
            candidate("c", 13.0, 2),
        ]);

        let levels: Vec<HeadingLevel> = headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![HeadingLevel::H2, HeadingLevel::H1, HeadingLevel::H2]);
        let order: Vec<usize> = headings.iter().map(|h| h.order_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_fifth_size_dropped_by_default() {
        let config = HierarchyConfig::default();
        let assigner = HierarchyAssigner::new(&config);
        let sizes = [20.0, 18.0, 16.0, 14.0, 12.0];
        let candidates: Vec<HeadingCandidate> = sizes
            .iter()
            .enumerate()
            .map(|(i, s)| candidate(&format!("h{}", i), *s, i))
            .collect();

        let headings = assigner.assign(&candidates);
        assert_eq!(headings.len(), 4);
        assert_eq!(headings[3].level, HeadingLevel::H4);
        assert!(headings.iter().all(|h| h.text != "h4"));
    }

    #[test]
    fn test_clamp_overflow() {
        let config = HierarchyConfig {
            max_levels: 2,
            overflow: LevelOverflow::Clamp,
        };
        let assigner = HierarchyAssigner::new(&config);
        let headings = assigner.assign(&[
            candidate("a", 18.0, 0),
            candidate("b", 14.0, 1),
            candidate("c", 12.0, 2),
        ]);
        assert_eq!(headings.len(), 3);
        assert_eq!(headings[2].level, HeadingLevel::H2);
    }

    #[test]
    fn test_close_sizes_share_level() {
        let config = HierarchyConfig::default();
        let assigner = HierarchyAssigner::new(&config);
        let map = assigner.level_map(&[candidate("a", 14.0, 0), candidate("b", 14.01, 1)]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_no_candidates() {
        let config = HierarchyConfig::default();
        let assigner = HierarchyAssigner::new(&config);
        assert!(assigner.assign(&[]).is_empty());
    }
}
