//! Nearest-color candidate lists used to bias move proposals.

use log::info;

use super::config::top_k;
use super::distance::DistanceCache;
use crate::color::{ColorDistance, ColorId};

/// Default share of the palette kept per color.
pub const NEIGHBOR_RATIO: f64 = 0.15;

/// Default upper bound on a candidate list.
pub const NEIGHBOR_LIMIT: usize = 100;

/// For every distinct color, its closest other colors, nearest first.
///
/// Built once from a finished palette. There is no incremental update;
/// rebuild to reflect palette changes.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    lists: Vec<Vec<ColorId>>,
}

impl NeighborIndex {
    /// Builds the index with `K = min(100, ceil(0.15 * (U - 1)))`, where
    /// `U` is the number of distinct colors.
    pub fn build<D: ColorDistance>(cache: &DistanceCache<D>) -> Self {
        Self::build_with(cache, NEIGHBOR_RATIO, NEIGHBOR_LIMIT)
    }

    /// Builds the index keeping `min(limit, ceil(ratio * (U - 1)))` entries
    /// per color.
    ///
    /// Evaluates all `U * (U - 1)` ordered pairs, which also fills the
    /// distance cache for the whole run.
    pub fn build_with<D: ColorDistance>(cache: &DistanceCache<D>, ratio: f64, limit: usize) -> Self {
        let count = cache.color_count();
        let keep = top_k(ratio, limit, count.saturating_sub(1));
        info!("building neighbor index: {count} colors, {keep} candidates each");

        let lists = (0..count)
            .map(|x| {
                let x = ColorId::from_index(x);
                let mut nearest: Vec<(f64, ColorId)> = (0..count)
                    .map(ColorId::from_index)
                    .filter(|&y| y != x)
                    .map(|y| (cache.distance(x, y), y))
                    .collect();
                nearest.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                nearest.truncate(keep);
                nearest.into_iter().map(|(_, y)| y).collect()
            })
            .collect();

        info!("neighbor index ready, {} distances cached", cache.len());
        Self { lists }
    }

    /// Candidates for `id`, ascending by distance. Never contains `id`.
    pub fn neighbors(&self, id: ColorId) -> &[ColorId] {
        &self.lists[id.index()]
    }

    /// Number of colors indexed.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
