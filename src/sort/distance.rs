//! Memoized pairwise color distance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use log::info;

use crate::color::{Color, ColorDistance, ColorId, Palette};

/// Memoizes a [`ColorDistance`] over the distinct colors of a palette.
///
/// Keys are unordered id pairs, so `distance(a, b)` and `distance(b, a)`
/// share one slot. Each slot is filled at most once and never evicted.
/// Filling goes through `OnceLock`, so lookups take `&self` and the cache
/// can be shared read-only between searches.
///
/// The slot table for all `U * (U + 1) / 2` pairs of the `U` distinct
/// colors is allocated up front, about 16 bytes per pair: roughly 800 MB at
/// 10 000 colors, before any distance is computed.
pub struct DistanceCache<D> {
    colors: Vec<Color>,
    metric: D,
    slots: Vec<OnceLock<f64>>,
    filled: AtomicUsize,
}

impl<D: ColorDistance> DistanceCache<D> {
    pub fn new(palette: &Palette, metric: D) -> Self {
        let colors: Vec<Color> = palette.ids().map(|id| palette.color(id).clone()).collect();
        let n = colors.len();
        let slots: Vec<OnceLock<f64>> = (0..n * (n + 1) / 2).map(|_| OnceLock::new()).collect();
        info!(
            "distance cache: {n} colors, {} pair slots ({:.1} MiB)",
            slots.len(),
            (slots.len() * std::mem::size_of::<OnceLock<f64>>()) as f64 / (1024.0 * 1024.0)
        );
        Self {
            colors,
            metric,
            slots,
            filled: AtomicUsize::new(0),
        }
    }

    /// Distance between two colors, computed on first request.
    pub fn distance(&self, a: ColorId, b: ColorId) -> f64 {
        let slot = &self.slots[pair_slot(a, b)];
        *slot.get_or_init(|| {
            self.filled.fetch_add(1, Ordering::Relaxed);
            self.metric
                .distance(&self.colors[a.index()], &self.colors[b.index()])
        })
    }

    /// Number of distinct colors the cache covers.
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    pub fn color(&self, id: ColorId) -> &Color {
        &self.colors[id.index()]
    }

    pub fn metric(&self) -> &D {
        &self.metric
    }

    /// Number of pair slots allocated, filled or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of memoized pairs.
    pub fn len(&self) -> usize {
        self.filled.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lower-triangular slot of the unordered pair `{a, b}`, diagonal included.
fn pair_slot(a: ColorId, b: ColorId) -> usize {
    let (lo, hi) = if a <= b {
        (a.index(), b.index())
    } else {
        (b.index(), a.index())
    };
    hi * (hi + 1) / 2 + lo
}
