//! Circular color sequence with incrementally maintained energy.
//!
//! # Energy
//!
//! The energy of slot `i` is its mean distance to the `S` slots before it
//! and the `S` slots after it on the circle:
//!
//! ```text
//! e(i) = sum_{d=1..S} ( dist(c[i], c[i+d]) + dist(c[i], c[i-d]) ) / S
//! ```
//!
//! The total energy is the sum over all slots. Both are cached: after the
//! first [`ColorArrangement::energy`] call, `total == sum(e)` holds between
//! operations.
//!
//! # Relocation
//!
//! [`ColorArrangement::relocate`] removes one color and reinserts it
//! elsewhere. Only slots within `S` of the old or the new position can
//! change, so only those are re-scored: O(S) distance lookups instead of
//! O(N * S).

use std::collections::BTreeSet;

use rand::Rng;

use super::config::ArrangementConfig;
use super::distance::DistanceCache;
use super::neighbors::NeighborIndex;
use crate::color::{Color, ColorDistance, ColorId};
use crate::error::{ColorsortError, Result};
use crate::sa::SaState;

/// The optimization state: a circular order of palette colors.
///
/// Borrows the run's read-only [`DistanceCache`] and [`NeighborIndex`];
/// owns its sequence and energy caches. Cloning copies only the latter.
pub struct ColorArrangement<'a, D> {
    cache: &'a DistanceCache<D>,
    neighbors: &'a NeighborIndex,
    config: ArrangementConfig,
    order: Vec<ColorId>,
    position_energy: Vec<f64>,
    total_energy: Option<f64>,
}

impl<D> Clone for ColorArrangement<'_, D> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache,
            neighbors: self.neighbors,
            config: self.config,
            order: self.order.clone(),
            position_energy: self.position_energy.clone(),
            total_energy: self.total_energy,
        }
    }
}

impl<D> std::fmt::Debug for ColorArrangement<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorArrangement")
            .field("order", &self.order)
            .field("total_energy", &self.total_energy)
            .finish()
    }
}

impl<'a, D: ColorDistance> ColorArrangement<'a, D> {
    /// Wraps `order` (ids from the palette that built `cache`). Energies
    /// stay unset until the first [`energy`](Self::energy) call.
    ///
    /// Fails if an id in `order` is not covered by `cache`.
    pub fn new(
        cache: &'a DistanceCache<D>,
        neighbors: &'a NeighborIndex,
        order: Vec<ColorId>,
        config: ArrangementConfig,
    ) -> Result<Self> {
        config.validate()?;
        let colors = cache.color_count();
        if let Some((slot, id)) = order.iter().enumerate().find(|(_, id)| id.index() >= colors) {
            return Err(ColorsortError::config(format!(
                "slot {slot} holds color id {} but the distance cache covers {colors} colors",
                id.index()
            )));
        }
        let len = order.len();
        Ok(Self {
            cache,
            neighbors,
            config,
            order,
            position_energy: vec![0.0; len],
            total_energy: None,
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The sequence as ids, starting at slot 0.
    pub fn order(&self) -> &[ColorId] {
        &self.order
    }

    /// The sequence as colors, starting at slot 0.
    pub fn colors(&self) -> impl Iterator<Item = &'a Color> + '_ {
        let cache = self.cache;
        self.order.iter().map(move |&id| cache.color(id))
    }

    pub fn config(&self) -> &ArrangementConfig {
        &self.config
    }

    /// Effective neighborhood radius: the configured one, clamped to `N - 1`.
    pub fn radius(&self) -> usize {
        self.config.radius.min(self.order.len().saturating_sub(1))
    }

    /// Total energy, computing and caching every slot on first use.
    pub fn energy(&mut self) -> f64 {
        if let Some(total) = self.total_energy {
            return total;
        }
        let mut total = 0.0;
        for i in 0..self.order.len() {
            let e = self.position_energy(i);
            self.position_energy[i] = e;
            total += e;
        }
        self.total_energy = Some(total);
        total
    }

    /// Total energy if it has been computed, without touching the caches.
    pub fn cached_energy(&self) -> Option<f64> {
        self.total_energy
    }

    /// Drops all cached energies and recomputes them from the sequence.
    pub fn recompute_energy(&mut self) -> f64 {
        self.total_energy = None;
        self.energy()
    }

    /// Cached per-slot energies, or `None` before the first `energy` call.
    pub fn position_energies(&self) -> Option<&[f64]> {
        self.total_energy.map(|_| self.position_energy.as_slice())
    }

    /// Energy of slot `i` evaluated against the current sequence.
    pub fn position_energy(&self, i: usize) -> f64 {
        let n = self.order.len();
        let radius = self.radius();
        if radius == 0 {
            return 0.0;
        }
        let here = self.order[i];
        let scale = radius as f64;
        let mut energy = 0.0;
        for d in 1..=radius {
            energy += self.cache.distance(here, self.order[(i + d) % n]) / scale;
            energy += self.cache.distance(here, self.order[(i + n - d) % n]) / scale;
        }
        energy
    }

    /// Moves the color at `from_pos` so it lands in front of the color
    /// currently at `to_pos`, keeping everything else in order.
    ///
    /// `to_pos == len()` means "at the end", which on the circle is the
    /// same as in front of slot 0. `to_pos == from_pos` and
    /// `to_pos == from_pos + 1` leave the sequence unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `from_pos >= len()` or `to_pos > len()`.
    pub fn relocate(&mut self, from_pos: usize, to_pos: usize) {
        let n = self.order.len();
        assert!(from_pos < n, "relocate source {from_pos} out of range for length {n}");
        assert!(to_pos <= n, "relocate target {to_pos} out of range for length {n}");
        if from_pos == to_pos || n < 2 {
            return;
        }
        let mut total = self.energy();

        let removal = self.window(from_pos);
        let insertion = self.window(to_pos);
        total -= removal
            .union(&insertion)
            .map(|&i| self.position_energy[i])
            .sum::<f64>();

        // take out
        let color = self.order.remove(from_pos);
        self.position_energy.remove(from_pos);
        let shrunk = n - 1;
        let after_removal = |i: usize| {
            if i < from_pos {
                i
            } else {
                (i + shrunk - 1) % shrunk
            }
        };
        let removal: BTreeSet<usize> = removal.into_iter().map(after_removal).collect();
        let insertion: BTreeSet<usize> = insertion.into_iter().map(after_removal).collect();

        // put back
        let to_pos = if to_pos >= from_pos { to_pos - 1 } else { to_pos };
        self.order.insert(to_pos, color);
        self.position_energy.insert(to_pos, 0.0);
        let after_insertion = |i: usize| if i < to_pos { i } else { (i + 1) % n };
        let removal: BTreeSet<usize> = removal.into_iter().map(after_insertion).collect();
        let mut insertion: BTreeSet<usize> = insertion.into_iter().map(after_insertion).collect();
        insertion.insert(to_pos);

        for &i in removal.union(&insertion) {
            let e = self.position_energy(i);
            self.position_energy[i] = e;
            total += e;
        }
        self.total_energy = Some(total);
    }

    /// Slots within `radius()` of `center` on the circle. `center` may be
    /// `len()`, which wraps to 0.
    fn window(&self, center: usize) -> BTreeSet<usize> {
        let n = self.order.len() as isize;
        let radius = self.radius() as isize;
        let center = center as isize;
        (-radius..=radius)
            .map(|d| (center + d).rem_euclid(n) as usize)
            .collect()
    }

    /// Returns an independent copy with 1 to `max_moves` greedy relocations
    /// applied.
    ///
    /// Each relocation takes a random slot among the worst-scoring ones and
    /// moves its color next to (before or after) one of that color's
    /// nearest neighbors.
    pub fn propose<R: Rng>(&mut self, rng: &mut R) -> Self {
        self.energy();
        let mut next = self.clone();
        let n = next.order.len();
        if n < 2 {
            return next;
        }

        let greedy = self.config.greedy_subset(n);
        let moves = rng.random_range(1..=self.config.max_moves);
        let mut ranked: Vec<usize> = (0..n).collect();

        for _ in 0..moves {
            {
                let energy = &next.position_energy;
                ranked.select_nth_unstable_by(greedy - 1, |&a, &b| {
                    energy[b].total_cmp(&energy[a]).then(a.cmp(&b))
                });
            }
            let source = ranked[rng.random_range(0..greedy)];

            let candidates = next.neighbors.neighbors(next.order[source]);
            if candidates.is_empty() {
                continue;
            }
            let target = candidates[rng.random_range(0..candidates.len())];
            let Some(at) = next.order.iter().position(|&id| id == target) else {
                continue;
            };
            let at = if rng.random_bool(0.5) { at + 1 } else { at };
            next.relocate(source, at);
        }
        next
    }
}

impl<D: ColorDistance> SaState for ColorArrangement<'_, D> {
    fn energy(&mut self) -> f64 {
        ColorArrangement::energy(self)
    }

    fn propose<R: Rng>(&mut self, rng: &mut R) -> Self {
        ColorArrangement::propose(self, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{DeltaE, Palette};
    use crate::sa::{SaConfig, SaRunner};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
    }

    fn wheel(n: usize) -> Palette {
        Palette::new((0..n).map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            let channel = |phase: f64| (127.5 + 127.5 * (t + phase).sin()).round() as u8;
            Color::from_rgb(channel(0.0), channel(2.1), channel(4.2))
        }))
    }

    fn assert_consistent(arrangement: &mut ColorArrangement<'_, DeltaE>) {
        let incremental = arrangement.energy();
        let cached: Vec<f64> = arrangement.position_energies().unwrap().to_vec();
        let mut fresh = arrangement.clone();
        let absolute = fresh.recompute_energy();
        assert!(
            close(incremental, absolute),
            "incremental {incremental} != absolute {absolute}"
        );
        for (i, (a, b)) in cached.iter().zip(fresh.position_energies().unwrap()).enumerate() {
            assert!(close(*a, *b), "slot {i}: cached {a} != fresh {b}");
        }
    }

    #[test]
    fn test_four_primaries_by_hand() {
        let colors = vec![
            Color::from_rgb(255, 0, 0),
            Color::from_rgb(0, 255, 0),
            Color::from_rgb(0, 0, 255),
            Color::from_rgb(0, 0, 0),
        ];
        let palette = Palette::new(colors.clone());
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);
        let mut arrangement = ColorArrangement::new(
            &cache,
            &index,
            palette.entries().to_vec(),
            ArrangementConfig::default(),
        )
        .unwrap();

        assert_eq!(arrangement.radius(), 3);
        assert!(arrangement.position_energies().is_none());

        // radius 3 on a 4-cycle: every other color is seen once on each side
        let expected: Vec<f64> = (0..4)
            .map(|i| {
                let sum: f64 = (0..4)
                    .filter(|&j| j != i)
                    .map(|j| DeltaE::Cie76.distance(&colors[i], &colors[j]))
                    .sum();
                2.0 * sum / 3.0
            })
            .collect();

        let total = arrangement.energy();
        let cached = arrangement.position_energies().unwrap();
        for (got, want) in cached.iter().zip(&expected) {
            assert!(close(*got, *want), "{got} != {want}");
        }
        assert!(close(total, expected.iter().sum()));
    }

    #[test]
    fn test_relocate_moves_in_front_of_target() {
        let palette = wheel(5);
        let ids = palette.entries().to_vec();
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);
        let fresh = || {
            ColorArrangement::new(&cache, &index, ids.clone(), ArrangementConfig::default()).unwrap()
        };
        let [a, b, c, d, e] = [ids[0], ids[1], ids[2], ids[3], ids[4]];

        let mut s = fresh();
        s.relocate(1, 4);
        assert_eq!(s.order(), [a, c, d, b, e]);

        let mut s = fresh();
        s.relocate(3, 0);
        assert_eq!(s.order(), [d, a, b, c, e]);

        let mut s = fresh();
        s.relocate(0, 5);
        assert_eq!(s.order(), [b, c, d, e, a]);

        for (from, to) in [(2, 2), (2, 3)] {
            let mut s = fresh();
            let before = s.energy();
            s.relocate(from, to);
            assert_eq!(s.order(), ids.as_slice());
            assert!(close(s.energy(), before));
            assert_consistent(&mut s);
        }
    }

    #[test]
    fn test_relocate_wraps_around_the_ends() {
        let palette = wheel(24);
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);
        let mut s = ColorArrangement::new(
            &cache,
            &index,
            palette.entries().to_vec(),
            ArrangementConfig::default(),
        )
        .unwrap();
        s.energy();

        for (from, to) in [(0, 24), (23, 0), (1, 22), (22, 2), (0, 12), (12, 0), (23, 24), (5, 17)] {
            s.relocate(from, to);
            assert_consistent(&mut s);
        }
    }

    #[test]
    fn test_relocate_back_restores_energy() {
        let palette = wheel(30);
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);
        let mut s = ColorArrangement::new(
            &cache,
            &index,
            palette.entries().to_vec(),
            ArrangementConfig::default(),
        )
        .unwrap();
        let original_order = s.order().to_vec();
        let original = s.energy();

        for (from, to) in [(3, 17), (29, 4), (10, 0), (0, 30)] {
            let moved = s.order()[from];
            let right = s.order()[(from + 1) % s.len()];
            s.relocate(from, to);
            assert_consistent(&mut s);

            let now = s.order().iter().position(|&id| id == moved).unwrap();
            let back = s.order().iter().position(|&id| id == right).unwrap();
            s.relocate(now, back);

            assert!(close(s.energy(), original), "{} != {original}", s.energy());
            let rotation = s.order().iter().position(|&id| id == original_order[0]).unwrap();
            let mut rotated = s.order().to_vec();
            rotated.rotate_left(rotation);
            assert_eq!(rotated, original_order);
        }
    }

    #[test]
    fn test_propose_leaves_original_untouched() {
        let palette = wheel(40);
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);
        let mut shuffled = palette.entries().to_vec();
        shuffled.reverse();
        shuffled.swap(3, 30);
        let mut s =
            ColorArrangement::new(&cache, &index, shuffled.clone(), ArrangementConfig::default())
                .unwrap();
        let before = s.energy();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let mut candidate = s.propose(&mut rng);
            assert_eq!(s.order(), shuffled.as_slice());
            assert_eq!(s.energy(), before);

            let mut sorted_candidate = candidate.order().to_vec();
            sorted_candidate.sort();
            let mut sorted_original = shuffled.clone();
            sorted_original.sort();
            assert_eq!(sorted_candidate, sorted_original);
            assert_consistent(&mut candidate);
        }
    }

    #[test]
    fn test_duplicates_keep_their_slots() {
        let palette = Palette::new(vec![
            Color::from_rgb(255, 0, 0),
            Color::from_rgb(0, 255, 0),
            Color::from_rgb(255, 0, 0),
            Color::from_rgb(0, 0, 255),
            Color::from_rgb(10, 10, 10),
        ]);
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build_with(&cache, 1.0, 100);
        let mut s = ColorArrangement::new(
            &cache,
            &index,
            palette.entries().to_vec(),
            ArrangementConfig::default(),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..20 {
            let mut next = s.propose(&mut rng);
            assert_eq!(next.len(), 5);
            assert_consistent(&mut next);
            s = next;
        }
        let reds = s.colors().filter(|c| c.hex == "FF0000").count();
        assert_eq!(reds, 2);
    }

    #[test]
    fn test_new_rejects_ids_outside_the_cache() {
        let small = Palette::new(vec![Color::from_rgb(1, 1, 1), Color::from_rgb(2, 2, 2)]);
        let large = wheel(5);
        let cache = DistanceCache::new(&small, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);

        let err = ColorArrangement::new(
            &cache,
            &index,
            large.entries().to_vec(),
            ArrangementConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ColorsortError::Config(_)), "{err}");
        assert!(
            ColorArrangement::new(&cache, &index, small.entries().to_vec(), ArrangementConfig::default())
                .is_ok()
        );
    }

    #[test]
    fn test_cached_energy_tracks_energy() {
        let palette = wheel(12);
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);
        let mut s = ColorArrangement::new(
            &cache,
            &index,
            palette.entries().to_vec(),
            ArrangementConfig::default(),
        )
        .unwrap();
        assert_eq!(s.cached_energy(), None);
        let total = s.energy();
        assert_eq!(s.cached_energy(), Some(total));
        s.relocate(2, 9);
        assert_eq!(s.cached_energy(), Some(s.energy()));
    }

    #[test]
    fn test_propose_moves_the_worst_slot_next_to_a_neighbor() {
        // a gray ramp with one saturated green at slot 2; the green's nearest
        // colors are the light grays at the far end
        let mut colors: Vec<Color> = (0..10u8)
            .map(|i| {
                let v = 100 + 10 * i;
                Color::from_rgb(v, v, v)
            })
            .collect();
        colors.insert(2, Color::from_rgb(0, 255, 0));
        let palette = Palette::new(colors);
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);
        let config = ArrangementConfig::default()
            .with_radius(2)
            .with_greedy_limit(1)
            .with_max_moves(1);
        let mut s = ColorArrangement::new(&cache, &index, palette.entries().to_vec(), config).unwrap();
        s.energy();

        let energies = s.position_energies().unwrap();
        let worst = (0..s.len())
            .max_by(|&a, &b| energies[a].total_cmp(&energies[b]))
            .unwrap();
        assert_eq!(worst, 2);
        let green = s.order()[worst];
        let candidates = index.neighbors(green);
        assert!(!candidates.is_empty());
        let n = s.len();
        for &c in candidates {
            let at = s.order().iter().position(|&id| id == c).unwrap();
            assert!(at.abs_diff(worst) > 1 && n - at.abs_diff(worst) > 1);
        }
        let without_green = |order: &[ColorId]| -> Vec<ColorId> {
            order.iter().copied().filter(|&id| id != green).collect()
        };
        let rest = without_green(s.order());

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let next = s.propose(&mut rng);

            // only the green moved
            assert_eq!(without_green(next.order()), rest, "seed {seed}");
            let p = next.order().iter().position(|&id| id == green).unwrap();
            let before = next.order()[(p + n - 1) % n];
            let after = next.order()[(p + 1) % n];
            assert!(
                candidates.contains(&before) || candidates.contains(&after),
                "seed {seed}: green landed at {p} between non-neighbors"
            );
        }
    }

    #[test]
    fn test_tiny_arrangements() {
        let palette = Palette::new(vec![Color::from_rgb(1, 1, 1)]);
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);
        let mut s =
            ColorArrangement::new(&cache, &index, palette.entries().to_vec(), ArrangementConfig::default())
                .unwrap();
        assert_eq!(s.radius(), 0);
        assert_eq!(s.energy(), 0.0);
        s.relocate(0, 1);
        let mut rng = StdRng::seed_from_u64(0);
        let mut next = s.propose(&mut rng);
        assert_eq!(next.energy(), 0.0);

        let empty: Vec<ColorId> = Vec::new();
        let mut s = ColorArrangement::new(&cache, &index, empty, ArrangementConfig::default()).unwrap();
        assert_eq!(s.energy(), 0.0);
        assert!(s.propose(&mut rng).is_empty());
    }

    #[test]
    fn test_annealing_smooths_a_shuffled_wheel() {
        let palette = wheel(36);
        let cache = DistanceCache::new(&palette, DeltaE::Cie76);
        let index = NeighborIndex::build(&cache);

        // interleave the wheel so neighbors are far apart
        let ids = palette.entries();
        let shuffled: Vec<ColorId> = (0..36).map(|i| ids[(i * 11) % 36]).collect();
        let mut initial =
            ColorArrangement::new(&cache, &index, shuffled, ArrangementConfig::default()).unwrap();
        let initial_energy = initial.energy();
        let mut smooth =
            ColorArrangement::new(&cache, &index, ids.to_vec(), ArrangementConfig::default())
                .unwrap();
        let smooth_energy = smooth.energy();
        assert!(smooth_energy < initial_energy);

        let config = SaConfig::default()
            .with_initial_temperature(50.0)
            .with_final_temperature(0.01)
            .with_seed(3);
        let mut visited_min = f64::INFINITY;
        let mut rng = StdRng::seed_from_u64(3);
        let result = SaRunner::run_with(initial, &config, &mut rng, |s| {
            let e = s.cached_energy().unwrap();
            visited_min = visited_min.min(e);
        })
        .unwrap();

        assert!(result.best_energy <= initial_energy);
        assert!(result.best_energy <= visited_min + 1e-9);
        assert!(
            result.best_energy < initial_energy * 0.8,
            "expected a clear improvement: {} vs {initial_energy}",
            result.best_energy
        );
        let mut best = result.best.clone();
        assert_consistent(&mut best);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_incremental_matches_absolute(
            rgb in prop::collection::vec((any::<u8>(), any::<u8>(), any::<u8>()), 2..30),
            radius in 1usize..9,
            moves in prop::collection::vec((any::<usize>(), any::<usize>()), 1..40),
        ) {
            let palette = Palette::new(rgb.iter().map(|&(r, g, b)| Color::from_rgb(r, g, b)));
            let cache = DistanceCache::new(&palette, DeltaE::Cie76);
            let index = NeighborIndex::build(&cache);
            let config = ArrangementConfig::default().with_radius(radius);
            let mut s = ColorArrangement::new(&cache, &index, palette.entries().to_vec(), config).unwrap();
            let n = s.len();
            s.energy();

            for (from, to) in moves {
                s.relocate(from % n, to % (n + 1));
                let incremental = s.energy();
                let absolute = s.clone().recompute_energy();
                prop_assert!(close(incremental, absolute), "{} != {}", incremental, absolute);
            }
        }
    }
}
