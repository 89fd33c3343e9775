//! Circular palette ordering.
//!
//! The pieces of one run, leaf first:
//!
//! - [`DistanceCache`]: memoized pairwise distance between palette colors.
//! - [`NeighborIndex`]: each color's nearest other colors, used to aim
//!   move proposals.
//! - [`ColorArrangement`]: the annealing state, a circular order with
//!   incrementally maintained energy. Implements [`SaState`](crate::sa::SaState).
//!
//! # Examples
//!
//! ```
//! use colorsort::color::{Color, DeltaE, Palette};
//! use colorsort::sa::{SaConfig, SaRunner};
//! use colorsort::sort::{ArrangementConfig, ColorArrangement, DistanceCache, NeighborIndex};
//!
//! let palette = Palette::new((0..12u8).map(|i| Color::from_rgb(i * 20, 255 - i * 20, 128)));
//! let cache = DistanceCache::new(&palette, DeltaE::Cie76);
//! let index = NeighborIndex::build(&cache);
//! let initial = ColorArrangement::new(
//!     &cache,
//!     &index,
//!     palette.entries().to_vec(),
//!     ArrangementConfig::default(),
//! )
//! .unwrap();
//!
//! let config = SaConfig::default()
//!     .with_initial_temperature(10.0)
//!     .with_final_temperature(0.1)
//!     .with_seed(42);
//! let result = SaRunner::run(initial, &config).unwrap();
//! assert_eq!(result.best.len(), 12);
//! ```

mod arrangement;
mod config;
mod distance;
mod neighbors;

pub use arrangement::ColorArrangement;
pub use config::{top_k, ArrangementConfig};
pub use distance::DistanceCache;
pub use neighbors::{NeighborIndex, NEIGHBOR_LIMIT, NEIGHBOR_RATIO};
