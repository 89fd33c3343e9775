//! Perceptual palette sorting by simulated annealing.
//!
//! Arranges a fixed set of colors on a circle so that every color sits
//! next to perceptually similar ones, producing a smooth gradient.
//!
//! - **Simulated Annealing (SA)**: a generic, state-agnostic driver with
//!   the Cauchy cooling schedule and best-state tracking.
//! - **Sort**: the circular arrangement state with O(S) incremental
//!   energy updates, a memoized distance cache, and a nearest-neighbor
//!   index that steers proposals toward the worst-scoring slots.
//! - **Color**: palette JSON interchange, identity by hex code, and
//!   Delta-E metrics in CIE Lab.
//! - **Render**: PNG strips of a sequence, optionally with its energy.
//!
//! # Architecture
//!
//! The `sa` module knows nothing about colors; `sort` plugs into it
//! through [`sa::SaState`]. The optimization core is single-threaded and
//! never fails; errors only come from the I/O edges.

pub mod color;
pub mod error;
pub mod render;
pub mod sa;
pub mod sort;

pub use error::{ColorsortError, Result};
