//! Core trait for Simulated Annealing.

use rand::Rng;

/// A state that the annealing driver can walk.
///
/// The state owns its own energy bookkeeping: `energy` may compute lazily
/// and cache, which is why it takes `&mut self`. The driver never inspects
/// the state beyond these two operations.
///
/// # Minimization
///
/// SA minimizes energy. For maximization, negate it.
///
/// # Examples
///
/// ```
/// use colorsort::sa::SaState;
/// use rand::Rng;
///
/// #[derive(Clone)]
/// struct Point(f64);
///
/// impl SaState for Point {
///     fn energy(&mut self) -> f64 {
///         self.0 * self.0
///     }
///
///     fn propose<R: Rng>(&mut self, rng: &mut R) -> Self {
///         Point(self.0 + rng.random_range(-1.0..1.0))
///     }
/// }
/// ```
///
/// # References
///
/// Kirkpatrick et al. (1983), Cerny (1985)
pub trait SaState: Clone {
    /// Energy of this state. Lower is better.
    fn energy(&mut self) -> f64;

    /// Returns a new, independent state near this one.
    ///
    /// The returned state must share no mutable data with `self`; the
    /// driver may keep either one and drop the other.
    fn propose<R: Rng>(&mut self, rng: &mut R) -> Self;
}
