//! Pluggable perceptual distance between colors.

use palette::color_difference::Ciede2000;

use super::Color;

/// A symmetric, non-negative distance between two colors, zero for equal
/// input. Implementations convert to their perceptual space themselves.
pub trait ColorDistance: Send + Sync {
    fn distance(&self, a: &Color, b: &Color) -> f64;
}

impl<F> ColorDistance for F
where
    F: Fn(&Color, &Color) -> f64 + Send + Sync,
{
    fn distance(&self, a: &Color, b: &Color) -> f64 {
        self(a, b)
    }
}

/// Delta-E metrics in CIE L*a*b* (D65).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeltaE {
    /// CIE 1976: Euclidean distance in Lab.
    #[default]
    Cie76,
    /// CIEDE2000.
    Ciede2000,
}

impl ColorDistance for DeltaE {
    fn distance(&self, a: &Color, b: &Color) -> f64 {
        let (a, b) = (a.lab(), b.lab());
        match self {
            DeltaE::Cie76 => {
                let (dl, da, db) = (a.l - b.l, a.a - b.a, a.b - b.b);
                (dl * dl + da * da + db * db).sqrt()
            }
            DeltaE::Ciede2000 => a.difference(b),
        }
    }
}
