//! Colors, palette identity, interchange format, and perceptual metrics.
//!
//! A [`Color`] is identified by its hex code alone. A [`Palette`] interns
//! the colors of an input file into dense [`ColorId`]s so that the
//! optimization core can work on plain indices. Records that share a hex
//! code alias to one id: the first record is kept as the canonical color
//! and later ones reuse its id.

mod codec;
mod metric;

pub use codec::{dump_colors, load_colors, read_colors, write_colors};
pub use metric::{ColorDistance, DeltaE};

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use log::warn;
use palette::white_point::D65;
use palette::{FromColor, Lab, LinSrgb, Srgb};
use serde::{Deserialize, Serialize};

/// 8-bit sRGB components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// HSV triple as stored in palette files. The optimizer never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hsv {
    pub h: u16,
    pub s: u16,
    pub v: u16,
}

/// An immutable palette color.
///
/// Equality and hashing look only at the hex code, case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Color {
    pub rgb: Rgb,
    pub hsv: Hsv,
    pub hex: String,
}

impl Color {
    pub fn new(rgb: Rgb, hsv: Hsv, hex: impl Into<String>) -> Self {
        Self {
            rgb,
            hsv,
            hex: hex.into(),
        }
    }

    /// Builds a color from RGB alone; HSV is derived and the hex is
    /// upper-case.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let rgb = Rgb { r, g, b };
        Self::new(rgb, rgb_to_hsv(rgb), format!("{r:02X}{g:02X}{b:02X}"))
    }

    /// Canonical identity key: the upper-cased hex code.
    pub fn key(&self) -> String {
        self.hex.to_ascii_uppercase()
    }

    /// CIE L*a*b* (D65) coordinates of this color.
    pub fn lab(&self) -> Lab<D65, f64> {
        let srgb: Srgb<f64> = Srgb::new(self.rgb.r, self.rgb.g, self.rgb.b).into_format();
        let linear: LinSrgb<f64> = srgb.into_linear();
        Lab::from_color(linear)
    }

    /// Checks that the hex code is six hex digits matching the RGB triple.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.hex.len() != 6 || !self.hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("hex {:?} is not six hex digits", self.hex));
        }
        let expected = format!("{:02X}{:02X}{:02X}", self.rgb.r, self.rgb.g, self.rgb.b);
        if !self.hex.eq_ignore_ascii_case(&expected) {
            return Err(format!(
                "hex {} does not match rgb ({}, {}, {})",
                self.hex, self.rgb.r, self.rgb.g, self.rgb.b
            ));
        }
        Ok(())
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.hex.eq_ignore_ascii_case(&other.hex)
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.hex.bytes() {
            state.write_u8(b.to_ascii_uppercase());
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Color hex={}>", self.hex)
    }
}

fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    Hsv {
        h: hue.round() as u16 % 360,
        s: (saturation * 100.0).round() as u16,
        v: (max * 100.0).round() as u16,
    }
}

/// Identity of a unique color within a [`Palette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorId(u32);

impl ColorId {
    pub(crate) fn from_index(index: usize) -> Self {
        ColorId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The colors of one optimization run.
///
/// `entries` keeps one id per input record in input order; `colors` holds
/// each distinct hex code once.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: Vec<Color>,
    entries: Vec<ColorId>,
}

impl Palette {
    /// Interns `colors` by hex key, preserving input order in `entries`.
    pub fn new(colors: impl IntoIterator<Item = Color>) -> Self {
        let mut by_key: HashMap<String, ColorId> = HashMap::new();
        let mut unique = Vec::new();
        let mut entries = Vec::new();

        for color in colors {
            let key = color.key();
            let id = match by_key.get(&key) {
                Some(&id) => {
                    warn!(
                        "duplicate hex {} at entry {}: aliased to entry of the first occurrence",
                        color.hex,
                        entries.len()
                    );
                    id
                }
                None => {
                    let id = ColorId::from_index(unique.len());
                    by_key.insert(key, id);
                    unique.push(color);
                    id
                }
            };
            entries.push(id);
        }

        Self {
            colors: unique,
            entries,
        }
    }

    /// Number of input records, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct colors.
    pub fn unique_len(&self) -> usize {
        self.colors.len()
    }

    /// Input order as ids.
    pub fn entries(&self) -> &[ColorId] {
        &self.entries
    }

    pub fn color(&self, id: ColorId) -> &Color {
        &self.colors[id.index()]
    }

    /// All distinct ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = ColorId> + '_ {
        (0..self.colors.len()).map(ColorId::from_index)
    }

    pub fn id_of(&self, hex: &str) -> Option<ColorId> {
        self.colors
            .iter()
            .position(|c| c.hex.eq_ignore_ascii_case(hex))
            .map(ColorId::from_index)
    }

    /// Resolves a sequence of ids back to colors.
    pub fn resolve<'a>(&'a self, ids: &'a [ColorId]) -> impl Iterator<Item = &'a Color> + 'a {
        ids.iter().map(move |&id| self.color(id))
    }
}
