//! PNG strips of a color sequence.
//!
//! One pixel column per color. With an energy overlay the image is twice
//! as tall and the lower half shades each column from white (lowest
//! energy) to red (highest).

use std::path::Path;

use image::{ImageFormat, Rgb as Pixel, RgbImage};

use crate::color::{Color, ColorDistance};
use crate::error::Result;
use crate::sort::ColorArrangement;

/// Height of the color band in pixels.
pub const STRIP_HEIGHT: u32 = 80;

/// Draws `colors` left to right. `energy`, when given, must hold one value
/// per color.
pub fn colors_to_image<'a, I>(colors: I, energy: Option<&[f64]>) -> RgbImage
where
    I: IntoIterator<Item = &'a Color>,
{
    let colors: Vec<&Color> = colors.into_iter().collect();
    let height = if energy.is_some() {
        STRIP_HEIGHT * 2
    } else {
        STRIP_HEIGHT
    };
    let mut image = RgbImage::new(colors.len() as u32, height);

    for (x, color) in colors.iter().enumerate() {
        let pixel = Pixel([color.rgb.r, color.rgb.g, color.rgb.b]);
        for y in 0..STRIP_HEIGHT {
            image.put_pixel(x as u32, y, pixel);
        }
    }

    if let Some(energy) = energy {
        let max = energy.iter().copied().fold(0.0_f64, f64::max);
        for (x, &e) in energy.iter().enumerate().take(colors.len()) {
            let shade = energy_shade(e, max);
            let pixel = Pixel([255, shade, shade]);
            for y in STRIP_HEIGHT..height {
                image.put_pixel(x as u32, y, pixel);
            }
        }
    }
    image
}

/// Green and blue level for an energy value: 255 at zero, 0 at `max`.
fn energy_shade(energy: f64, max: f64) -> u8 {
    if max <= 0.0 || !energy.is_finite() {
        return 255;
    }
    (255.0 * (1.0 - energy / max)).clamp(0.0, 255.0) as u8
}

/// Draws an arrangement, with its cached energies when `with_energy` is set
/// and they have been computed.
pub fn arrangement_to_image<D: ColorDistance>(
    arrangement: &ColorArrangement<'_, D>,
    with_energy: bool,
) -> RgbImage {
    let energy = if with_energy {
        arrangement.position_energies()
    } else {
        None
    };
    colors_to_image(arrangement.colors(), energy)
}

/// Writes an image as PNG.
pub fn save_png(image: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
