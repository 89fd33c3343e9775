//! Palette JSON interchange.
//!
//! A palette file is a JSON array of records:
//!
//! ```json
//! [{"rgb": {"r": 255, "g": 0, "b": 0}, "hsv": {"h": 0, "s": 100, "v": 100}, "hex": "FF0000"}]
//! ```
//!
//! Loading then dumping reproduces the same records in the same order.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::Color;
use crate::error::{ColorsortError, Result};

/// Parses and validates a palette from any reader.
pub fn read_colors<R: Read>(reader: R) -> Result<Vec<Color>> {
    let colors: Vec<Color> = serde_json::from_reader(reader)?;
    for (index, color) in colors.iter().enumerate() {
        color
            .check()
            .map_err(|message| ColorsortError::invalid_color(index, message))?;
    }
    Ok(colors)
}

/// Serializes colors in order.
pub fn write_colors<'a, W, I>(writer: W, colors: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Color>,
{
    let colors: Vec<&Color> = colors.into_iter().collect();
    serde_json::to_writer(writer, &colors)?;
    Ok(())
}

/// Reads a palette file.
pub fn load_colors(path: impl AsRef<Path>) -> Result<Vec<Color>> {
    let file = File::open(path)?;
    read_colors(BufReader::new(file))
}

/// Writes a palette file, replacing any existing one.
pub fn dump_colors<'a, I>(path: impl AsRef<Path>, colors: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Color>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write_colors(&mut writer, colors)?;
    writer.flush()?;
    Ok(())
}
