//! PNG slice loading and export with transparency as "no tile"
//!
//! A volume is stored as one image per z layer. Pixel `(x, y)` of slice `z` is cell
//! `[x, y, z]`; fully transparent pixels are absent cells.

use crate::analysis::patterns::Sample;
use crate::io::configuration::{MAX_PALETTE_SIZE, SLICE_PREFIX};
use crate::io::error::{AlgorithmError, Result, WithContext, invalid_parameter, invalid_source};
use crate::spatial::symbols::{Symbol, SymbolTable};
use image::{ImageBuffer, Rgba, RgbaImage};
use ndarray::Array3;
use std::path::{Path, PathBuf};

/// A decoded sample together with the colors its symbols stand for
#[derive(Clone, Debug)]
pub struct LoadedSample {
    /// Volume indexed `[x, y, z]`
    pub sample: Sample,
    /// RGBA color of every interned symbol
    pub palette: SymbolTable<[u8; 4]>,
}

/// Build a sample from in-memory slices, bottom layer first
///
/// # Errors
///
/// Returns an error if no slice is given, the slices differ in size, or they hold more than
/// `MAX_PALETTE_SIZE` distinct colors
pub fn sample_from_images(slices: &[RgbaImage]) -> Result<LoadedSample> {
    let Some(first) = slices.first() else {
        return Err(invalid_source(&"at least one slice is required"));
    };
    let (width, height) = first.dimensions();
    if let Some((z, odd)) = slices
        .iter()
        .enumerate()
        .find(|(_, s)| s.dimensions() != (width, height))
    {
        return Err(invalid_source(&format!(
            "slice {z} is {}x{} but slice 0 is {width}x{height}",
            odd.width(),
            odd.height()
        )));
    }

    let mut palette = SymbolTable::new();
    let mut sample = Array3::from_elem((width as usize, height as usize, slices.len()), None);

    for (z, slice) in slices.iter().enumerate() {
        for (x, y, pixel) in slice.enumerate_pixels() {
            // Fully transparent pixels carry no tile
            if pixel.0[3] == 0 {
                continue;
            }
            let symbol = palette.intern(pixel.0);
            if palette.len() > MAX_PALETTE_SIZE {
                return Err(invalid_source(&format!(
                    "more than {MAX_PALETTE_SIZE} distinct colors"
                )));
            }
            if let Some(cell) = sample.get_mut([x as usize, y as usize, z]) {
                *cell = Some(symbol);
            }
        }
    }

    Ok(LoadedSample { sample, palette })
}

/// Load a sample from PNG slices, one file per z layer in the given order
///
/// # Errors
///
/// Returns an error if:
/// - No path is given
/// - A file cannot be opened or decoded
/// - The slices differ in size
/// - The slices hold more than `MAX_PALETTE_SIZE` distinct colors
pub fn load_sample(paths: &[PathBuf]) -> Result<LoadedSample> {
    let slices = paths
        .iter()
        .map(|path| {
            image::open(path)
                .map(|img| img.to_rgba8())
                .map_err(|e| AlgorithmError::ImageLoad {
                    path: path.clone(),
                    source: e,
                })
        })
        .collect::<Result<Vec<_>>>()?;
    sample_from_images(&slices)
}

/// Render a generated volume as one image per z layer
///
/// # Errors
///
/// Returns an error if the volume is too large for an image or a symbol has no color
pub fn volume_to_images(
    volume: &Array3<Option<Symbol>>,
    palette: &SymbolTable<[u8; 4]>,
) -> Result<Vec<RgbaImage>> {
    let (sx, sy, sz) = volume.dim();
    let width = u32::try_from(sx).map_err(|e| invalid_parameter("width", &sx, &e))?;
    let height = u32::try_from(sy).map_err(|e| invalid_parameter("height", &sy, &e))?;

    let mut images = Vec::with_capacity(sz);
    for z in 0..sz {
        let mut img = ImageBuffer::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let cell = volume.get([x as usize, y as usize, z]).copied().flatten();
            let color = match cell {
                Some(symbol) => *palette.resolve(symbol).ok_or_else(|| {
                    invalid_source(&format!("symbol {symbol} has no palette color"))
                })?,
                None => [0, 0, 0, 0],
            };
            *pixel = Rgba(color);
        }
        images.push(img);
    }
    Ok(images)
}

/// Path of the exported slice for layer `z`
pub fn slice_path(dir: &Path, z: usize) -> PathBuf {
    dir.join(format!("{SLICE_PREFIX}_{z}.png"))
}

/// Write a generated volume as PNG slices into `dir`
///
/// Returns the written paths in z order.
///
/// # Errors
///
/// Returns an error if:
/// - The output directory cannot be created
/// - A symbol has no palette color
/// - An image cannot be saved
pub fn export_volume(
    volume: &Array3<Option<Symbol>>,
    palette: &SymbolTable<[u8; 4]>,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_path(dir)
        .with_operation("create directory")?;

    let images = volume_to_images(volume, palette)?;
    let mut written = Vec::with_capacity(images.len());
    for (z, img) in images.iter().enumerate() {
        let path = slice_path(dir, z);
        img.save(&path).map_err(|e| AlgorithmError::ImageExport {
            path: path.clone(),
            source: e,
        })?;
        written.push(path);
    }
    Ok(written)
}
