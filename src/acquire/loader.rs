use std::path::Path;

use image::RgbaImage;

use crate::error::LoadError;

/// Read and decode an image file into RGBA8 at its natural size.
pub fn decode_file(path: &Path) -> Result<RgbaImage, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("decoded {:?} ({}x{})", path, img.width(), img.height());
    Ok(img.to_rgba8())
}
