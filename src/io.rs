//! Grayscale image load/save on top of the `image` crate.

use std::path::{Path, PathBuf};

use facenorm_vision::Image;

/// Failures of the file layer, kept apart from pipeline errors.
#[derive(thiserror::Error, Debug)]
pub enum ImageIoError {
    #[error("reading image {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("writing image {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {path} has unusable dimensions {width}x{height}")]
    Dimensions {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

/// Loads any supported format as a single-channel 8-bit image.
///
/// Colour and alpha are discarded: the decoded image is converted to 8-bit
/// luma, so only grayscale content reaches the filters.
pub fn load_gray(path: &Path) -> Result<Image<u8>, ImageIoError> {
    let decoded = image::open(path).map_err(|source| ImageIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let luma = decoded.to_luma8();
    let (width, height) = luma.dimensions();
    log::debug!("loaded {} ({}x{})", path.display(), width, height);

    Image::from_vec(height as usize, width as usize, luma.into_raw()).map_err(|_| {
        ImageIoError::Dimensions {
            path: path.to_path_buf(),
            width,
            height,
        }
    })
}

/// Saves an 8-bit image; the format follows the file extension.
pub fn save_gray(img: &Image<u8>, path: &Path) -> Result<(), ImageIoError> {
    let (height, width) = img.shape();
    let dimensions_err = || ImageIoError::Dimensions {
        path: path.to_path_buf(),
        width: width as u32,
        height: height as u32,
    };
    let width = u32::try_from(width).map_err(|_| dimensions_err())?;
    let height = u32::try_from(height).map_err(|_| dimensions_err())?;

    let buffer = image::GrayImage::from_raw(width, height, img.to_vec()).ok_or_else(dimensions_err)?;
    buffer.save(path).map_err(|source| ImageIoError::Write {
        path: path.to_path_buf(),
        source,
    })
}
