//! Pipeline input: an already decoded image, a file path, or encoded bytes.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::InputError;

/// Image handed to the pipeline.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Decoded(DynamicImage),
    Path(PathBuf),
    /// Encoded image bytes in any format the `image` crate can sniff.
    Bytes(Vec<u8>),
}

impl ImageInput {
    /// Resolve to a decoded raster with non-zero dimensions.
    pub fn load(self) -> Result<DynamicImage, InputError> {
        let image = match self {
            ImageInput::Decoded(image) => image,
            ImageInput::Path(path) => {
                let bytes = std::fs::read(&path).map_err(|source| InputError::Unreadable {
                    path: path.display().to_string(),
                    source,
                })?;
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                decode(&bytes)?
            }
            ImageInput::Bytes(bytes) => decode(&bytes)?,
        };

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(InputError::ZeroDimension { width, height });
        }
        Ok(image)
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, InputError> {
    if bytes.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(image::load_from_memory(bytes)?)
}

impl From<DynamicImage> for ImageInput {
    fn from(image: DynamicImage) -> Self {
        ImageInput::Decoded(image)
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        ImageInput::Path(path)
    }
}

impl From<&Path> for ImageInput {
    fn from(path: &Path) -> Self {
        ImageInput::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageInput {
    fn from(bytes: Vec<u8>) -> Self {
        ImageInput::Bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_load_bytes() {
        let image = ImageInput::from(png_bytes(7, 5)).load().unwrap();
        assert_eq!(image.dimensions(), (7, 5));
    }

    #[test]
    fn test_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        std::fs::write(&path, png_bytes(3, 4)).unwrap();

        let image = ImageInput::from(path.as_path()).load().unwrap();
        assert_eq!(image.dimensions(), (3, 4));
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(ImageInput::Bytes(Vec::new()).load(), Err(InputError::Empty)));
        assert!(matches!(
            ImageInput::Bytes(b"not an image".to_vec()).load(),
            Err(InputError::Decode(_))
        ));
        assert!(matches!(
            ImageInput::Path(PathBuf::from("/nonexistent/card.png")).load(),
            Err(InputError::Unreadable { .. })
        ));
        assert!(matches!(
            ImageInput::Decoded(DynamicImage::new_rgb8(0, 10)).load(),
            Err(InputError::ZeroDimension { width: 0, height: 10 })
        ));
    }
}
