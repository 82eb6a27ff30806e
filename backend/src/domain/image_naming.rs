//! Storage names for uploaded recipe images.
//!
//! The uploaded file's base name is discarded; only its extension survives,
//! appended to a freshly generated identifier under [`RECIPE_IMAGE_DIR`].

use std::fmt;

use image::ImageFormat;
use uuid::Uuid;

use super::recipe::ImagePath;

/// Directory, relative to the media root, holding recipe images.
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

/// Source of unique identifiers for stored images.
#[cfg_attr(test, mockall::automock)]
pub trait ImageIdGenerator: Send + Sync {
    /// Return an identifier not used by any earlier call.
    fn next_id(&self) -> String;
}

/// Generates random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidImageIdGenerator;

impl ImageIdGenerator for UuidImageIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Extensions accepted for uploads, matched case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Reasons a filename cannot be turned into a storage path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageNameError {
    MissingExtension,
    InvalidExtension,
    UnsupportedExtension { extension: String },
}

impl fmt::Display for ImageNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingExtension => write!(f, "image filename must have an extension"),
            Self::InvalidExtension => write!(f, "image filename extension is not valid"),
            Self::UnsupportedExtension { extension } => write!(
                f,
                "file extension \"{extension}\" is not allowed; allowed extensions are: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        }
    }
}

/// Image format an accepted extension promises, if it is one we accept.
///
/// `jpg` and `jpeg` both map to JPEG.
pub fn format_for_extension(extension: &str) -> Option<ImageFormat> {
    let lowered = extension.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&lowered.as_str()) {
        return None;
    }
    ImageFormat::from_extension(&lowered)
}

/// Extension of a storage path produced by [`name_for`].
pub fn extension_of(path: &ImagePath) -> Option<&str> {
    path.as_ref().rsplit_once('.').map(|(_, ext)| ext)
}

impl std::error::Error for ImageNameError {}

/// Build the storage path for an upload named `original_filename`.
///
/// The extension is the text after the final `.`, case preserved. It must
/// be one of [`ALLOWED_EXTENSIONS`].
///
/// # Examples
/// ```
/// use recipe_backend::domain::image_naming::{ImageIdGenerator, name_for};
///
/// struct Fixed;
/// impl ImageIdGenerator for Fixed {
///     fn next_id(&self) -> String {
///         "abc-123".to_owned()
///     }
/// }
///
/// let path = name_for("photo.JPG", &Fixed).unwrap();
/// assert_eq!(path.as_ref(), "uploads/recipe/abc-123.JPG");
/// ```
pub fn name_for(
    original_filename: &str,
    ids: &dyn ImageIdGenerator,
) -> Result<ImagePath, ImageNameError> {
    let (_, extension) = original_filename
        .rsplit_once('.')
        .ok_or(ImageNameError::MissingExtension)?;
    if extension.is_empty() {
        return Err(ImageNameError::MissingExtension);
    }
    if extension
        .chars()
        .any(|c| matches!(c, '/' | '\\') || c.is_whitespace() || c.is_control())
    {
        return Err(ImageNameError::InvalidExtension);
    }
    if format_for_extension(extension).is_none() {
        return Err(ImageNameError::UnsupportedExtension {
            extension: extension.to_owned(),
        });
    }

    let id = ids.next_id();
    Ok(ImagePath::new(format!("{RECIPE_IMAGE_DIR}/{id}.{extension}")))
}
