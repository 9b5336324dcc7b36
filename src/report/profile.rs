//! What the user tells us about an artwork.

use crate::error::InputError;
use std::fmt;
use std::path::Path;

pub const NOT_PROVIDED: &str = "Not provided";

/// Image encodings accepted by the upload form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    fn from_extension(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// Identify the format from the content, falling back to the file name when the
    /// bytes carry no recognisable signature.
    pub fn detect(file_name: &str, bytes: &[u8]) -> Result<Self, InputError> {
        let unsupported = || InputError::UnsupportedImage(file_name.to_string());

        match infer::get(bytes) {
            Some(kind) => match kind.mime_type() {
                "image/jpeg" => Ok(ImageFormat::Jpeg),
                "image/png" => Ok(ImageFormat::Png),
                _ => Err(unsupported()),
            },
            None => Self::from_extension(file_name).ok_or_else(unsupported),
        }
    }
}

/// The uploaded artwork image, held in memory for the lifetime of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, InputError> {
        if bytes.is_empty() {
            return Err(InputError::MissingImage);
        }
        let file_name = file_name.into();
        let format = ImageFormat::detect(&file_name, &bytes)?;

        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }
}

impl fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedImage")
            .field("file_name", &self.file_name)
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Where the user came across the artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtworkSource {
    #[default]
    MuseumOrGallery,
    Online,
    SocialMedia,
    Publication,
    PersonalCollection,
    DontRemember,
}

impl ArtworkSource {
    pub const ALL: [ArtworkSource; 6] = [
        ArtworkSource::MuseumOrGallery,
        ArtworkSource::Online,
        ArtworkSource::SocialMedia,
        ArtworkSource::Publication,
        ArtworkSource::PersonalCollection,
        ArtworkSource::DontRemember,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ArtworkSource::MuseumOrGallery => "Museum or gallery",
            ArtworkSource::Online => "Online (website or blog)",
            ArtworkSource::SocialMedia => "Social media",
            ArtworkSource::Publication => "Book or publication",
            ArtworkSource::PersonalCollection => "Personal collection",
            ArtworkSource::DontRemember => "Don’t remember",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// Whether the photo shows a physical or a digital work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtworkOrigin {
    #[default]
    Physical,
    Digital,
    NotSure,
}

impl ArtworkOrigin {
    pub const ALL: [ArtworkOrigin; 3] =
        [ArtworkOrigin::Physical, ArtworkOrigin::Digital, ArtworkOrigin::NotSure];

    pub fn label(self) -> &'static str {
        match self {
            ArtworkOrigin::Physical => "Physical Artwork",
            ArtworkOrigin::Digital => "Digital Artwork",
            ArtworkOrigin::NotSure => "Not sure",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.label() == label)
    }
}

/// Everything one report generation works from. Immutable once built.
#[derive(Debug, Clone)]
pub struct ArtworkProfile {
    pub image: UploadedImage,
    pub artist_name: Option<String>,
    pub title: Option<String>,
    pub source: ArtworkSource,
    pub origin: ArtworkOrigin,
}

impl ArtworkProfile {
    pub fn new(
        image: UploadedImage,
        artist_name: Option<String>,
        title: Option<String>,
        source: ArtworkSource,
        origin: ArtworkOrigin,
    ) -> Self {
        Self {
            image,
            artist_name: normalize(artist_name),
            title: normalize(title),
            source,
            origin,
        }
    }

    pub fn artist_or_placeholder(&self) -> &str {
        self.artist_name.as_deref().unwrap_or(NOT_PROVIDED)
    }

    pub fn title_or_placeholder(&self) -> &str {
        self.title.as_deref().unwrap_or(NOT_PROVIDED)
    }
}

/// Blank form fields mean "not provided".
pub fn normalize(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
