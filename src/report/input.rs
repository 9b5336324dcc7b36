//! Gatekeeping between the form and the pipeline.
//!
//! Nothing reaches the hosted services until both credentials are present and an image
//! has been uploaded. Checks run in a fixed order and stop at the first failure.

use crate::error::InputError;
use crate::report::profile::{normalize, ArtworkOrigin, ArtworkProfile, ArtworkSource, UploadedImage};
use std::fmt;

/// API keys as entered in the session's configuration form. Either may be missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    model_api_key: Option<String>,
    search_api_key: Option<String>,
}

impl Credentials {
    pub fn new(model_api_key: Option<String>, search_api_key: Option<String>) -> Self {
        Self {
            model_api_key: normalize(model_api_key),
            search_api_key: normalize(search_api_key),
        }
    }

    /// Replace the model-service key; blank input leaves the stored key alone.
    /// Returns whether anything changed.
    pub fn update_model_key(&mut self, key: Option<String>) -> bool {
        match normalize(key) {
            Some(key) => {
                self.model_api_key = Some(key);
                true
            }
            None => false,
        }
    }

    /// Replace the search-service key; blank input leaves the stored key alone.
    pub fn update_search_key(&mut self, key: Option<String>) -> bool {
        match normalize(key) {
            Some(key) => {
                self.search_api_key = Some(key);
                true
            }
            None => false,
        }
    }

    pub fn has_model_key(&self) -> bool {
        self.model_api_key.is_some()
    }

    pub fn has_search_key(&self) -> bool {
        self.search_api_key.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("model_api_key", &self.model_api_key.as_ref().map(|_| "<set>"))
            .field("search_api_key", &self.search_api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Both keys, known to be present.
#[derive(Clone)]
pub struct ApiKeys {
    pub model: String,
    pub search: String,
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKeys { .. }")
    }
}

/// A raw form submission, before validation.
#[derive(Debug, Clone, Default)]
pub struct ArtworkSubmission {
    pub image: Option<UploadedImage>,
    pub artist_name: Option<String>,
    pub title: Option<String>,
    pub source: ArtworkSource,
    pub origin: ArtworkOrigin,
}

impl ArtworkSubmission {
    /// Check credentials and image, in that order, and build the profile.
    pub fn validate(self, credentials: &Credentials) -> Result<(ArtworkProfile, ApiKeys), InputError> {
        let model = credentials.model_api_key.clone().ok_or(InputError::MissingModelKey)?;
        let search = credentials.search_api_key.clone().ok_or(InputError::MissingSearchKey)?;
        let image = self.image.ok_or(InputError::MissingImage)?;

        let profile = ArtworkProfile::new(image, self.artist_name, self.title, self.source, self.origin);

        Ok((profile, ApiKeys { model, search }))
    }
}
