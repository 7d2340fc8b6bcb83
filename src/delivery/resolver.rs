use tracing::warn;
use url::Url;

use crate::config::ClientConfig;
use crate::error::DeliveryError;
use crate::model::{ConversionRequest, ConversionResult};

const SEPARATOR: &str = "/";
const SUBSTITUTE: &str = "__";
const FILES_PATH: &str = "api/download-file/";

/// Replaces every path separator with `__`. The service reverses this to
/// find the file.
pub fn flatten(path: &str) -> String {
    path.replace(SEPARATOR, SUBSTITUTE)
}

/// Inverse of [`flatten`], as the service applies it.
pub fn unflatten(token: &str) -> String {
    token.replace(SUBSTITUTE, SEPARATOR)
}

/// A token only identifies the file if the service decodes it back to the
/// same path.
pub fn is_reversible(path: &str) -> bool {
    unflatten(&flatten(path)) == path
}

/// Everything the platform needs to fetch one converted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAction {
    pub location: Url,
    pub token: String,
    pub suggested_name: String,
}

#[derive(Debug, Clone)]
pub struct DeliveryResolver {
    files_base: Url,
}

impl DeliveryResolver {
    pub fn new(config: &ClientConfig) -> Result<Self, DeliveryError> {
        Ok(Self {
            files_base: config.endpoint(FILES_PATH)?,
        })
    }

    pub fn resolve(
        &self,
        request: &ConversionRequest,
        result: &ConversionResult,
    ) -> Result<DeliveryAction, DeliveryError> {
        let (title, file_path) = match result {
            ConversionResult::Converted { title, file_path } => (title, file_path),
            ConversionResult::Rejected { .. } => return Err(DeliveryError::NotConverted),
        };

        if !is_reversible(file_path) {
            return Err(DeliveryError::AmbiguousPath(file_path.clone()));
        }
        let token = flatten(file_path);

        // the selected format names the file, even if the service picked another container
        let extension = request.format.extension();
        if !file_path.ends_with(&format!(".{}", extension)) {
            warn!(
                %file_path,
                %extension,
                "served file extension differs from the selected format"
            );
        }

        let mut location = self.files_base.clone();
        location
            .path_segments_mut()
            .map_err(|_| {
                DeliveryError::Location(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .push(&token);

        Ok(DeliveryAction {
            location,
            token,
            suggested_name: format!("{}.{}", title, extension),
        })
    }
}
