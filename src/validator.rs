use crate::error::InputError;
use crate::model::{ConversionOptions, ConversionRequest};

// host markers accepted as a video source (domain root and short links)
const HOST_MARKERS: [&str; 2] = ["youtube.com", "youtu.be"];

// syntactic pre-filter only, the service does the real validation
pub fn check(raw: &str) -> Result<(), InputError> {
    if raw.trim().is_empty() {
        return Err(InputError::Empty);
    }

    if !HOST_MARKERS.iter().any(|marker| raw.contains(marker)) {
        return Err(InputError::Unsupported);
    }

    Ok(())
}

pub fn validate(raw: &str) -> bool {
    check(raw).is_ok()
}

/// Builds the request body for an already validated URL.
pub fn compose(raw_url: &str, options: ConversionOptions) -> ConversionRequest {
    ConversionRequest {
        url: raw_url.trim().to_string(),
        format: options.format,
        quality: options.quality,
    }
}
