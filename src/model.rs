use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    M4a,
    Flac,
    Ogg,
}

impl Default for AudioFormat {
    fn default() -> Self {
        AudioFormat::Mp3
    }
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 5] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::M4a,
        AudioFormat::Flac,
        AudioFormat::Ogg,
    ];

    /// The name sent over the wire, also used as the file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::M4a => "m4a",
            AudioFormat::Flac => "flac",
            AudioFormat::Ogg => "ogg",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "MP3",
            AudioFormat::Wav => "WAV",
            AudioFormat::M4a => "M4A",
            AudioFormat::Flac => "FLAC",
            AudioFormat::Ogg => "OGG",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AudioFormat::ALL
            .iter()
            .copied()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown audio format '{}' (expected mp3, wav, m4a, flac or ogg)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    Medium,
    Low,
}

impl Default for Quality {
    fn default() -> Self {
        Quality::High
    }
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::High, Quality::Medium, Quality::Low];

    pub fn name(&self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quality::High => "High Quality (Best Available)",
            Quality::Medium => "Medium Quality (128kbps)",
            Quality::Low => "Low Quality (64kbps)",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Quality::ALL
            .iter()
            .copied()
            .find(|quality| quality.name() == wanted)
            .ok_or_else(|| format!("unknown quality '{}' (expected high, medium or low)", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    pub format: AudioFormat,
    pub quality: Quality,
}

/// Body of `POST /api/download`. Built once per submission by
/// [`crate::validator::compose`] and never reused.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    pub url: String,
    pub format: AudioFormat,
    pub quality: Quality,
}

impl ConversionRequest {
    pub fn options(&self) -> ConversionOptions {
        ConversionOptions {
            format: self.format,
            quality: self.quality,
        }
    }
}

/// Outcome reported by the conversion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Converted { title: String, file_path: String },
    Rejected { message: String },
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Converted { .. })
    }
}

// the loosely typed body as the service sends it
#[derive(Debug, Deserialize)]
pub(crate) struct WireResult {
    pub success: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ConversionResult {
    // success needs title and file_path, failure needs message; anything else is malformed
    pub(crate) fn from_wire(wire: WireResult) -> Result<Self, ClientError> {
        match wire {
            WireResult {
                success: true,
                title: Some(title),
                file_path: Some(file_path),
                ..
            } => Ok(ConversionResult::Converted { title, file_path }),
            WireResult { success: true, .. } => Err(ClientError::Protocol(
                "successful response without title or file_path".to_string(),
            )),
            WireResult {
                success: false,
                message: Some(message),
                ..
            } => Ok(ConversionResult::Rejected { message }),
            WireResult { success: false, .. } => Err(ClientError::Protocol(
                "failed response without message".to_string(),
            )),
        }
    }
}
