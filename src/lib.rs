//! Client for a remote video-to-audio conversion service.
//!
//! A [`session::Session`] validates the url, sends one conversion request,
//! and on success hands the file location to a [`delivery::DownloadTrigger`].

pub mod client;
pub mod commands;
pub mod config;
pub mod delivery;
pub mod error;
pub mod model;
pub mod session;
pub mod validator;

pub use client::{ConversionService, HttpConversionClient};
pub use config::ClientConfig;
pub use delivery::{DeliveryAction, DeliveryResolver, DownloadTrigger, FileDownloader};
pub use error::{ClientError, ConfigError, DeliveryError, InputError, SessionError};
pub use model::{AudioFormat, ConversionOptions, ConversionRequest, ConversionResult, Quality};
pub use session::{Session, SessionState, SubmitOutcome};
