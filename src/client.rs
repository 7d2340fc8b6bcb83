use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{ConversionRequest, ConversionResult, WireResult};

/*
 * The conversion client performs exactly one exchange per request with the remote service
 *
 * - it never retries and never touches session state, the caller decides what happens next
 * - errors carrying a `detail` body are kept apart so the caller can show them verbatim
 */

pub trait ConversionService {
    fn submit(&self, request: &ConversionRequest) -> Result<ConversionResult, ClientError>;
}

impl<T: ConversionService + ?Sized> ConversionService for &T {
    fn submit(&self, request: &ConversionRequest) -> Result<ConversionResult, ClientError> {
        (**self).submit(request)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Banner {
    message: String,
}

#[derive(Debug, Clone)]
pub struct HttpConversionClient {
    client: Client,
    config: ClientConfig,
}

impl HttpConversionClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches the service banner from `GET /api/`.
    pub fn ping(&self) -> Result<String, ClientError> {
        let url = self.config.endpoint("api/")?;
        let resp = Self::check_status(self.client.get(url).send()?)?;

        let banner: Banner = resp
            .json()
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        Ok(banner.message)
    }

    // non-2xx responses become errors, preferring a string `detail` when present
    fn check_status(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                detail: serde_json::Value::String(detail),
            }) => Err(ClientError::Service { detail }),
            _ => {
                debug!(%status, "error response without a string detail");
                Err(ClientError::Status(status))
            }
        }
    }
}

impl ConversionService for HttpConversionClient {
    fn submit(&self, request: &ConversionRequest) -> Result<ConversionResult, ClientError> {
        let url = self.config.endpoint("api/download")?;
        debug!(
            %url,
            source = %request.url,
            format = %request.format,
            quality = %request.quality,
            "sending conversion request"
        );

        let resp = self.client.post(url).json(request).send().map_err(|e| {
            warn!("conversion request failed: {}", e);
            ClientError::from(e)
        })?;
        let resp = Self::check_status(resp)?;

        let body = resp.text()?;
        let wire: WireResult = serde_json::from_str(&body).map_err(|e| {
            warn!("malformed conversion response: {}", e);
            ClientError::Protocol(e.to_string())
        })?;

        ConversionResult::from_wire(wire)
    }
}
