use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::client::ConversionService;
use crate::delivery::{DeliveryAction, DeliveryResolver, DownloadTrigger};
use crate::error::{InputError, SessionError};
use crate::model::{ConversionOptions, ConversionResult};
use crate::validator;

/*
 * The Session drives one conversion at a time from input to delivery
 *
 * - Idle -> Submitting only when the url passes validation, otherwise it stays Idle with a hint
 * - Submitting ends in Ready (file delivery started once) or Failed
 * - Ready and Failed go back to Idle on reset, or implicitly on the next submit
 * - while Submitting, a new submit is ignored and reset/option changes are refused
 * - the lock is released during the network call so the guard is visible to other threads
 */

pub const PROCESSING: &str = "Processing your request...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
    Ready { title: String, delivery: DeliveryAction },
    Failed { message: String },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Submitting => "submitting",
            SessionState::Ready { .. } => "ready",
            SessionState::Failed { .. } => "failed",
        }
    }
}

/// What a single submit call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was refused locally, no request was sent.
    Invalid(InputError),
    /// Another submission is in flight, nothing changed.
    Busy,
    Ready(DeliveryAction),
    Failed(String),
}

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    message: Option<String>,
    options: ConversionOptions,
}

impl Inner {
    fn clear(&mut self) {
        self.state = SessionState::Idle;
        self.message = None;
    }

    fn fail(&mut self, message: String) -> SubmitOutcome {
        warn!("conversion failed: {}", message);
        self.state = SessionState::Failed { message: message.clone() };
        self.message = Some(message.clone());
        SubmitOutcome::Failed(message)
    }
}

pub struct Session<S, D> {
    service: S,
    resolver: DeliveryResolver,
    trigger: D,
    inner: Mutex<Inner>,
}

impl<S, D> Session<S, D>
where
    S: ConversionService,
    D: DownloadTrigger,
{
    pub fn new(service: S, resolver: DeliveryResolver, trigger: D) -> Self {
        Self {
            service,
            resolver,
            trigger,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn message(&self) -> Option<String> {
        self.lock().message.clone()
    }

    pub fn options(&self) -> ConversionOptions {
        self.lock().options
    }

    pub fn set_options(&self, options: ConversionOptions) -> Result<(), SessionError> {
        let mut inner = self.lock();
        if inner.state == SessionState::Submitting {
            return Err(SessionError::Busy);
        }
        inner.options = options;
        Ok(())
    }

    /// Whether the submit control should be enabled for this input.
    pub fn can_submit(&self, raw_url: &str) -> bool {
        self.lock().state != SessionState::Submitting && !raw_url.trim().is_empty()
    }

    pub fn reset(&self) -> Result<(), SessionError> {
        let mut inner = self.lock();
        if inner.state == SessionState::Submitting {
            return Err(SessionError::Busy);
        }
        debug!(from = inner.state.name(), "session reset");
        inner.clear();
        Ok(())
    }

    pub fn submit(&self, raw_url: &str) -> SubmitOutcome {
        // phase one: validate and claim the session
        let request = {
            let mut inner = self.lock();
            if inner.state == SessionState::Submitting {
                debug!("submit ignored, a conversion is already in flight");
                return SubmitOutcome::Busy;
            }
            inner.clear();

            if let Err(e) = validator::check(raw_url) {
                inner.message = Some(e.to_string());
                return SubmitOutcome::Invalid(e);
            }

            let request = validator::compose(raw_url, inner.options);
            inner.state = SessionState::Submitting;
            inner.message = Some(PROCESSING.to_string());
            request
        };

        info!(
            url = %request.url,
            format = %request.format,
            quality = %request.quality,
            "submitting conversion"
        );
        let result = self.service.submit(&request);

        // phase two: settle the state, delivery starts after the lock is gone
        let action = {
            let mut inner = self.lock();
            let result = match result {
                Ok(result) => result,
                Err(e) => return inner.fail(e.user_message()),
            };
            let title = match &result {
                ConversionResult::Converted { title, .. } => title.clone(),
                ConversionResult::Rejected { message } => {
                    return inner.fail(format!("Error: {}", message))
                }
            };

            let action = match self.resolver.resolve(&request, &result) {
                Ok(action) => action,
                Err(e) => return inner.fail(format!("Error: {}", e)),
            };

            info!(%title, token = %action.token, "conversion ready");
            inner.message = Some(format!("Successfully processed: {}", title));
            inner.state = SessionState::Ready {
                title,
                delivery: action.clone(),
            };
            action
        };

        self.trigger.initiate_download(&action.location, &action.suggested_name);
        SubmitOutcome::Ready(action)
    }
}
