//! Speech capture gateway trait and the console implementation.
//!
//! [`CaptureGateway`] is the engine's view of whatever produces recognized
//! utterances — a browser recognition API, a native recognizer, or (here) a
//! terminal. One call to [`capture`](CaptureGateway::capture) corresponds to
//! one recognition session: it resolves with a single utterance or a
//! [`CaptureError`], and [`stop`](CaptureGateway::stop) aborts the session
//! in progress. At most one capture session is active at a time; the
//! orchestrator's single-flight state machine enforces this.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can end a capture session without an utterance.
///
/// The variants mirror the recognition error codes of the speech capture
/// front-ends this engine is paired with (no-speech, audio-capture,
/// not-allowed, network, aborted).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The session ended without recognizing any speech.
    #[error("no speech was recognized")]
    NoSpeech,

    /// The audio input device failed or was unavailable.
    #[error("audio capture failed: {0}")]
    AudioCapture(String),

    /// The user or platform denied capture permission.
    #[error("capture permission was denied")]
    NotAllowed,

    /// The recognizer lost its network connection.
    #[error("network error during capture")]
    Network,

    /// `stop()` was called before an utterance was recognized.
    #[error("capture was stopped")]
    Aborted,

    /// No capture backend exists in this environment.
    #[error("speech capture is not supported in this environment")]
    Unsupported,
}

// ---------------------------------------------------------------------------
// CaptureGateway trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech capture backends.
#[async_trait]
pub trait CaptureGateway: Send + Sync {
    /// Run one capture session to completion.
    ///
    /// Resolves with the recognized utterance, or with a [`CaptureError`] —
    /// including [`CaptureError::Aborted`] when [`stop`](Self::stop) is
    /// called while the session is pending.
    async fn capture(&self) -> Result<String, CaptureError>;

    /// Abort the capture session in progress, if any.
    fn stop(&self);

    /// Whether a capture backend is available at all.
    fn is_supported(&self) -> bool {
        true
    }
}

// Compile-time assertion: Box<dyn CaptureGateway> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CaptureGateway>) {}
};

// ---------------------------------------------------------------------------
// ConsoleCapture
// ---------------------------------------------------------------------------

/// Terminal capture backend: one typed line stands in for one recognized
/// utterance.
///
/// Used by the console front-end; the engine only ever sees the trait.
#[derive(Default)]
pub struct ConsoleCapture {
    cancel: Notify,
}

impl ConsoleCapture {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CaptureGateway for ConsoleCapture {
    async fn capture(&self) -> Result<String, CaptureError> {
        // std stdin is globally buffered, so reading here interleaves safely
        // with a front-end that also reads lines between capture sessions.
        let read = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) => Err(CaptureError::AudioCapture("stdin closed".into())),
                Ok(_) => Ok(line),
                Err(e) => Err(CaptureError::AudioCapture(e.to_string())),
            }
        });

        tokio::select! {
            joined = read => match joined {
                Ok(Ok(line)) => {
                    let text = line.trim();
                    if text.is_empty() {
                        Err(CaptureError::NoSpeech)
                    } else {
                        Ok(text.to_string())
                    }
                }
                Ok(Err(e)) => Err(e),
                Err(e) => Err(CaptureError::AudioCapture(e.to_string())),
            },
            _ = self.cancel.notified() => Err(CaptureError::Aborted),
        }
    }

    fn stop(&self) {
        // notify_one stores a permit, so a stop that races ahead of the next
        // capture() call still aborts it.
        self.cancel.notify_one();
    }
}

// ---------------------------------------------------------------------------
// MockCapture  (test-only)
// ---------------------------------------------------------------------------

/// A test double that resolves with a pre-configured response, or blocks
/// until [`stop`](CaptureGateway::stop) when built with
/// [`MockCapture::pending`].
#[cfg(test)]
pub struct MockCapture {
    response: Result<String, CaptureError>,
    wait_for_stop: bool,
    stopped: Notify,
    supported: bool,
}

#[cfg(test)]
impl MockCapture {
    /// Always resolves with `Ok(text)`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            wait_for_stop: false,
            stopped: Notify::new(),
            supported: true,
        }
    }

    /// Always resolves with `Err(error)`.
    pub fn err(error: CaptureError) -> Self {
        Self {
            response: Err(error),
            wait_for_stop: false,
            stopped: Notify::new(),
            supported: true,
        }
    }

    /// Blocks until `stop()` is called, then resolves with `Aborted` —
    /// models a listening session the user cancels.
    pub fn pending() -> Self {
        Self {
            response: Err(CaptureError::Aborted),
            wait_for_stop: true,
            stopped: Notify::new(),
            supported: true,
        }
    }

    /// Reports `is_supported() == false`.
    pub fn unsupported() -> Self {
        Self {
            response: Err(CaptureError::Unsupported),
            wait_for_stop: false,
            stopped: Notify::new(),
            supported: false,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl CaptureGateway for MockCapture {
    async fn capture(&self) -> Result<String, CaptureError> {
        if self.wait_for_stop {
            self.stopped.notified().await;
            return Err(CaptureError::Aborted);
        }
        self.response.clone()
    }

    fn stop(&self) {
        self.stopped.notify_one();
    }

    fn is_supported(&self) -> bool {
        self.supported
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn mock_ok_returns_configured_text() {
        let capture = MockCapture::ok("hello");
        assert_eq!(capture.capture().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn mock_err_returns_configured_error() {
        let capture = MockCapture::err(CaptureError::NoSpeech);
        assert_eq!(capture.capture().await.unwrap_err(), CaptureError::NoSpeech);
    }

    #[tokio::test]
    async fn mock_pending_resolves_aborted_after_stop() {
        let capture = Arc::new(MockCapture::pending());

        let pending = {
            let capture = Arc::clone(&capture);
            tokio::spawn(async move { capture.capture().await })
        };

        // Give the capture future a chance to register its waiter.
        tokio::task::yield_now().await;
        capture.stop();

        let result = pending.await.unwrap();
        assert_eq!(result.unwrap_err(), CaptureError::Aborted);
    }

    #[tokio::test]
    async fn stop_before_capture_still_aborts() {
        let capture = MockCapture::pending();
        capture.stop();
        assert_eq!(capture.capture().await.unwrap_err(), CaptureError::Aborted);
    }

    #[test]
    fn mock_unsupported_reports_unsupported() {
        let capture = MockCapture::unsupported();
        assert!(!capture.is_supported());
    }

    #[test]
    fn console_capture_is_supported() {
        let capture = ConsoleCapture::new();
        assert!(capture.is_supported());
    }
}
