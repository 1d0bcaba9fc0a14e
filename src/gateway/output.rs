//! Speech output gateway trait and the console implementation.
//!
//! [`OutputGateway`] renders assistant text audibly (or, in the console
//! build, visibly). [`speak`](OutputGateway::speak) resolves when the
//! utterance has finished playing; starting a new `speak` implicitly cancels
//! any utterance still in progress, and [`stop`](OutputGateway::stop) cancels
//! without replacement.

use async_trait::async_trait;

use crate::config::SpeechConfig;

// ---------------------------------------------------------------------------
// OutputGateway trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech output backends.
#[async_trait]
pub trait OutputGateway: Send + Sync {
    /// Render `text` as speech, resolving once output has finished.
    async fn speak(&self, text: &str);

    /// Cancel any utterance in progress.
    fn stop(&self);
}

// Compile-time assertion: Box<dyn OutputGateway> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn OutputGateway>) {}
};

// ---------------------------------------------------------------------------
// ConsoleOutput
// ---------------------------------------------------------------------------

/// Terminal output backend: the reply is printed instead of synthesized.
pub struct ConsoleOutput {
    speech: SpeechConfig,
}

impl ConsoleOutput {
    pub fn new(speech: SpeechConfig) -> Self {
        Self { speech }
    }
}

#[async_trait]
impl OutputGateway for ConsoleOutput {
    async fn speak(&self, text: &str) {
        log::debug!(
            "output: speaking {} chars (lang={}, rate={})",
            text.len(),
            self.speech.language,
            self.speech.rate
        );
        println!("assistant> {text}");
    }

    fn stop(&self) {
        // Printing completes synchronously; there is never an utterance left
        // in progress to cancel.
    }
}

// ---------------------------------------------------------------------------
// MockOutput  (test-only)
// ---------------------------------------------------------------------------

/// A test double that records everything spoken; optionally holds each
/// `speak` call open until released, to keep the engine observable in its
/// speaking state.
#[cfg(test)]
pub struct MockOutput {
    spoken: std::sync::Mutex<Vec<String>>,
    gate: Option<tokio::sync::Notify>,
}

#[cfg(test)]
impl MockOutput {
    /// Completes every `speak` immediately.
    pub fn new() -> Self {
        Self {
            spoken: std::sync::Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Holds each `speak` open until [`release`](Self::release).
    pub fn gated() -> Self {
        Self {
            spoken: std::sync::Mutex::new(Vec::new()),
            gate: Some(tokio::sync::Notify::new()),
        }
    }

    /// Let a gated `speak` call finish.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Everything spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl OutputGateway for MockOutput {
    async fn speak(&self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn stop(&self) {
        self.release();
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
    async fn mock_records_spoken_text_in_order() {
        let output = MockOutput::new();
        output.speak("first").await;
        output.speak("second").await;
        assert_eq!(output.spoken(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn gated_mock_blocks_until_released() {
        let output = Arc::new(MockOutput::gated());

        let speaking = {
            let output = Arc::clone(&output);
            tokio::spawn(async move { output.speak("held").await })
        };

        tokio::task::yield_now().await;
        assert!(!speaking.is_finished());
        assert_eq!(output.spoken(), vec!["held"]);

        output.release();
        speaking.await.unwrap();
    }

    #[tokio::test]
    async fn console_output_speak_completes() {
        let output = ConsoleOutput::new(SpeechConfig::default());
        output.speak("hello").await;
        output.stop();
    }
}
