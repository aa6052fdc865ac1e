//! The polling driver loop.
//!
//! Every cycle fetches updates since the cursor, forwards one message per
//! homework record, then sleeps for the retry period. Failures are contained
//! in their cycle: send failures are only logged, everything else is reported
//! to the chat once per streak of identical messages.

use crate::api::{HomeworkSource, REQUEST_FAILED};
use crate::bot::Notifier;
use crate::dedup::ErrorDeduplicator;
use crate::error::BotError;
use crate::homework::{extract_homeworks, format_status};
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

/// Source of the current Unix time in seconds
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in seconds
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Result of a single poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// This many status messages were delivered
    Delivered(usize),
    /// The API reported no changes
    NoUpdates,
    /// A status message could not be delivered; nothing was reported
    NotifyFailed(BotError),
    /// The error was reported to the chat
    Reported(BotError),
    /// The error repeats the last reported one and was only logged
    Suppressed(BotError),
    /// Reporting the error to the chat failed
    ReportFailed(BotError),
}

/// Drives the poll, format and notify pipeline
pub struct Poller<S, N, C = SystemClock> {
    source: S,
    notifier: N,
    clock: C,
    retry_period: Duration,
    cursor: i64,
    errors: ErrorDeduplicator,
}

impl<S, N, C> Poller<S, N, C>
where
    S: HomeworkSource,
    N: Notifier,
    C: Clock,
{
    /// Creates a poller whose cursor starts at the current time
    pub fn new(source: S, notifier: N, clock: C, retry_period: Duration) -> Self {
        let cursor = clock.now();
        Self {
            source,
            notifier,
            clock,
            retry_period,
            cursor,
            errors: ErrorDeduplicator::new(),
        }
    }

    /// Timestamp from which the next cycle requests updates
    #[must_use]
    pub const fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Last error message delivered to the chat
    #[must_use]
    pub fn last_notified_error(&self) -> Option<&str> {
        self.errors.last_notified()
    }

    /// Polls forever, sleeping the retry period after every cycle
    pub async fn run(mut self) {
        info!(
            retry_period_secs = self.retry_period.as_secs(),
            cursor = self.cursor,
            "Polling started"
        );
        loop {
            let outcome = self.poll_once().await;
            debug!(?outcome, "Poll cycle finished");
            tokio::time::sleep(self.retry_period).await;
        }
    }

    /// Runs one cycle without sleeping
    pub async fn poll_once(&mut self) -> CycleOutcome {
        match self.process_updates().await {
            Ok(delivered) => {
                let now = self.clock.now();
                self.advance_cursor(now);
                if delivered == 0 {
                    CycleOutcome::NoUpdates
                } else {
                    CycleOutcome::Delivered(delivered)
                }
            }
            Err(err @ BotError::Notify(_)) => {
                error!(error = %err, "Failed to send message to Telegram");
                CycleOutcome::NotifyFailed(err)
            }
            Err(err) => self.report(err).await,
        }
    }

    async fn process_updates(&self) -> Result<usize, BotError> {
        let response = self.source.fetch_updates(self.cursor).await?;
        if is_falsy(&response) {
            return Err(BotError::Connectivity(REQUEST_FAILED.to_string()));
        }

        let homeworks = extract_homeworks(&response)?;
        if homeworks.is_empty() {
            debug!("No updates");
            return Ok(0);
        }

        for homework in homeworks {
            let message = format_status(homework)?;
            self.notifier.send(&message).await?;
        }
        Ok(homeworks.len())
    }

    async fn report(&mut self, err: BotError) -> CycleOutcome {
        let message = err.to_string();
        error!(
            category = err.category(),
            kind = err.kind(),
            error = %message,
            "Poll cycle failed"
        );

        if !self.errors.should_notify(&message) {
            info!(
                suppressed_total = self.errors.suppressed_count(),
                "Repeated error not reported to the chat"
            );
            return CycleOutcome::Suppressed(err);
        }

        match self.notifier.send(&err.notification_text()).await {
            Ok(()) => {
                self.errors.mark_notified(&message);
                CycleOutcome::Reported(err)
            }
            Err(send_err) => {
                error!(error = %send_err, "Failed to report error to Telegram");
                CycleOutcome::ReportFailed(err)
            }
        }
    }

    fn advance_cursor(&mut self, now: i64) {
        self.cursor = self.cursor.max(now);
    }
}

/// Empty bodies are treated like a failed request.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
