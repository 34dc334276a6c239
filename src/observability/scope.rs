//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{EVENT}_BEGIN` on creation
//! - Logs `{EVENT}_COMPLETE` or `{EVENT}_FAILED` when closed explicitly
//! - Logs `{EVENT}_INCOMPLETE` if dropped without either

use std::cell::Cell;

use super::events::Event;
use super::logger::{Logger, Severity};

/// A scope around one primitive call
///
/// ```ignore
/// let scope = ObservationScope::new(&logger, Event::Commit);
/// match cursor.commit() {
///     Ok(()) => scope.complete(),
///     Err(e) => scope.fail(&e.to_string()),
/// }
/// ```
pub struct ObservationScope<'a> {
    logger: &'a Logger,
    event: Event,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    timer: Timer,
}

impl<'a> ObservationScope<'a> {
    /// Create a new observation scope, logging `{EVENT}_BEGIN`
    pub fn new(logger: &'a Logger, event: Event) -> Self {
        Self::with_fields(logger, event, &[])
    }

    /// Create a new observation scope whose fields repeat on every line
    pub fn with_fields(logger: &'a Logger, event: Event, fields: &[(&'a str, &str)]) -> Self {
        logger.info(format!("{}_BEGIN", event), fields);

        Self {
            logger,
            event,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        }
    }

    /// Mark the scope as successfully completed
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as successfully completed with additional fields
    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.timer.elapsed_ms();

        let mut all_fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all_fields.extend(extra_fields.iter().copied());
        all_fields.push(("elapsed_ms", &elapsed));

        self.logger
            .info(format!("{}_COMPLETE", self.event), &all_fields);
    }

    /// Mark the scope as failed, logging `{EVENT}_FAILED` at ERROR
    pub fn fail(self, reason: &str) {
        self.finish_failed(Severity::Error, reason);
    }

    /// Mark the scope as failed, logging `{EVENT}_FAILED` at FATAL
    pub fn fail_fatal(self, reason: &str) {
        self.finish_failed(Severity::Fatal, reason);
    }

    fn finish_failed(self, severity: Severity, reason: &str) {
        self.completed.set(true);
        let mut all_fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all_fields.push(("reason", reason));
        self.logger
            .log(severity, format!("{}_FAILED", self.event), &all_fields);
    }

    /// Check if the scope has been completed
    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            self.logger.warn(
                format!("{}_INCOMPLETE", self.event),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Get elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
