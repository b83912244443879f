//! In-memory reporter producing a tree of scope results

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info};

use super::{guard, Reporter};

/// Final state of a scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped { reason: String },
}

/// Result of one scope and everything nested in it
#[derive(Debug, Clone, Serialize)]
pub struct ScopeReport {
    pub name: String,
    /// Slash-joined names from the root scope down to this one
    pub path: String,
    pub outcome: Outcome,
    /// Log and failure messages in the order they were recorded
    pub messages: Vec<String>,
    pub elapsed_ms: u64,
    pub children: Vec<ScopeReport>,
}

impl ScopeReport {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    pub fn failed(&self) -> bool {
        self.outcome == Outcome::Failed
    }

    pub fn skipped(&self) -> bool {
        matches!(self.outcome, Outcome::Skipped { .. })
    }

    /// Direct child by name
    pub fn child(&self, name: &str) -> Option<&ScopeReport> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Descendant by slash-separated path relative to this scope
    ///
    /// Names are matched whole against the front of the path, so a scope
    /// whose own name contains `/` is still found.
    pub fn find(&self, path: &str) -> Option<&ScopeReport> {
        self.children
            .iter()
            .find_map(|child| match path.strip_prefix(child.name.as_str())? {
                "" => Some(child),
                rest => child.find(rest.strip_prefix('/')?),
            })
    }
}

/// Reporter that records every scope it runs
#[derive(Debug)]
pub struct Recorder {
    name: String,
    path: String,
    failed: bool,
    skip_reason: Option<String>,
    messages: Vec<String>,
    children: Vec<ScopeReport>,
}

impl Recorder {
    /// Create a root scope
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            failed: false,
            skip_reason: None,
            messages: Vec::new(),
            children: Vec::new(),
        }
    }

    fn child(&self, name: &str) -> Self {
        Self {
            path: format!("{}/{}", self.path, name),
            ..Self::new(name)
        }
    }

    /// Run `body` in this scope and produce its report
    pub fn execute<F>(mut self, body: F) -> ScopeReport
    where
        F: FnOnce(&mut dyn Reporter),
    {
        debug!(scope = %self.path, "=== RUN");
        let started = Instant::now();

        if let Err(panic) = guard(|| body(&mut self)) {
            self.error(format!("panicked: {}", panic));
        }

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let outcome = match (self.failed, self.skip_reason.take()) {
            (true, _) => Outcome::Failed,
            (false, Some(reason)) => Outcome::Skipped { reason },
            (false, None) => Outcome::Passed,
        };

        match &outcome {
            Outcome::Passed => info!(scope = %self.path, elapsed_ms, "--- PASS"),
            Outcome::Failed => error!(scope = %self.path, elapsed_ms, "--- FAIL"),
            Outcome::Skipped { reason } => info!(scope = %self.path, %reason, "--- SKIP"),
        }

        ScopeReport {
            name: self.name,
            path: self.path,
            outcome,
            messages: self.messages,
            elapsed_ms,
            children: self.children,
        }
    }
}

impl Reporter for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, name: &str, body: &mut dyn FnMut(&mut dyn Reporter)) -> bool {
        let report = self.child(name).execute(|t| body(t));
        let passed = !report.failed();
        if !passed {
            self.failed = true;
        }
        self.children.push(report);
        passed
    }

    fn log(&mut self, message: String) {
        debug!(scope = %self.path, "{}", message);
        self.messages.push(message);
    }

    fn error(&mut self, message: String) {
        error!(scope = %self.path, "{}", message);
        self.failed = true;
        self.messages.push(message);
    }

    fn mark_skipped(&mut self, reason: String) {
        self.skip_reason = Some(reason);
    }

    fn failed(&self) -> bool {
        self.failed
    }

    fn skipped(&self) -> bool {
        self.skip_reason.is_some()
    }
}
