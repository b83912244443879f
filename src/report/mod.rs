//! Hierarchical test reporting
//!
//! [`Reporter`] is the handle a step receives: it opens named sub-scopes,
//! records failures and skips, and can abort the scope it belongs to.
//! [`Recorder`] is the built-in implementation that keeps a tree of
//! [`ScopeReport`]s.
//!
//! `fatal` and `skip` stop the running scope immediately. They do so by
//! unwinding with a private marker that the enclosing [`guard`] absorbs, so
//! any code after them in the same scope never runs.

mod recorder;

pub use recorder::{Outcome, Recorder, ScopeReport};

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

/// Unwind payload used by `fatal` and `skip`
struct ScopeAbort;

/// Text of a panic that escaped a scope
///
/// Payloads raised by `panic!` with a message keep that message; any other
/// payload type gets a fixed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicMessage(String);

impl PanicMessage {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let text = match payload.downcast::<String>() {
            Ok(text) => *text,
            Err(payload) => match payload.downcast_ref::<&'static str>() {
                Some(text) => (*text).to_string(),
                None => "non-string panic payload".to_string(),
            },
        };
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reporting scope (one test, feature or assessment)
pub trait Reporter {
    /// Name of this scope
    fn name(&self) -> &str;

    /// Run `body` synchronously in a nested scope named `name`
    ///
    /// Returns `false` if the nested scope failed. A failing nested scope
    /// also fails this one.
    fn run(&mut self, name: &str, body: &mut dyn FnMut(&mut dyn Reporter)) -> bool;

    /// Record an informational message
    fn log(&mut self, message: String);

    /// Record a failure and keep going
    fn error(&mut self, message: String);

    /// Record that this scope was skipped
    fn mark_skipped(&mut self, reason: String);

    fn failed(&self) -> bool;

    fn skipped(&self) -> bool;

    /// Record a failure and stop this scope
    fn fatal(&mut self, message: String) -> ! {
        self.error(message);
        resume_unwind(Box::new(ScopeAbort))
    }

    /// Mark this scope skipped and stop it
    fn skip(&mut self, reason: String) -> ! {
        self.mark_skipped(reason);
        resume_unwind(Box::new(ScopeAbort))
    }
}

/// Run `body`, absorbing scope aborts
///
/// Returns `Ok(())` when the body finished or stopped through
/// [`Reporter::fatal`] / [`Reporter::skip`], and the panic message for any
/// other panic.
pub fn guard<F>(body: F) -> Result<(), PanicMessage>
where
    F: FnOnce(),
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(()) => Ok(()),
        Err(payload) if payload.is::<ScopeAbort>() => Ok(()),
        Err(payload) => Err(PanicMessage::from_payload(payload)),
    }
}
