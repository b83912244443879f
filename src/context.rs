//! Execution context threaded through actions and steps
//!
//! A [`Context`] is immutable: every `with_*` call returns a new value and
//! leaves its parent untouched. Cloning is cheap (values are shared behind
//! `Arc`), so the environment hands a clone to each function and keeps the
//! returned context as its new current value.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::common::Error;

type Values = HashMap<String, Arc<dyn Any + Send + Sync>>;

/// Ambient state carried from one lifecycle function to the next
#[derive(Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
    values: Arc<Values>,
}

impl Context {
    /// Root context: no values, no deadline, never cancelled unless asked
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that also carries `key → value`
    ///
    /// An existing entry under `key` is shadowed in the child only.
    pub fn with_value<T>(&self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let mut values = Values::clone(&self.values);
        values.insert(key.into(), Arc::new(value));
        Self {
            token: self.token.clone(),
            deadline: self.deadline,
            values: Arc::new(values),
        }
    }

    /// Look up a value by key; `None` if absent or stored with another type
    pub fn value<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Derive a cancellable child
    ///
    /// Cancelling the returned token cancels the child (and its own
    /// descendants) but never this context.
    pub fn with_cancel(&self) -> (Self, CancellationToken) {
        let token = self.token.child_token();
        let child = Self {
            token: token.clone(),
            deadline: self.deadline,
            values: Arc::clone(&self.values),
        };
        (child, token)
    }

    /// Derive a child that expires at `deadline`, or earlier if this context does
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        };
        Self {
            token: self.token.clone(),
            deadline: Some(deadline),
            values: Arc::clone(&self.values),
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Why the context is done, if it is
    pub fn err(&self) -> Option<Error> {
        if self.token.is_cancelled() {
            Some(Error::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(Error::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline)
            .field("keys", &keys)
            .finish()
    }
}
