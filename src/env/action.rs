//! Lifecycle actions registered on an environment

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::common::{Config, Error, Result};
use crate::context::Context;

/// Function run by an environment action
pub type EnvFunc = Arc<dyn Fn(Context, &Config) -> Result<Context> + Send + Sync>;

/// Wrap a closure as an [`EnvFunc`]
pub fn func<F>(f: F) -> EnvFunc
where
    F: Fn(Context, &Config) -> Result<Context> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// When an action runs and how its failure is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionRole {
    /// Once before the suite; failure aborts the suite
    Setup,
    /// Before each feature test; failure fails that test
    Before,
    /// After each feature test; failure fails that test
    After,
    /// Once after the suite; failure is logged and the next finish runs
    Finish,
}

impl fmt::Display for ActionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionRole::Setup => "setup",
            ActionRole::Before => "before-test",
            ActionRole::After => "after-test",
            ActionRole::Finish => "finish",
        };
        f.write_str(s)
    }
}

/// An ordered batch of functions sharing one role
#[derive(Clone)]
pub struct Action {
    role: ActionRole,
    funcs: Vec<EnvFunc>,
}

/// An action stopped at a failing function
///
/// `context` is the last context successfully produced before the failure.
#[derive(Debug)]
pub struct ActionFailure {
    pub context: Context,
    /// Zero-based position of the failing function in the action
    pub step: usize,
    pub error: Error,
}

impl Action {
    pub(crate) fn new(role: ActionRole, funcs: Vec<EnvFunc>) -> Self {
        Self { role, funcs }
    }

    pub fn role(&self) -> ActionRole {
        self.role
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Run every function in order, feeding each the previous one's context
    ///
    /// Stops at the first error; later functions do not run.
    pub fn run(&self, ctx: Context, cfg: &Config) -> std::result::Result<Context, ActionFailure> {
        let mut ctx = ctx;
        for (step, f) in self.funcs.iter().enumerate() {
            debug!(role = %self.role, step, "running action function");
            match f(ctx.clone(), cfg) {
                Ok(next) => ctx = next,
                Err(error) => {
                    return Err(ActionFailure {
                        context: ctx,
                        step,
                        error,
                    })
                }
            }
        }
        Ok(ctx)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("role", &self.role)
            .field("funcs", &self.funcs.len())
            .finish()
    }
}

impl PartialEq for Action {
    /// Same role and the very same functions, in the same order
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role
            && self.funcs.len() == other.funcs.len()
            && self
                .funcs
                .iter()
                .zip(&other.funcs)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

/// Actions with the given role, in registration order
pub(crate) fn by_role(actions: &[Action], role: ActionRole) -> impl Iterator<Item = &Action> {
    actions.iter().filter(move |a| a.role == role)
}
