//! Features and their leveled steps
//!
//! A [`Feature`] is a named, ordered list of [`Step`]s. Each step sits at a
//! [`Level`]: setup steps prepare the feature, assessments check it, and
//! teardown steps clean up after it.

mod builder;

pub use builder::FeatureBuilder;

use std::fmt;
use std::sync::Arc;

use crate::common::Config;
use crate::context::Context;
use crate::report::Reporter;

/// Position of a step within a feature's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Setup,
    Assess,
    Teardown,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Setup => "setup",
            Level::Assess => "assess",
            Level::Teardown => "teardown",
        };
        f.write_str(s)
    }
}

/// Function run by a feature step
///
/// Steps report failure through the [`Reporter`] rather than a return
/// value; the returned context feeds the next step.
pub type StepFunc = Arc<dyn Fn(Context, &mut dyn Reporter, &Config) -> Context + Send + Sync>;

/// A single named unit of work within a feature
#[derive(Clone)]
pub struct Step {
    name: String,
    level: Level,
    func: StepFunc,
}

impl Step {
    pub fn new<F>(name: impl Into<String>, level: Level, func: F) -> Self
    where
        F: Fn(Context, &mut dyn Reporter, &Config) -> Context + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            level,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Invoke the step function
    pub fn call(&self, ctx: Context, t: &mut dyn Reporter, cfg: &Config) -> Context {
        (self.func)(ctx, t, cfg)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// A named scenario made of leveled steps
#[derive(Debug, Clone)]
pub struct Feature {
    name: String,
    steps: Vec<Step>,
}

impl Feature {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// Steps at `level`, in declaration order
pub fn steps_by_level(steps: &[Step], level: Level) -> Vec<&Step> {
    steps.iter().filter(|s| s.level == level).collect()
}
