//! Fluent construction of features

use crate::common::Config;
use crate::context::Context;
use crate::report::Reporter;

use super::{Feature, Level, Step};

/// Builds a [`Feature`] one step at a time
///
/// ```
/// use e2e::features::FeatureBuilder;
/// use e2e::report::Reporter;
///
/// let feature = FeatureBuilder::new("pods")
///     .setup(|ctx, _t, _cfg| ctx.with_value("pod", "nginx"))
///     .assess("pod is named", |ctx, t, _cfg| {
///         if ctx.value::<&str>("pod") != Some(&"nginx") {
///             t.error("unexpected pod".to_string());
///         }
///         ctx
///     })
///     .teardown(|ctx, _t, _cfg| ctx)
///     .feature();
///
/// assert_eq!(feature.name(), "pods");
/// assert_eq!(feature.steps().len(), 3);
/// ```
#[derive(Debug)]
pub struct FeatureBuilder {
    name: String,
    steps: Vec<Step>,
}

impl FeatureBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Add an unnamed setup step
    pub fn setup<F>(self, func: F) -> Self
    where
        F: Fn(Context, &mut dyn Reporter, &Config) -> Context + Send + Sync + 'static,
    {
        let name = format!("{}-setup", self.name);
        self.with_setup(name, func)
    }

    pub fn with_setup<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Context, &mut dyn Reporter, &Config) -> Context + Send + Sync + 'static,
    {
        self.step(Step::new(name, Level::Setup, func))
    }

    /// Add an assessment; its name is what the assessment filter matches
    pub fn assess<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Context, &mut dyn Reporter, &Config) -> Context + Send + Sync + 'static,
    {
        self.step(Step::new(name, Level::Assess, func))
    }

    /// Add an unnamed teardown step
    pub fn teardown<F>(self, func: F) -> Self
    where
        F: Fn(Context, &mut dyn Reporter, &Config) -> Context + Send + Sync + 'static,
    {
        let name = format!("{}-teardown", self.name);
        self.with_teardown(name, func)
    }

    pub fn with_teardown<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Context, &mut dyn Reporter, &Config) -> Context + Send + Sync + 'static,
    {
        self.step(Step::new(name, Level::Teardown, func))
    }

    /// Append a prebuilt step
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn feature(self) -> Feature {
        Feature::new(self.name, self.steps)
    }
}
