//! Test environment: lifecycle actions around feature tests
//!
//! An [`Environment`] owns the current [`Context`], a shared [`Config`] and
//! the actions registered on it. [`Environment::run`] brackets a whole suite
//! with setup and finish actions; [`Environment::test`] brackets a single
//! feature with before and after actions and runs the feature's steps.
//!
//! Setup, before and after actions are fail-fast: the first error stops
//! the batch. Finish actions are best-effort: an error is logged and the
//! next finish action still runs.

mod action;
pub mod filter;

pub use action::{func, Action, ActionFailure, ActionRole, EnvFunc};

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::common::{Config, Error, Result};
use crate::context::Context;
use crate::features::{steps_by_level, Feature, Level};
use crate::report::Reporter;
use crate::testing::Suite;

use action::by_role;

/// Orchestrates actions and feature execution for one suite
#[derive(Debug, Clone)]
pub struct Environment {
    ctx: Context,
    cfg: Arc<Config>,
    actions: Vec<Action>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Environment with a background context and an empty configuration
    pub fn new() -> Self {
        Self::with_config(Config::new())
    }

    pub fn with_config(cfg: Config) -> Self {
        Self::with_context_and_config(Context::background(), Arc::new(cfg))
    }

    pub fn with_context_and_config(ctx: Context, cfg: Arc<Config>) -> Self {
        Self {
            ctx,
            cfg,
            actions: Vec::new(),
        }
    }

    /// Derive an environment that starts from `ctx`
    ///
    /// The derived environment shares the configuration and gets its own
    /// copy of the registered actions; `self` is left unchanged.
    pub fn with_context(&self, ctx: Context) -> Self {
        Self {
            ctx,
            cfg: Arc::clone(&self.cfg),
            actions: self.actions.clone(),
        }
    }

    /// The current context
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn register<I>(&mut self, role: ActionRole, funcs: I) -> &mut Self
    where
        I: IntoIterator<Item = EnvFunc>,
    {
        let funcs: Vec<EnvFunc> = funcs.into_iter().collect();
        if funcs.is_empty() {
            return self;
        }
        self.actions.push(Action::new(role, funcs));
        self
    }

    /// Register functions to run once before the suite
    pub fn setup<I>(&mut self, funcs: I) -> &mut Self
    where
        I: IntoIterator<Item = EnvFunc>,
    {
        self.register(ActionRole::Setup, funcs)
    }

    /// Register functions to run before every feature test
    pub fn before_test<I>(&mut self, funcs: I) -> &mut Self
    where
        I: IntoIterator<Item = EnvFunc>,
    {
        self.register(ActionRole::Before, funcs)
    }

    /// Register functions to run after every feature test
    pub fn after_test<I>(&mut self, funcs: I) -> &mut Self
    where
        I: IntoIterator<Item = EnvFunc>,
    {
        self.register(ActionRole::After, funcs)
    }

    /// Register functions to run once after the suite
    pub fn finish<I>(&mut self, funcs: I) -> &mut Self
    where
        I: IntoIterator<Item = EnvFunc>,
    {
        self.register(ActionRole::Finish, funcs)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn setup_actions(&self) -> Vec<&Action> {
        by_role(&self.actions, ActionRole::Setup).collect()
    }

    pub fn before_actions(&self) -> Vec<&Action> {
        by_role(&self.actions, ActionRole::Before).collect()
    }

    pub fn after_actions(&self) -> Vec<&Action> {
        by_role(&self.actions, ActionRole::After).collect()
    }

    pub fn finish_actions(&self) -> Vec<&Action> {
        by_role(&self.actions, ActionRole::Finish).collect()
    }

    /// Run a suite between the setup and finish actions
    ///
    /// Setup actions run in order and the first failure is returned as
    /// [`Error::SetupFailed`] without running the suite or any finish
    /// action. Otherwise the suite runs, then every finish action runs even
    /// if an earlier one failed. The suite's exit status is returned as is.
    pub fn run<S>(&mut self, suite: &mut S) -> Result<i32>
    where
        S: Suite + ?Sized,
    {
        for (index, action) in by_role(&self.actions, ActionRole::Setup).enumerate() {
            match action.run(self.ctx.clone(), &self.cfg) {
                Ok(ctx) => self.ctx = ctx,
                Err(failure) => {
                    error!(
                        index,
                        step = failure.step,
                        error = %failure.error,
                        "setup failed, aborting suite"
                    );
                    self.ctx = failure.context;
                    return Err(Error::setup_failed(index, failure.error));
                }
            }
        }

        let exit_code = suite.run(self);
        debug!(exit_code, "suite finished");

        for (index, action) in by_role(&self.actions, ActionRole::Finish).enumerate() {
            match action.run(self.ctx.clone(), &self.cfg) {
                Ok(ctx) => self.ctx = ctx,
                Err(failure) => {
                    warn!(
                        index,
                        step = failure.step,
                        error = %failure.error,
                        "finish action failed"
                    );
                    self.ctx = failure.context;
                }
            }
        }

        Ok(exit_code)
    }

    /// Run a suite and exit the process with its status
    ///
    /// A setup failure exits with status 1; `run` has already logged it.
    pub fn run_and_exit<S>(&mut self, suite: &mut S) -> !
    where
        S: Suite + ?Sized,
    {
        match self.run(suite) {
            Ok(code) => std::process::exit(code),
            Err(_) => std::process::exit(1),
        }
    }

    /// Test one feature from within a test scope
    ///
    /// Before actions run first, then the feature as a sub-scope of `t`,
    /// then the after actions. A before or after failure is fatal for `t`.
    /// Setup and teardown steps run directly in the feature scope; every
    /// assessment gets its own nested scope.
    pub fn test(&mut self, t: &mut dyn Reporter, feature: &Feature) {
        for action in by_role(&self.actions, ActionRole::Before) {
            match action.run(self.ctx.clone(), &self.cfg) {
                Ok(ctx) => self.ctx = ctx,
                Err(failure) => {
                    self.ctx = failure.context;
                    t.fatal(format!(
                        "BeforeTest failure: {}: {}",
                        feature.name(),
                        failure.error
                    ));
                }
            }
        }

        self.ctx = self.exec_feature(self.ctx.clone(), t, feature);

        for action in by_role(&self.actions, ActionRole::After) {
            match action.run(self.ctx.clone(), &self.cfg) {
                Ok(ctx) => self.ctx = ctx,
                Err(failure) => {
                    self.ctx = failure.context;
                    t.fatal(format!(
                        "AfterTest failure: {}: {}",
                        feature.name(),
                        failure.error
                    ));
                }
            }
        }
    }

    fn exec_feature(&self, ctx: Context, t: &mut dyn Reporter, feature: &Feature) -> Context {
        let cfg: &Config = &self.cfg;
        let feat_name = feature.name();
        let mut ctx = ctx;

        t.run(feat_name, &mut |t: &mut dyn Reporter| {
            if !filter::matches(cfg.feature_regex(), feat_name) {
                info!(feature = feat_name, "feature filtered out");
                t.skip(format!(r#"Skipping feature "{}": name not matched"#, feat_name));
            }

            for setup in steps_by_level(feature.steps(), Level::Setup) {
                ctx = setup.call(ctx.clone(), t, cfg);
            }

            for assess in steps_by_level(feature.steps(), Level::Assess) {
                t.run(assess.name(), &mut |t: &mut dyn Reporter| {
                    if !filter::matches(cfg.assessment_regex(), assess.name()) {
                        t.skip(format!(
                            r#"Skipping assessment "{}": name not matched"#,
                            assess.name()
                        ));
                    }
                    ctx = assess.call(ctx.clone(), t, cfg);
                });
            }

            for teardown in steps_by_level(feature.steps(), Level::Teardown) {
                ctx = teardown.call(ctx.clone(), t, cfg);
            }
        });

        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Recorder;
    use tracing_test::traced_test;

    fn noop() -> EnvFunc {
        func(|ctx, _cfg| Ok(ctx))
    }

    #[test]
    fn test_empty_registration_is_noop() {
        let mut env = Environment::new();
        env.setup(Vec::new())
            .before_test(Vec::new())
            .after_test(Vec::new())
            .finish(Vec::new());
        assert!(env.actions().is_empty());
        assert!(env.setup_actions().is_empty());
    }

    #[test]
    fn test_registration_appends_one_action() {
        let mut env = Environment::new();
        env.setup([noop(), noop()]).finish([noop()]).setup([noop()]);

        assert_eq!(env.actions().len(), 3);
        let setups = env.setup_actions();
        assert_eq!(setups.len(), 2);
        assert_eq!(setups[0].len(), 2);
        assert_eq!(setups[1].len(), 1);
        assert_eq!(env.finish_actions().len(), 1);
        assert!(env.before_actions().is_empty());
    }

    #[test]
    fn test_role_filtering_is_stable() {
        let mut env = Environment::new();
        env.setup([noop()]).after_test([noop()]).setup([noop()]);
        assert_eq!(env.setup_actions(), env.setup_actions());
    }

    #[test]
    fn test_with_context_copies_actions() {
        let mut env = Environment::new();
        env.setup([noop()]).before_test([noop()]);

        let mut derived = env.with_context(Context::background().with_value("k", 1_u8));
        derived.finish([noop()]);

        assert_eq!(derived.setup_actions(), env.setup_actions());
        assert_eq!(derived.actions().len(), 3);
        assert_eq!(env.actions().len(), 2);
        assert!(env.context().value::<u8>("k").is_none());
        assert_eq!(derived.context().value::<u8>("k"), Some(&1));
    }

    #[test]
    fn test_feature_context_threads_into_after() {
        let mut env = Environment::new();
        env.after_test([func(|ctx, _cfg| {
            let seen = ctx.value::<&str>("from").copied().unwrap_or("nothing");
            Ok(ctx.with_value("after saw", seen))
        })]);

        let feature = crate::features::FeatureBuilder::new("threading")
            .assess("mark", |ctx, _t, _cfg| ctx.with_value("from", "assess"))
            .feature();

        let report = Recorder::new("TestThreading").execute(|t| env.test(t, &feature));
        assert!(report.passed());
        assert_eq!(env.context().value::<&str>("after saw"), Some(&"assess"));
    }

    #[test]
    #[traced_test]
    fn test_setup_failure_logged_once_with_step() {
        let mut env = Environment::new();
        env.setup([noop(), func(|_ctx, _cfg| Err(Error::action("no cluster")))]);

        let err = env.run(&mut |_env: &mut Environment| 0).unwrap_err();
        assert!(matches!(err, Error::SetupFailed { index: 0, .. }));

        logs_assert(|lines: &[&str]| {
            let failures: Vec<_> = lines
                .iter()
                .filter(|line| line.contains("setup failed, aborting suite"))
                .collect();
            match failures.as_slice() {
                [line] if line.contains("step=1") && line.contains("no cluster") => Ok(()),
                other => Err(format!("expected one setup failure event, got {:?}", other)),
            }
        });
    }

    #[test]
    #[traced_test]
    fn test_finish_failure_logs_step() {
        let mut env = Environment::new();
        env.finish([noop()]);
        env.finish([noop(), noop(), func(|_ctx, _cfg| Err(Error::action("leaked volume")))]);

        assert_eq!(env.run(&mut |_env: &mut Environment| 0).unwrap(), 0);

        logs_assert(|lines: &[&str]| {
            lines
                .iter()
                .find(|line| {
                    line.contains("finish action failed")
                        && line.contains("index=1")
                        && line.contains("step=2")
                })
                .map(|_| ())
                .ok_or_else(|| "finish failure log not found".to_string())
        });
    }
}
