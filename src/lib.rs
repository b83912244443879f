//! Feature-oriented end-to-end test orchestration
//!
//! An [`Environment`] sequences setup, before-test, after-test and finish
//! actions around a suite of [`Feature`]s, threading one [`Context`] through
//! every action and step. Features run as nested reporting scopes whose
//! names can be filtered by regular expression.
//!
//! ```
//! use e2e::{func, Environment, FeatureBuilder, TestSuite};
//!
//! let mut env = Environment::new();
//! env.setup([func(|ctx, _cfg| Ok(ctx.with_value("cluster", "kind")))]);
//!
//! let feature = FeatureBuilder::new("cluster")
//!     .assess("is named", |ctx, _t, _cfg| ctx)
//!     .feature();
//!
//! let mut suite = TestSuite::new().feature("TestCluster", feature);
//! assert_eq!(env.run(&mut suite).unwrap(), 0);
//! ```

pub mod common;
pub mod context;
pub mod env;
pub mod features;
pub mod report;
pub mod testing;

pub use common::{logging, Config, Error, Result};
pub use context::Context;
pub use env::{func, Action, ActionRole, EnvFunc, Environment};
pub use features::{Feature, FeatureBuilder, Level, Step};
pub use report::{Recorder, Reporter, ScopeReport};
pub use testing::{Suite, TestSuite};
