//! Suite runners
//!
//! A [`Suite`] is whatever discovers and executes the feature tests while
//! the environment holds the setup/finish bracket around it. [`TestSuite`]
//! is the built-in one: an ordered list of named tests, each recorded
//! under its own root scope.

mod suite;

pub use suite::{Summary, TestFn, TestSuite};

use crate::env::Environment;

/// Executes the tests of a suite and returns a process exit status
pub trait Suite {
    fn run(&mut self, env: &mut Environment) -> i32;
}

impl<F> Suite for F
where
    F: FnMut(&mut Environment) -> i32,
{
    fn run(&mut self, env: &mut Environment) -> i32 {
        self(env)
    }
}
