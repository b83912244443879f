//! Built-in suite runner
//!
//! Runs its tests in order, each under a root [`Recorder`], and keeps the
//! resulting reports for inspection or JSON export.

use serde::Serialize;
use tracing::{error, info};

use crate::common::Result;
use crate::env::Environment;
use crate::features::Feature;
use crate::report::{Recorder, Reporter, ScopeReport};

use super::Suite;

/// A test body: gets the environment and its root reporting scope
pub type TestFn = Box<dyn FnMut(&mut Environment, &mut dyn Reporter)>;

/// Counts of root test outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

/// Ordered list of named tests
#[derive(Default)]
pub struct TestSuite {
    tests: Vec<(String, TestFn)>,
    reports: Vec<ScopeReport>,
}

impl TestSuite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a test
    pub fn test<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&mut Environment, &mut dyn Reporter) + 'static,
    {
        self.tests.push((name.into(), Box::new(f)));
        self
    }

    /// Add a test that runs `feature` through [`Environment::test`]
    pub fn feature(self, name: impl Into<String>, feature: Feature) -> Self {
        self.test(name, move |env, t| env.test(t, &feature))
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Reports of the last run, one per test
    pub fn reports(&self) -> &[ScopeReport] {
        &self.reports
    }

    pub fn report(&self, name: &str) -> Option<&ScopeReport> {
        self.reports.iter().find(|r| r.name == name)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for report in &self.reports {
            if report.failed() {
                summary.failed += 1;
            } else if report.skipped() {
                summary.skipped += 1;
            } else {
                summary.passed += 1;
            }
        }
        summary
    }

    /// Reports of the last run as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct JsonReport<'a> {
            summary: Summary,
            tests: &'a [ScopeReport],
        }

        let json = serde_json::to_string_pretty(&JsonReport {
            summary: self.summary(),
            tests: &self.reports,
        })?;
        Ok(json)
    }
}

impl Suite for TestSuite {
    fn run(&mut self, env: &mut Environment) -> i32 {
        self.reports.clear();

        for (name, test) in self.tests.iter_mut() {
            let report = Recorder::new(name.as_str()).execute(|t| test(env, t));
            self.reports.push(report);
        }

        let summary = self.summary();
        if summary.failed > 0 {
            error!(
                passed = summary.passed,
                failed = summary.failed,
                skipped = summary.skipped,
                "FAIL"
            );
            1
        } else {
            info!(
                passed = summary.passed,
                skipped = summary.skipped,
                "ok"
            );
            0
        }
    }
}
