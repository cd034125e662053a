//! Test lifecycle helpers.
//!
//! A [`RepoFixture`] captures the server's repositories in its `before` hook
//! and puts them back in its `after` hook. The captured [`RepoSnapshot`] is
//! returned from `before` and handed to `after` by the caller, so no state is
//! hidden inside the fixture.
//!
//! [`TestSuite`] runs a list of async test cases with fixtures attached at
//! suite or per-test scope, enforcing each hook's timeout budget.
//!
//! ```rust,ignore
//! let client = Arc::new(TemplateApiClient::from_env()?);
//! let report = TestSuite::new("template styles", client)
//!     .with_fixture(SetupForTesting)
//!     .test("lists the Codewind style", |client| {
//!         Box::pin(async move {
//!             let styles: Vec<String> = client.get_template_styles().await?.json()?;
//!             assert_eq!(styles, vec!["Codewind".to_string()]);
//!             Ok(())
//!         })
//!     })
//!     .run()
//!     .await;
//! assert!(report.passed());
//! ```

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::client::TemplateApiClient;
use crate::config::TimeoutBudgets;
use crate::errors::{Error, Result};
use crate::fixtures::sample_repos;
use crate::models::RepositoryDescriptor;

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

/// Repositories registered on the server at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepoSnapshot {
    repos: Vec<RepositoryDescriptor>,
}

impl RepoSnapshot {
    /// Read the current repository list from the server.
    #[instrument(skip(client))]
    pub async fn capture(client: &TemplateApiClient) -> Result<Self> {
        let repos = client.list_template_repos().await?;
        info!(repo_count = repos.len(), "Captured template repositories");
        Ok(Self { repos })
    }

    pub fn repos(&self) -> &[RepositoryDescriptor] {
        &self.repos
    }

    /// Reset the server to the captured list.
    #[instrument(skip(self, client), fields(repo_count = self.repos.len()))]
    pub async fn restore(&self, client: &TemplateApiClient) -> Result<()> {
        client.set_template_repos_to(&self.repos).await
    }
}

/// When a fixture's hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookScope {
    /// Once before the first test and once after the last.
    Suite,
    /// Around every test.
    EachTest,
}

/// A pair of setup and teardown hooks around template API tests.
#[async_trait]
pub trait RepoFixture: Send + Sync {
    /// Name used in logs and timeout errors.
    fn name(&self) -> &str;

    /// Whether the hooks wrap the whole suite or every test.
    fn scope(&self) -> HookScope;

    /// Time each hook may take, chosen from the configured budgets.
    fn budget(&self, timeouts: &TimeoutBudgets) -> Duration;

    /// Prepare the server and return the state `after` should put back.
    async fn before(&self, client: &TemplateApiClient) -> Result<RepoSnapshot>;

    /// Put the server back to `snapshot`. Runs whenever `before` succeeded,
    /// including after a failing or panicking test.
    async fn after(&self, client: &TemplateApiClient, snapshot: RepoSnapshot) -> Result<()>;
}

/// Saves the repositories before and restores them afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveAndRestore {
    scope: HookScope,
}

impl SaveAndRestore {
    /// Snapshot before the suite, restore after it.
    pub fn per_suite() -> Self {
        Self {
            scope: HookScope::Suite,
        }
    }

    /// Snapshot before every test, restore after each one.
    pub fn per_test() -> Self {
        Self {
            scope: HookScope::EachTest,
        }
    }
}

#[async_trait]
impl RepoFixture for SaveAndRestore {
    fn name(&self) -> &str {
        match self.scope {
            HookScope::Suite => "save_and_restore_per_suite",
            HookScope::EachTest => "save_and_restore_per_test",
        }
    }

    fn scope(&self) -> HookScope {
        self.scope
    }

    fn budget(&self, timeouts: &TimeoutBudgets) -> Duration {
        timeouts.short
    }

    async fn before(&self, client: &TemplateApiClient) -> Result<RepoSnapshot> {
        RepoSnapshot::capture(client).await
    }

    async fn after(&self, client: &TemplateApiClient, snapshot: RepoSnapshot) -> Result<()> {
        snapshot.restore(client).await
    }
}

/// Replaces all repositories with the sample Codewind repository for the
/// duration of a suite, then restores the original set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetupForTesting;

#[async_trait]
impl RepoFixture for SetupForTesting {
    fn name(&self) -> &str {
        "setup_repos_and_templates_for_testing"
    }

    fn scope(&self) -> HookScope {
        HookScope::Suite
    }

    fn budget(&self, timeouts: &TimeoutBudgets) -> Duration {
        timeouts.med
    }

    async fn before(&self, client: &TemplateApiClient) -> Result<RepoSnapshot> {
        let snapshot = RepoSnapshot::capture(client).await?;
        client
            .set_template_repos_to(&[sample_repos::CODEWIND.to_descriptor()])
            .await?;
        Ok(snapshot)
    }

    async fn after(&self, client: &TemplateApiClient, snapshot: RepoSnapshot) -> Result<()> {
        snapshot.restore(client).await
    }
}

/// Future returned by a test case.
pub type TestFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

type TestFn = Box<dyn Fn(Arc<TemplateApiClient>) -> TestFuture + Send + Sync>;

/// Result of a single test case.
#[derive(Debug)]
pub struct TestOutcome {
    pub name: String,
    pub result: Result<()>,
}

/// Results of a [`TestSuite`] run.
#[derive(Debug)]
pub struct SuiteReport {
    pub suite: String,
    /// Failure of a suite-scoped `before` hook. Tests are skipped when set.
    pub setup_error: Option<Error>,
    pub outcomes: Vec<TestOutcome>,
    /// Failures of suite-scoped `after` hooks.
    pub teardown_errors: Vec<Error>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.setup_error.is_none()
            && self.teardown_errors.is_empty()
            && self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Names of the tests that failed.
    pub fn failures(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.name.as_str())
            .collect()
    }
}

/// An ordered list of test cases sharing a client and a set of fixtures.
///
/// Fixture `before` hooks run in registration order and `after` hooks in
/// reverse. An `after` hook runs whenever its `before` hook succeeded, even
/// if a test in between failed or panicked. Each test case runs on its own
/// task so that a failed assertion is reported as [`Error::TestPanicked`].
pub struct TestSuite {
    name: String,
    client: Arc<TemplateApiClient>,
    fixtures: Vec<Box<dyn RepoFixture>>,
    tests: Vec<(String, TestFn)>,
}

impl TestSuite {
    /// Create an empty suite whose tests share `client`.
    pub fn new(name: impl Into<String>, client: Arc<TemplateApiClient>) -> Self {
        Self {
            name: name.into(),
            client,
            fixtures: Vec::new(),
            tests: Vec::new(),
        }
    }

    /// Attach a fixture. Its scope decides whether it wraps the suite or
    /// each test.
    pub fn with_fixture(mut self, fixture: impl RepoFixture + 'static) -> Self {
        self.fixtures.push(Box::new(fixture));
        self
    }

    /// Register a test case. Cases run sequentially in registration order.
    pub fn test<F>(mut self, name: impl Into<String>, test: F) -> Self
    where
        F: Fn(Arc<TemplateApiClient>) -> TestFuture + Send + Sync + 'static,
    {
        self.tests.push((name.into(), Box::new(test)));
        self
    }

    /// Run every test case and report the results.
    #[instrument(skip(self), fields(suite = %self.name, test_count = self.tests.len()))]
    pub async fn run(self) -> SuiteReport {
        let mut report = SuiteReport {
            suite: self.name.clone(),
            setup_error: None,
            outcomes: Vec::with_capacity(self.tests.len()),
            teardown_errors: Vec::new(),
        };

        let suite_fixtures = self.fixtures_with_scope(HookScope::Suite);
        let each_fixtures = self.fixtures_with_scope(HookScope::EachTest);

        let mut suite_snapshots = Vec::new();
        for fixture in suite_fixtures {
            match self.run_before(fixture).await {
                Ok(snapshot) => suite_snapshots.push((fixture, snapshot)),
                Err(e) => {
                    error!(fixture = fixture.name(), error = %e, "Suite setup failed, skipping tests");
                    report.setup_error = Some(e);
                    break;
                }
            }
        }

        if report.setup_error.is_none() {
            for (name, test) in &self.tests {
                info!(test = name.as_str(), "Running test");
                let result = self.run_test(&each_fixtures, test).await;
                if let Err(e) = &result {
                    error!(test = name.as_str(), error = %e, "Test failed");
                }
                report.outcomes.push(TestOutcome {
                    name: name.clone(),
                    result,
                });
            }
        }

        for (fixture, snapshot) in suite_snapshots.into_iter().rev() {
            if let Err(e) = self.run_after(fixture, snapshot).await {
                error!(fixture = fixture.name(), error = %e, "Suite teardown failed");
                report.teardown_errors.push(e);
            }
        }

        report
    }

    fn fixtures_with_scope(&self, scope: HookScope) -> Vec<&dyn RepoFixture> {
        self.fixtures
            .iter()
            .filter(|f| f.scope() == scope)
            .map(|f| &**f)
            .collect()
    }

    async fn run_test(&self, fixtures: &[&dyn RepoFixture], test: &TestFn) -> Result<()> {
        let mut snapshots = Vec::with_capacity(fixtures.len());
        let mut result = Ok(());

        for fixture in fixtures {
            match self.run_before(*fixture).await {
                Ok(snapshot) => snapshots.push((*fixture, snapshot)),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        if result.is_ok() {
            result = run_case(test(Arc::clone(&self.client))).await;
        }

        for (fixture, snapshot) in snapshots.into_iter().rev() {
            let teardown = self.run_after(fixture, snapshot).await;
            // The first failure wins; teardown errors only surface for passing tests.
            if result.is_ok() {
                result = teardown;
            }
        }

        result
    }

    async fn run_before(&self, fixture: &dyn RepoFixture) -> Result<RepoSnapshot> {
        let budget = fixture.budget(self.client.timeouts());
        with_budget(
            format!("{}::before", fixture.name()),
            budget,
            fixture.before(&self.client),
        )
        .await
    }

    async fn run_after(&self, fixture: &dyn RepoFixture, snapshot: RepoSnapshot) -> Result<()> {
        let budget = fixture.budget(self.client.timeouts());
        with_budget(
            format!("{}::after", fixture.name()),
            budget,
            fixture.after(&self.client, snapshot),
        )
        .await
    }
}

async fn run_case(case: TestFuture) -> Result<()> {
    match tokio::spawn(case).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(Error::TestPanicked {
            message: panic_message(e.into_panic()),
        }),
        Err(e) => Err(Error::TestPanicked {
            message: e.to_string(),
        }),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}

/// Await `hook`, failing with `Error::HookTimedOut` once `budget` elapses.
pub async fn with_budget<T, F>(hook: String, budget: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::HookTimedOut { hook, budget }),
    }
}
