//! Test client for the template repository management API.
//!
//! This crate wraps an HTTP client around the template endpoints of the API
//! server so that integration tests can list, add, delete, enable and disable
//! template repositories, query templates and template styles, and put the
//! server back into the state it was in before a test ran.
//!
//! # Example
//!
//! ```no_run
//! use template_repo_client::{TemplateApiClient, fixtures::sample_repos};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TemplateApiClient::from_env()?;
//!
//! client
//!     .set_template_repos_to(&[sample_repos::CODEWIND.to_descriptor()])
//!     .await?;
//! let count = client.get_number_of_enabled_templates(&[]).await?;
//! println!("{count} enabled templates");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod fixtures;
pub mod lifecycle;
pub mod models;
mod reset;

pub use client::{ApiResponse, TemplateApiClient};
pub use config::{ClientConfig, TimeoutBudgets};
pub use errors::{Error, Result};
pub use lifecycle::{
    HookScope, RepoFixture, RepoSnapshot, SaveAndRestore, SetupForTesting, SuiteReport,
    TestFuture, TestOutcome, TestSuite,
};
pub use models::{BatchOperation, IndexEntry, PatchOp, RepositoryDescriptor, TemplateDescriptor};

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call from several tests; only the first call installs a subscriber.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_test_writer()
        .try_init();
}
