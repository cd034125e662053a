//! Replacing the server's repository set.
//!
//! The reset deletes every registered repository and then adds the requested
//! ones, one request at a time. It is not transactional. A request the server
//! rejects is logged and skipped so the remaining repositories still get
//! their turn; only a transport failure stops the routine.

use tracing::{info, instrument, warn};

use crate::client::{ApiResponse, TemplateApiClient};
use crate::errors::Result;
use crate::models::RepositoryDescriptor;

#[cfg(test)]
#[path = "reset_tests.rs"]
mod tests;

impl TemplateApiClient {
    /// Remove all template repositories known to the server and add `repos`
    /// in list order.
    ///
    /// Each delete and add completes before the next one starts. A non-2xx
    /// answer is logged at `warn` and the routine moves on to the next
    /// repository.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedStatus` when the current list cannot be read,
    /// and otherwise the first transport failure. Remaining requests are not
    /// sent in either case.
    #[instrument(skip(self, repos), fields(target_count = repos.len()))]
    pub async fn set_template_repos_to(&self, repos: &[RepositoryDescriptor]) -> Result<()> {
        let existing = self.list_template_repos().await?;

        info!(
            existing_count = existing.len(),
            target_count = repos.len(),
            "Replacing template repositories"
        );

        let mut rejected = 0;
        for repo in &existing {
            let response = self.delete_template_repo(&repo.url).await?;
            rejected += usize::from(!accepted("delete_template_repo", &repo.url, &response));
        }

        for repo in repos {
            let response = self.add_template_repo(repo).await?;
            rejected += usize::from(!accepted("add_template_repo", &repo.url, &response));
        }

        info!(
            repo_count = repos.len(),
            rejected_count = rejected,
            "Template repositories replaced"
        );
        Ok(())
    }
}

fn accepted(operation: &'static str, url: &str, response: &ApiResponse) -> bool {
    if response.is_success() {
        return true;
    }

    warn!(
        operation = operation,
        url = url,
        status = response.status().as_u16(),
        body = response.text(),
        "Server rejected request during reset, continuing"
    );
    false
}
