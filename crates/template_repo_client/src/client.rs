//! HTTP client for the template repository API.
//!
//! Every helper maps to exactly one request against a fixed endpoint. Mutation
//! and list helpers hand back the raw [`ApiResponse`] so that tests can assert
//! on status and body themselves; only the count helpers and
//! [`TemplateApiClient::list_template_repos`] interpret status codes.

use reqwest::{Client, Method, RequestBuilder, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::{ClientConfig, TimeoutBudgets};
use crate::errors::{Error, Result};
use crate::fixtures::DEFAULT_TEMPLATES_SOURCE;
use crate::models::{
    BatchOperation, DeleteRepositoryRequest, IndexEntry, RepositoryDescriptor, TemplateDescriptor,
};

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

pub const TEMPLATE_REPOSITORIES_PATH: &str = "/api/v1/templates/repositories";
pub const BATCH_TEMPLATE_REPOSITORIES_PATH: &str = "/api/v1/batch/templates/repositories";
pub const TEMPLATES_PATH: &str = "/api/v1/templates";
pub const ENABLED_TEMPLATES_PATH: &str = "/api/v1/templates/?showEnabledOnly=true";
pub const TEMPLATE_STYLES_PATH: &str = "/api/v1/templates/styles";

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    /// Wrap a status code and body text received from the server.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Raw body text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Client for the template repository endpoints.
///
/// Requests against the API carry the configured admin cookie; the remote
/// index fetch does not.
#[derive(Debug)]
pub struct TemplateApiClient {
    http: Client,
    base_url: Url,
    admin_cookie: SecretString,
    index_url: Url,
    timeouts: TimeoutBudgets,
}

impl TemplateApiClient {
    /// Create a client from the given configuration.
    ///
    /// Endpoint paths are resolved below `config.base_url`, so a base URL
    /// with a path prefix such as `http://host/pfe` keeps that prefix.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.http_timeout).build()?;

        Ok(Self {
            http,
            base_url: as_directory(config.base_url),
            admin_cookie: config.admin_cookie,
            index_url: config.index_url,
            timeouts: config.timeouts,
        })
    }

    /// Create a client configured from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Base URL with a trailing slash; endpoint paths are joined onto it.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn index_url(&self) -> &Url {
        &self.index_url
    }

    /// Hook timeout budgets configured for this client.
    pub fn timeouts(&self) -> &TimeoutBudgets {
        &self.timeouts
    }

    /// GET the list of registered template repositories.
    #[instrument(skip(self))]
    pub async fn get_template_repos(&self) -> Result<ApiResponse> {
        let request = self.admin_request(Method::GET, TEMPLATE_REPOSITORIES_PATH)?;
        self.send("get_template_repos", request).await
    }

    /// Fetch and decode the registered template repositories.
    ///
    /// A 204 response or an empty body is an empty list.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedStatus` for any other non-success status.
    pub async fn list_template_repos(&self) -> Result<Vec<RepositoryDescriptor>> {
        let response = self.get_template_repos().await?;
        decode_repository_list(&response)
    }

    /// POST a repository descriptor.
    #[instrument(skip(self, repo), fields(url = %repo.url))]
    pub async fn add_template_repo(&self, repo: &RepositoryDescriptor) -> Result<ApiResponse> {
        let request = self
            .admin_request(Method::POST, TEMPLATE_REPOSITORIES_PATH)?
            .json(repo);
        self.send("add_template_repo", request).await
    }

    /// DELETE the repository registered under `repo_url`.
    #[instrument(skip(self))]
    pub async fn delete_template_repo(&self, repo_url: &str) -> Result<ApiResponse> {
        let body = DeleteRepositoryRequest {
            url: repo_url.to_string(),
        };
        let request = self
            .admin_request(Method::DELETE, TEMPLATE_REPOSITORIES_PATH)?
            .json(&body);
        self.send("delete_template_repo", request).await
    }

    /// PATCH a batch of operations in a single request, preserving their order.
    #[instrument(skip(self, operations), fields(operation_count = operations.len()))]
    pub async fn batch_patch_template_repos(
        &self,
        operations: &[BatchOperation],
    ) -> Result<ApiResponse> {
        let request = self
            .admin_request(Method::PATCH, BATCH_TEMPLATE_REPOSITORIES_PATH)?
            .json(operations);
        self.send("batch_patch_template_repos", request).await
    }

    /// Enable every repository in `repo_urls` in one batch.
    pub async fn enable_template_repos<S: AsRef<str>>(
        &self,
        repo_urls: &[S],
    ) -> Result<ApiResponse> {
        let operations = BatchOperation::enable_all(repo_urls.iter().map(|u| u.as_ref()), true);
        self.batch_patch_template_repos(&operations).await
    }

    /// Disable every repository in `repo_urls` in one batch.
    pub async fn disable_template_repos<S: AsRef<str>>(
        &self,
        repo_urls: &[S],
    ) -> Result<ApiResponse> {
        let operations = BatchOperation::enable_all(repo_urls.iter().map(|u| u.as_ref()), false);
        self.batch_patch_template_repos(&operations).await
    }

    /// GET all templates. Query parameters are passed through unchanged.
    #[instrument(skip(self))]
    pub async fn get_templates(&self, query: &[(&str, &str)]) -> Result<ApiResponse> {
        let request = with_query(self.admin_request(Method::GET, TEMPLATES_PATH)?, query);
        self.send("get_templates", request).await
    }

    /// GET templates of enabled repositories only.
    #[instrument(skip(self))]
    pub async fn get_enabled_templates(&self, query: &[(&str, &str)]) -> Result<ApiResponse> {
        let request = with_query(
            self.admin_request(Method::GET, ENABLED_TEMPLATES_PATH)?,
            query,
        );
        self.send("get_enabled_templates", request).await
    }

    /// Count all templates: 204 is zero, 200 is the length of the body.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedStatus` for any other status code.
    pub async fn get_number_of_templates(&self, query: &[(&str, &str)]) -> Result<usize> {
        let response = self.get_templates(query).await?;
        count_templates("get_number_of_templates", &response)
    }

    /// Count templates of enabled repositories, with the same status handling
    /// as [`Self::get_number_of_templates`].
    pub async fn get_number_of_enabled_templates(&self, query: &[(&str, &str)]) -> Result<usize> {
        let response = self.get_enabled_templates(query).await?;
        count_templates("get_number_of_enabled_templates", &response)
    }

    /// GET the distinct project styles known to the server.
    #[instrument(skip(self))]
    pub async fn get_template_styles(&self) -> Result<ApiResponse> {
        let request = self.admin_request(Method::GET, TEMPLATE_STYLES_PATH)?;
        self.send("get_template_styles", request).await
    }

    /// Fetch the remote template index and reshape it into template records.
    ///
    /// Each entry is tagged with `source = "Default templates"` and
    /// `sourceURL` set to the index location.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexFetch` unless the index answers 200 OK, and
    /// `Error::Deserialization` if the body is not an array of index entries.
    #[instrument(skip(self), fields(index_url = %self.index_url))]
    pub async fn get_default_templates_from_github(&self) -> Result<Vec<TemplateDescriptor>> {
        let request = self.http.get(self.index_url.clone());
        let response = self.send("get_default_templates_from_github", request).await?;

        if response.status() != StatusCode::OK {
            return Err(Error::IndexFetch {
                url: self.index_url.to_string(),
                status: response.status(),
            });
        }

        let entries: Vec<IndexEntry> = response.json()?;
        let source_url = self.index_url.as_str();
        let templates: Vec<TemplateDescriptor> = entries
            .into_iter()
            .map(|entry| entry.into_template(DEFAULT_TEMPLATES_SOURCE, source_url))
            .collect();

        info!(
            template_count = templates.len(),
            "Parsed templates from remote index"
        );
        Ok(templates)
    }

    fn admin_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        // Relative join so a path prefix on the base URL is kept
        let url = self.base_url.join(path.trim_start_matches('/')).map_err(|e| {
            Error::Configuration(format!("cannot join '{path}' onto {}: {e}", self.base_url))
        })?;

        let request = self.http.request(method, url);
        let cookie = self.admin_cookie.expose_secret();
        if cookie.is_empty() {
            Ok(request)
        } else {
            Ok(request.header(header::COOKIE, cookie))
        }
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<ApiResponse> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(
            operation = operation,
            status = status.as_u16(),
            body_len = body.len(),
            "Received response"
        );
        Ok(ApiResponse { status, body })
    }
}

fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn with_query(request: RequestBuilder, query: &[(&str, &str)]) -> RequestBuilder {
    if query.is_empty() {
        request
    } else {
        request.query(query)
    }
}

fn count_templates(operation: &'static str, response: &ApiResponse) -> Result<usize> {
    match response.status() {
        // 204 means the server has no templates to report
        StatusCode::NO_CONTENT => Ok(0),
        StatusCode::OK => Ok(response.json::<Vec<Value>>()?.len()),
        status => Err(Error::UnexpectedStatus { operation, status }),
    }
}

pub(crate) fn decode_repository_list(response: &ApiResponse) -> Result<Vec<RepositoryDescriptor>> {
    if !response.is_success() {
        return Err(Error::UnexpectedStatus {
            operation: "list_template_repos",
            status: response.status(),
        });
    }
    if response.status() == StatusCode::NO_CONTENT || response.text().trim().is_empty() {
        return Ok(Vec::new());
    }
    response.json()
}
