//! # Models
//!
//! Records exchanged with the template API and with the remote template index.
//!
//! Field names follow the camelCase JSON used on the wire.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// A template repository registered with the server.
///
/// The `url` is the natural key: add, delete and enable/disable all address a
/// repository by it. Any field the server reports beyond the known ones is
/// kept in `extra` so that a snapshot can be re-submitted unchanged.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDescriptor {
    /// Location of the repository's template index.
    pub url: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Whether the repository's templates are offered.
    #[serde(default)]
    pub enabled: bool,
    /// Whether the repository is one of the protected defaults.
    #[serde(default)]
    pub protected: bool,
    /// Project styles provided by the repository, in server order.
    #[serde(default)]
    pub project_styles: Vec<String>,
    /// Fields reported by the server that this client does not interpret.
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// A single installable project template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    pub url: String,
    #[serde(default)]
    pub project_type: String,
    /// Name of the repository the template came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Index URL of the repository the template came from.
    #[serde(
        default,
        rename = "sourceURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_url: Option<String>,
    /// Style grouping; absent means the server's default style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_style: Option<String>,
}

/// An entry of a remote template index (`index.json`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub project_type: String,
    pub location: String,
}

impl IndexEntry {
    /// Reshape the entry into the template record served by the API,
    /// tagging it with the repository it was read from.
    pub fn into_template(self, source: &str, source_url: &str) -> TemplateDescriptor {
        TemplateDescriptor {
            label: self.display_name,
            description: self.description,
            language: self.language,
            url: self.location,
            project_type: self.project_type,
            source: Some(source.to_string()),
            source_url: Some(source_url.to_string()),
            project_style: None,
        }
    }
}

/// Patch operations understood by the batch endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Enable,
}

/// One instruction of a batch patch request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchOperation {
    pub url: String,
    pub op: PatchOp,
    /// `"true"` or `"false"`; the server expects a string.
    pub value: String,
}

impl BatchOperation {
    /// Build an operation setting the enabled flag of the repository at `url`.
    pub fn enable(url: impl Into<String>, enabled: bool) -> Self {
        Self {
            url: url.into(),
            op: PatchOp::Enable,
            value: enabled.to_string(),
        }
    }

    /// One `enable` operation per url, all with the same value, in input order.
    pub fn enable_all<I, S>(urls: I, enabled: bool) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .map(|url| Self::enable(url, enabled))
            .collect()
    }
}

/// Body of a delete-repository request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeleteRepositoryRequest {
    pub url: String,
}
