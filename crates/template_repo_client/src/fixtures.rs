//! Fixture data for template API tests.
//!
//! Fixtures are immutable constants; convert them into owned descriptors with
//! [`FixtureRepository::to_descriptor`] or [`FixtureTemplate::to_descriptor`]
//! when a request body is needed.

use serde_json::Map;

use crate::models::{RepositoryDescriptor, TemplateDescriptor};

#[cfg(test)]
#[path = "fixtures_tests.rs"]
mod tests;

/// Index of the default Codewind templates.
pub const TEMPLATE_REPOSITORY_URL: &str =
    "https://raw.githubusercontent.com/codewind-resources/codewind-templates/master/devfiles/index.json";

/// Source name given to templates read from the default index.
pub const DEFAULT_TEMPLATES_SOURCE: &str = "Default templates";

/// A reachable JSON document that is not a template index.
pub const VALID_URL_NOT_POINTING_TO_INDEX_JSON: &str =
    "https://support.oneskyapp.com/hc/en-us/article_attachments/202761627/example_1.json";

/// Constant form of a [`RepositoryDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureRepository {
    pub url: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub enabled: bool,
    pub protected: bool,
    pub project_styles: &'static [&'static str],
}

impl FixtureRepository {
    pub fn to_descriptor(&self) -> RepositoryDescriptor {
        RepositoryDescriptor {
            url: self.url.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            enabled: self.enabled,
            protected: self.protected,
            project_styles: self.project_styles.iter().map(|s| s.to_string()).collect(),
            extra: Map::new(),
        }
    }
}

impl From<&FixtureRepository> for RepositoryDescriptor {
    fn from(fixture: &FixtureRepository) -> Self {
        fixture.to_descriptor()
    }
}

/// Constant form of a [`TemplateDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureTemplate {
    pub label: &'static str,
    pub description: &'static str,
    pub language: &'static str,
    pub url: &'static str,
    pub project_type: &'static str,
    pub source: Option<&'static str>,
    /// `None` means the server's default style (Codewind).
    pub project_style: Option<&'static str>,
}

impl FixtureTemplate {
    pub fn to_descriptor(&self) -> TemplateDescriptor {
        TemplateDescriptor {
            label: self.label.to_string(),
            description: self.description.to_string(),
            language: self.language.to_string(),
            url: self.url.to_string(),
            project_type: self.project_type.to_string(),
            source: self.source.map(str::to_string),
            source_url: None,
            project_style: self.project_style.map(str::to_string),
        }
    }
}

/// Sample repositories.
pub mod sample_repos {
    use super::*;

    /// The default Codewind repository, enabled.
    pub const CODEWIND: FixtureRepository = FixtureRepository {
        url: TEMPLATE_REPOSITORY_URL,
        name: "Default templates",
        description: "The default set of templates for new projects in Codewind.",
        enabled: true,
        protected: true,
        project_styles: &["Codewind"],
    };

    /// The default Codewind repository, disabled.
    pub const DISABLED_CODEWIND: FixtureRepository = FixtureRepository {
        url: TEMPLATE_REPOSITORY_URL,
        name: "Default disabled templates",
        description: "The disabled default set of templates for new projects in Codewind.",
        enabled: false,
        protected: true,
        project_styles: &["Codewind"],
    };
}

/// Templates tagged with a project style.
pub mod styled_templates {
    use super::*;

    pub const CODEWIND: FixtureTemplate = FixtureTemplate {
        label: "Codewind template",
        description: "Codewind template",
        language: "go",
        url: "https://github.com/codewind-resources/goTemplate",
        project_type: "docker",
        source: Some(DEFAULT_TEMPLATES_SOURCE),
        project_style: None,
    };

    pub const APPSODY: FixtureTemplate = FixtureTemplate {
        label: "Appsody template",
        description: "Appsody stack",
        language: "nodejs",
        url: "https://github.com/appsody/template/repo",
        project_type: "nodejs",
        source: None,
        project_style: Some("Appsody"),
    };
}
