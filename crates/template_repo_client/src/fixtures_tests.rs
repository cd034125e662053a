use super::*;

#[test]
fn test_sample_repos_point_at_default_index() {
    assert_eq!(sample_repos::CODEWIND.url, TEMPLATE_REPOSITORY_URL);
    assert_eq!(sample_repos::DISABLED_CODEWIND.url, TEMPLATE_REPOSITORY_URL);
    assert!(sample_repos::CODEWIND.enabled);
    assert!(!sample_repos::DISABLED_CODEWIND.enabled);
}

#[test]
fn test_fixture_repository_to_descriptor() {
    let repo = RepositoryDescriptor::from(&sample_repos::CODEWIND);

    assert_eq!(repo.url, TEMPLATE_REPOSITORY_URL);
    assert_eq!(repo.name, "Default templates");
    assert!(repo.enabled);
    assert!(repo.protected);
    assert_eq!(repo.project_styles, vec!["Codewind".to_string()]);
    assert!(repo.extra.is_empty());
}

#[test]
fn test_styled_templates() {
    let codewind = styled_templates::CODEWIND.to_descriptor();
    assert_eq!(codewind.source.as_deref(), Some(DEFAULT_TEMPLATES_SOURCE));
    assert_eq!(codewind.project_style, None);

    let appsody = styled_templates::APPSODY.to_descriptor();
    assert_eq!(appsody.project_style.as_deref(), Some("Appsody"));
    assert_eq!(appsody.source, None);
    assert_eq!(appsody.language, "nodejs");
}

#[test]
fn test_non_index_url_differs_from_index_url() {
    assert_ne!(VALID_URL_NOT_POINTING_TO_INDEX_JSON, TEMPLATE_REPOSITORY_URL);
    assert!(VALID_URL_NOT_POINTING_TO_INDEX_JSON.ends_with(".json"));
}
