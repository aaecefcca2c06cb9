use serial_test::serial;

use pagepub::github::GitHubClient;

#[test]
#[serial]
fn new_from_env_parses_owner_and_repo() {
    std::env::set_var("GITHUB_TOKEN", "test-token");
    std::env::set_var("GITHUB_REPOSITORY", "octocat/hello-world");
    std::env::remove_var("GITHUB_API_URL");

    let client = GitHubClient::new_from_env().expect("client should construct");

    assert_eq!(client.owner(), "octocat");
    assert_eq!(client.repo(), "hello-world");
    assert_eq!(client.api_base(), "https://api.github.com");
}

#[test]
#[serial]
fn new_from_env_honours_api_url_override() {
    std::env::set_var("GITHUB_TOKEN", "test-token");
    std::env::set_var("GITHUB_REPOSITORY", "octocat/hello-world");
    std::env::set_var("GITHUB_API_URL", "https://github.example.com/api/v3/");

    let client = GitHubClient::new_from_env().expect("client should construct");

    assert_eq!(client.api_base(), "https://github.example.com/api/v3");
    std::env::remove_var("GITHUB_API_URL");
}

#[test]
#[serial]
fn new_from_env_rejects_malformed_repository_coordinates() {
    std::env::set_var("GITHUB_TOKEN", "test-token");
    std::env::set_var("GITHUB_REPOSITORY", "not-a-repo-path");

    let err = GitHubClient::new_from_env().expect_err("must reject");

    assert!(
        err.to_string().contains("owner/repo"),
        "Error should name the expected shape: {err}"
    );
}

#[test]
#[serial]
fn new_from_env_fails_without_token() {
    std::env::remove_var("GITHUB_TOKEN");
    std::env::set_var("GITHUB_REPOSITORY", "octocat/hello-world");

    assert!(GitHubClient::new_from_env().is_err());
}
