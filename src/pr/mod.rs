//! One-shot pull request mutations: create, approve, comment. Each builds a
//! single payload, issues a single blocking request, and returns a small
//! summary of the API's JSON response. There is no retry path.

use std::str::FromStr;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{self, ApiError, ApiSurface};
use crate::config::{ConfigError, PrSettings};

#[derive(Debug, Error)]
pub enum PrError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unexpected API response shape: {0}")]
    Response(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("--type must be 'review' or 'issue'")]
pub struct CommentTypeError;

/// Where a PR comment lands: a review-event comment on the pull request, or
/// a plain conversational comment on the underlying issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Review,
    Issue,
}

impl CommentKind {
    /// Human label used in command output.
    pub fn label(self) -> &'static str {
        match self {
            CommentKind::Review => "review comment",
            CommentKind::Issue => "comment",
        }
    }
}

impl FromStr for CommentKind {
    type Err = CommentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review" => Ok(CommentKind::Review),
            "issue" => Ok(CommentKind::Issue),
            _ => Err(CommentTypeError),
        }
    }
}

/// Inputs for `create`. `base` defaults to "main" at the CLI layer.
#[derive(Debug, Clone)]
pub struct CreateParams {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: Option<String>,
    pub draft: bool,
    pub labels: Vec<String>,
}

/// Summary echoed after `create`.
#[derive(Debug, Deserialize)]
pub struct CreatedPullRequest {
    pub number: Option<u64>,
    pub html_url: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

/// Summary echoed after `approve` or a review-type comment.
#[derive(Debug, Deserialize)]
pub struct ReviewSummary {
    pub id: Option<u64>,
    pub html_url: Option<String>,
    pub state: Option<String>,
}

/// Summary echoed after an issue-type comment.
#[derive(Debug, Deserialize)]
pub struct CommentSummary {
    pub id: Option<u64>,
    pub html_url: Option<String>,
}

fn repo_url(settings: &PrSettings, owner: &str, repo: &str, tail: &str) -> String {
    format!(
        "{}/repos/{owner}/{repo}/{tail}",
        settings.api_base.trim_end_matches('/')
    )
}

/// Payload for `create`: optional fields are omitted entirely when unset.
fn create_payload(params: &CreateParams) -> Value {
    let mut payload = json!({
        "title": params.title,
        "head": params.head,
        "base": params.base,
    });
    if let Some(body) = &params.body {
        payload["body"] = json!(body);
    }
    if params.draft {
        payload["draft"] = json!(true);
    }
    if !params.labels.is_empty() {
        payload["labels"] = json!(params.labels);
    }
    payload
}

fn review_payload(event: &str, body: Option<&str>) -> Value {
    let mut payload = json!({ "event": event });
    if let Some(body) = body {
        payload["body"] = json!(body);
    }
    payload
}

fn send(
    settings: &PrSettings,
    url: &str,
    payload: &Value,
    debug_echo: bool,
) -> Result<Value, PrError> {
    let token = settings.require_token()?;
    let headers = api::build_headers(Some(token), ApiSurface::PullRequests);
    let client = api::build_blocking_client(settings.proxy.as_deref(), settings.verify_tls)?;
    Ok(api::make_request(
        &client,
        reqwest::Method::POST,
        url,
        &headers,
        Some(payload),
        debug_echo,
    )?)
}

/// Create a pull request.
#[instrument(skip(settings, params), fields(title = %params.title))]
pub fn create_pull_request(
    settings: &PrSettings,
    params: &CreateParams,
    debug_echo: bool,
) -> Result<CreatedPullRequest, PrError> {
    let (owner, repo) = settings.owner_repo()?;
    let url = repo_url(settings, owner, repo, "pulls");
    let payload = create_payload(params);
    let response = send(settings, &url, &payload, debug_echo)?;
    info!(head = %params.head, base = %params.base, "pull request created");
    Ok(serde_json::from_value(response)?)
}

/// Post an APPROVE review, optionally with a comment body.
#[instrument(skip(settings, comment))]
pub fn approve_pull_request(
    settings: &PrSettings,
    pr_number: u64,
    comment: Option<&str>,
    debug_echo: bool,
) -> Result<ReviewSummary, PrError> {
    let (owner, repo) = settings.owner_repo()?;
    let url = repo_url(settings, owner, repo, &format!("pulls/{pr_number}/reviews"));
    let payload = review_payload("APPROVE", comment);
    let response = send(settings, &url, &payload, debug_echo)?;
    Ok(serde_json::from_value(response)?)
}

/// Post a comment on a pull request, as either a COMMENT review event or a
/// plain issue comment depending on `kind`.
#[instrument(skip(settings, comment))]
pub fn comment_on_pull_request(
    settings: &PrSettings,
    pr_number: u64,
    comment: &str,
    kind: CommentKind,
    debug_echo: bool,
) -> Result<CommentSummary, PrError> {
    let (owner, repo) = settings.owner_repo()?;
    let (url, payload) = match kind {
        CommentKind::Review => (
            repo_url(settings, owner, repo, &format!("pulls/{pr_number}/reviews")),
            json!({ "body": comment, "event": "COMMENT" }),
        ),
        CommentKind::Issue => (
            repo_url(
                settings,
                owner,
                repo,
                &format!("issues/{pr_number}/comments"),
            ),
            json!({ "body": comment }),
        ),
    };
    let response = send(settings, &url, &payload, debug_echo)?;
    Ok(serde_json::from_value(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(api_base: String) -> PrSettings {
        PrSettings {
            api_base,
            token: Some("test_token".to_string()),
            owner: Some("octo".to_string()),
            repo: Some("hello".to_string()),
            proxy: None,
            verify_tls: true,
        }
    }

    fn create_params() -> CreateParams {
        CreateParams {
            title: "Fix bug".to_string(),
            head: "feature".to_string(),
            base: "main".to_string(),
            body: None,
            draft: false,
            labels: vec![],
        }
    }

    #[test]
    fn test_create_payload_minimal() {
        let payload = create_payload(&create_params());
        assert_eq!(
            payload,
            json!({"title": "Fix bug", "head": "feature", "base": "main"})
        );
    }

    #[test]
    fn test_create_payload_full() {
        let mut params = create_params();
        params.body = Some("Details".to_string());
        params.draft = true;
        params.labels = vec!["bug".to_string(), "urgent".to_string()];
        let payload = create_payload(&params);
        assert_eq!(payload["body"], "Details");
        assert_eq!(payload["draft"], true);
        assert_eq!(payload["labels"], json!(["bug", "urgent"]));
    }

    #[test]
    fn test_review_payload_shapes() {
        assert_eq!(review_payload("APPROVE", None), json!({"event": "APPROVE"}));
        assert_eq!(
            review_payload("APPROVE", Some("Looks good!")),
            json!({"event": "APPROVE", "body": "Looks good!"})
        );
    }

    #[test]
    fn test_comment_kind_parsing() {
        assert_eq!("review".parse::<CommentKind>(), Ok(CommentKind::Review));
        assert_eq!("issue".parse::<CommentKind>(), Ok(CommentKind::Issue));
        assert!("conversation".parse::<CommentKind>().is_err());
    }

    #[test]
    fn test_create_requires_owner_repo() {
        let mut settings = settings("https://api.github.com".to_string());
        settings.owner = None;
        let result = create_pull_request(&settings, &create_params(), false);
        assert!(matches!(
            result,
            Err(PrError::Config(ConfigError::MissingOwnerRepo))
        ));
    }

    #[test]
    fn test_create_requires_token() {
        let mut settings = settings("https://api.github.com".to_string());
        settings.token = None;
        let result = create_pull_request(&settings, &create_params(), false);
        assert!(matches!(
            result,
            Err(PrError::Config(ConfigError::MissingToken))
        ));
    }

    #[test]
    fn test_create_pull_request_round_trip() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/repos/octo/hello/pulls"))
                .and(header("Authorization", "Bearer test_token"))
                .and(body_partial_json(
                    json!({"title": "Fix bug", "head": "feature", "base": "main"}),
                ))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                    "number": 7,
                    "html_url": "https://github.com/octo/hello/pull/7",
                    "state": "open",
                    "draft": false
                })))
                .mount(&server),
        );

        let created =
            create_pull_request(&settings(server.uri()), &create_params(), false).unwrap();
        assert_eq!(created.number, Some(7));
        assert_eq!(created.state.as_deref(), Some("open"));
        assert!(!created.draft);
    }

    #[test]
    fn test_approve_round_trip() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/repos/octo/hello/pulls/123/reviews"))
                .and(body_partial_json(json!({"event": "APPROVE"})))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": 900,
                    "html_url": "https://github.com/octo/hello/pull/123#pullrequestreview-900",
                    "state": "APPROVED"
                })))
                .mount(&server),
        );

        let review =
            approve_pull_request(&settings(server.uri()), 123, Some("Looks good!"), false)
                .unwrap();
        assert_eq!(review.id, Some(900));
        assert_eq!(review.state.as_deref(), Some("APPROVED"));
    }

    #[test]
    fn test_issue_comment_hits_issues_endpoint() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/repos/octo/hello/issues/123/comments"))
                .and(body_partial_json(json!({"body": "Thanks!"})))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                    "id": 55,
                    "html_url": "https://github.com/octo/hello/pull/123#issuecomment-55"
                })))
                .mount(&server),
        );

        let comment = comment_on_pull_request(
            &settings(server.uri()),
            123,
            "Thanks!",
            CommentKind::Issue,
            false,
        )
        .unwrap();
        assert_eq!(comment.id, Some(55));
    }

    #[test]
    fn test_review_comment_sends_comment_event() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/repos/octo/hello/pulls/123/reviews"))
                .and(body_partial_json(
                    json!({"body": "Great work!", "event": "COMMENT"}),
                ))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 77})))
                .mount(&server),
        );

        let comment = comment_on_pull_request(
            &settings(server.uri()),
            123,
            "Great work!",
            CommentKind::Review,
            false,
        )
        .unwrap();
        assert_eq!(comment.id, Some(77));
    }

    #[test]
    fn test_http_error_is_fatal_with_truncated_body() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/repos/octo/hello/pulls"))
                .respond_with(
                    ResponseTemplate::new(422).set_body_string("v".repeat(600)),
                )
                .mount(&server),
        );

        let result = create_pull_request(&settings(server.uri()), &create_params(), false);
        match result {
            Err(PrError::Api(ApiError::Status { status, body })) => {
                assert_eq!(status, 422);
                assert_eq!(body.len(), 500);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
