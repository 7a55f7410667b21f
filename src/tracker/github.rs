use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::{IssueRef, IssueTracker, RepoId, TrackerError};
use crate::issue::IssueDraft;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "bug-importer";
const API_VERSION: &str = "2022-11-28";
const LABELS_PER_PAGE: usize = 100;

/// GitHub REST client for one repository.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    session: Option<Session>,
}

struct Session {
    token: String,
    repo: RepoId,
}

#[derive(Debug, Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [String],
}

#[derive(Debug, Serialize)]
struct NewLabel<'a> {
    name: &'a str,
    color: &'a str,
    description: &'a str,
}

#[derive(Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Deserialize)]
struct RepoResponse {
    full_name: String,
}

#[derive(Deserialize)]
struct IssueResponse {
    number: u64,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct LabelResponse {
    name: String,
}

impl GitHubClient {
    /// Build a client against `api_url` (e.g. a GitHub Enterprise endpoint).
    /// `timeout` bounds every request.
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, TrackerError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    fn session(&self) -> Result<&Session, TrackerError> {
        self.session.as_ref().ok_or(TrackerError::NotConnected)
    }

    fn repo_url(&self, repo: &RepoId, suffix: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_url, repo.owner, repo.name, suffix)
    }

    fn request(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    #[instrument(skip(self, token, repo), fields(repo = %repo))]
    async fn connect(&mut self, token: &str, repo: &RepoId) -> Result<(), TrackerError> {
        let url = format!("{}/user", self.api_url);
        let response = self.request(Method::GET, &url, token).send().await?;
        let user: UserResponse = match response.status() {
            s if s.is_success() => response.json().await?,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let (_, message) = read_error(response).await;
                return Err(TrackerError::Auth(message));
            }
            _ => return Err(submission_error(response).await),
        };
        info!(login = %user.login, "Connected to GitHub as: {}", user.login);

        let url = self.repo_url(repo, "");
        let response = self.request(Method::GET, &url, token).send().await?;
        let found: RepoResponse = match response.status() {
            s if s.is_success() => response.json().await?,
            StatusCode::NOT_FOUND => return Err(TrackerError::RepoNotFound(repo.clone())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let (_, message) = read_error(response).await;
                return Err(TrackerError::Auth(message));
            }
            _ => return Err(submission_error(response).await),
        };
        info!(full_name = %found.full_name, "Connected to repository: {}", found.full_name);

        self.session = Some(Session {
            token: token.to_string(),
            repo: repo.clone(),
        });
        Ok(())
    }

    #[instrument(skip(self, draft), fields(labels = draft.labels.len()))]
    async fn create_issue(&self, record_id: &str, draft: &IssueDraft) -> Result<IssueRef, TrackerError> {
        let session = self.session()?;
        let url = self.repo_url(&session.repo, "/issues");
        let payload = NewIssue {
            title: &draft.title,
            body: &draft.body,
            labels: &draft.labels,
        };

        let response = self
            .request(Method::POST, &url, &session.token)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(submission_error(response).await);
        }

        let issue: IssueResponse = response.json().await?;
        debug!(number = issue.number, url = issue.html_url.as_deref().unwrap_or(""), "issue created");
        Ok(IssueRef::Number(issue.number))
    }

    #[instrument(skip(self))]
    async fn list_labels(&self) -> Result<HashSet<String>, TrackerError> {
        let session = self.session()?;
        let url = self.repo_url(&session.repo, "/labels");
        let mut names = HashSet::new();
        let mut page = 1u32;

        loop {
            let response = self
                .request(Method::GET, &url, &session.token)
                .query(&[("per_page", LABELS_PER_PAGE as u32), ("page", page)])
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(submission_error(response).await);
            }

            let labels: Vec<LabelResponse> = response.json().await?;
            let fetched = labels.len();
            names.extend(labels.into_iter().map(|l| l.name));
            debug!(page, fetched, "fetched label page");

            if fetched < LABELS_PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(names)
    }

    #[instrument(skip(self, color, description))]
    async fn create_label(&self, name: &str, color: &str, description: &str) -> Result<(), TrackerError> {
        let session = self.session()?;
        let url = self.repo_url(&session.repo, "/labels");
        let payload = NewLabel {
            name,
            color,
            description,
        };

        let response = self
            .request(Method::POST, &url, &session.token)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(submission_error(response).await);
        }
        Ok(())
    }
}

async fn submission_error(response: Response) -> TrackerError {
    let (status, message) = read_error(response).await;
    TrackerError::Submission { status, message }
}

/// Drain an error response into (status, message).
async fn read_error(response: Response) -> (u16, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    (status.as_u16(), error_message(status, &body))
}

/// GitHub error bodies look like `{"message": "...", "errors": [...]}`;
/// fall back to the raw body, then to the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
        #[serde(default)]
        errors: Vec<serde_json::Value>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if parsed.errors.is_empty() {
            return parsed.message;
        }
        let details: Vec<String> = parsed
            .errors
            .iter()
            .map(|e| match e.get("message").and_then(|m| m.as_str()) {
                Some(m) => m.to_string(),
                None => e.to_string(),
            })
            .collect();
        return format!("{} ({})", parsed.message, details.join("; "));
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitHubClient {
        GitHubClient::new("https://github.example.com/api/v3/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let repo: RepoId = "acme/widgets".parse().unwrap();
        assert_eq!(
            client().repo_url(&repo, "/issues"),
            "https://github.example.com/api/v3/repos/acme/widgets/issues"
        );
    }

    #[test]
    fn test_issue_payload_shape() {
        let labels = vec!["🔥 critical".to_string(), "bug".to_string()];
        let payload = NewIssue {
            title: "[BUG-1] Crash",
            body: "body",
            labels: &labels,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["title"], "[BUG-1] Crash");
        assert_eq!(json["labels"][0], "🔥 critical");
        assert_eq!(json["labels"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_error_message_from_github_body() {
        let body = r#"{"message": "Bad credentials", "documentation_url": "https://docs.github.com"}"#;
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, body), "Bad credentials");
    }

    #[test]
    fn test_error_message_includes_validation_errors() {
        let body = r#"{"message": "Validation Failed", "errors": [{"resource": "Label", "code": "already_exists"}, {"message": "name is too long"}]}"#;
        let message = error_message(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(message.starts_with("Validation Failed ("));
        assert!(message.contains("already_exists"));
        assert!(message.contains("name is too long"));
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down\n"), "upstream down");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_calls_before_connect_fail() {
        let client = client();
        let draft = IssueDraft {
            title: "t".to_string(),
            body: "b".to_string(),
            labels: vec![],
        };
        assert!(matches!(
            client.create_issue("BUG-1", &draft).await,
            Err(TrackerError::NotConnected)
        ));
        assert!(matches!(client.list_labels().await, Err(TrackerError::NotConnected)));
    }
}
