//! GithubRepository - GitHub REST API を使った RegistryRepository 実装
//!
//! # 使う API
//! - `GET /user`（認証チェック）
//! - `GET /repos/{repo}/git/trees/{branch}?recursive=1`（一覧）
//! - `GET /repos/{repo}/contents/{path}`（本文）
//! - `GET /repos/{repo}/commits?path=...`（last modified）
//! - `GET /repos/{repo}/branches/{name}`、`POST /repos/{repo}/git/refs`
//! - `PUT` / `DELETE /repos/{repo}/contents/{path}`、`POST /repos/{repo}/pulls`
//! - `DELETE /repos/{repo}/git/refs/heads/{branch}`（途中で失敗した branch の片付け）

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LAST_MODIFIED};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::MaintainerConfig;
use crate::domain::stack::format_last_modified;
use crate::domain::{ChangeAction, ChangeRequest};
use crate::ports::{
    OwnersFile, RegistryRepository, RepoError, StackFile, is_ownership_file, is_stack_file,
};

const USER_AGENT: &str = concat!("registry-maintainer/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GithubRepository {
    client: Client,
    api_url: String,
    repo: String,
    default_branch: String,
}

impl GithubRepository {
    pub fn new(config: &MaintainerConfig) -> Result<Self, RepoError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));
        if !config.github_token.is_empty() {
            let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.github_token))
                .map_err(|_| RepoError::Authentication("token is not a valid header value".into()))?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            repo: config.registry_repo.clone(),
            default_branch: config.default_branch.clone(),
        })
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.repo, suffix)
    }

    async fn blobs_under(&self, root: &str) -> Result<Vec<TreeEntry>, RepoError> {
        let url = self.repo_url(&format!("git/trees/{}", self.default_branch));
        let response = self
            .client
            .get(url)
            .query(&[("recursive", "1")])
            .send()
            .await
            .map_err(transport)?;
        let tree: TreeResponse = check(response).await?.json().await.map_err(decode)?;
        if tree.truncated {
            warn!(root, "repository tree was truncated by GitHub; some stacks may be missing");
        }

        let prefix = format!("{}/", root.trim_end_matches('/'));
        Ok(tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob" && entry.path.starts_with(&prefix))
            .collect())
    }

    async fn head_sha(&self, branch: &str) -> Result<String, RepoError> {
        let response = self
            .client
            .get(self.repo_url(&format!("branches/{branch}")))
            .send()
            .await
            .map_err(transport)?;
        let branch: BranchResponse = check(response).await?.json().await.map_err(decode)?;
        Ok(branch.commit.sha)
    }

    async fn create_branch(&self, branch: &str) -> Result<(), RepoError> {
        let sha = self.head_sha(&self.default_branch).await?;
        let body = CreateRef {
            git_ref: format!("refs/heads/{branch}"),
            sha,
        };
        let response = self
            .client
            .post(self.repo_url("git/refs"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(RepoError::BranchAlreadyExists(branch.to_string()));
        }
        check(response).await?;
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<(), RepoError> {
        let response = self
            .client
            .delete(self.repo_url(&format!("git/refs/heads/{branch}")))
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn commit_change(&self, change: &ChangeRequest) -> Result<(), RepoError> {
        let url = self.repo_url(&format!("contents/{}", change.target_path));
        let request = match &change.action {
            ChangeAction::Deprecate { updated_content } => self.client.put(url).json(&FileWrite {
                message: &change.commit_message,
                content: Some(STANDARD.encode(updated_content)),
                sha: &change.content_hash,
                branch: &change.branch_name,
            }),
            ChangeAction::Remove => self.client.delete(url).json(&FileWrite {
                message: &change.commit_message,
                content: None,
                sha: &change.content_hash,
                branch: &change.branch_name,
            }),
        };
        check(request.send().await.map_err(transport)?).await?;
        Ok(())
    }

    async fn create_pull(&self, change: &ChangeRequest) -> Result<(), RepoError> {
        info!(branch = %change.branch_name, "creating pull request");
        let body = CreatePull {
            title: &change.title,
            head: &change.branch_name,
            base: &self.default_branch,
            body: &change.description,
        };
        let response = self
            .client
            .post(self.repo_url("pulls"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let pull: PullResponse = check(response).await?.json().await.map_err(decode)?;
        info!(branch = %change.branch_name, url = %pull.html_url, "pull request created");
        Ok(())
    }
}

#[async_trait]
impl RegistryRepository for GithubRepository {
    async fn authenticate(&self) -> Result<(), RepoError> {
        debug!("checking github credentials");
        let response = self
            .client
            .get(format!("{}/user", self.api_url))
            .send()
            .await
            .map_err(transport)?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(RepoError::Authentication("bad credentials given for github".into()))
            }
            _ => check(response).await.map(|_| ()),
        }
    }

    async fn list_artifact_files(&self, root: &str) -> Result<Vec<StackFile>, RepoError> {
        info!(root, "fetching repo files");
        Ok(self
            .blobs_under(root)
            .await?
            .into_iter()
            .filter(|entry| is_stack_file(&entry.path, root))
            .map(|entry| StackFile {
                path: entry.path,
                sha: entry.sha,
            })
            .collect())
    }

    async fn list_ownership_files(&self, root: &str) -> Result<Vec<OwnersFile>, RepoError> {
        let mut owners = Vec::new();
        for entry in self.blobs_under(root).await? {
            if !is_ownership_file(&entry.path, root) {
                continue;
            }
            let content = self.fetch_content(&entry.path).await?;
            owners.push(OwnersFile {
                path: entry.path,
                content,
            });
        }
        Ok(owners)
    }

    async fn fetch_content(&self, path: &str) -> Result<String, RepoError> {
        let response = self
            .client
            .get(self.repo_url(&format!("contents/{path}")))
            .query(&[("ref", self.default_branch.as_str())])
            .send()
            .await
            .map_err(transport)?;
        let file: ContentResponse = check(response).await?.json().await.map_err(decode)?;
        decode_content(&file)
    }

    async fn fetch_last_modified(&self, path: &str) -> Result<String, RepoError> {
        let response = self
            .client
            .get(self.repo_url("commits"))
            .query(&[
                ("path", path),
                ("sha", self.default_branch.as_str()),
                ("per_page", "1"),
            ])
            .send()
            .await
            .map_err(transport)?;
        let response = check(response).await?;
        let header = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let commits: Vec<CommitEntry> = response.json().await.map_err(decode)?;
        Ok(last_modified_from(&commits, header, Utc::now()))
    }

    async fn branch_exists(&self, branch: &str) -> Result<bool, RepoError> {
        let response = self
            .client
            .get(self.repo_url(&format!("branches/{branch}")))
            .send()
            .await
            .map_err(transport)?;
        match check(response).await {
            Ok(_) => Ok(true),
            Err(RepoError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn apply_change(&self, change: &ChangeRequest) -> Result<(), RepoError> {
        self.create_branch(&change.branch_name).await?;
        let result = match self.commit_change(change).await {
            Ok(()) => self.create_pull(change).await,
            Err(err) => Err(err),
        };

        // A branch without a PR would make later runs skip this stack for good.
        if result.is_err() {
            if let Err(err) = self.delete_branch(&change.branch_name).await {
                warn!(branch = %change.branch_name, "cannot delete branch after failed change: {err}");
            }
        }
        result
    }
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}

#[derive(Debug, Serialize)]
struct CreateRef {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct FileWrite<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePull<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

async fn check(response: Response) -> Result<Response, RepoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED => RepoError::Authentication(message),
        StatusCode::NOT_FOUND => RepoError::NotFound(message),
        _ => RepoError::Remote {
            status: status.as_u16(),
            message,
        },
    })
}

fn transport(err: reqwest::Error) -> RepoError {
    RepoError::Transport(err.to_string())
}

fn decode(err: reqwest::Error) -> RepoError {
    RepoError::Decode(err.to_string())
}

fn decode_content(file: &ContentResponse) -> Result<String, RepoError> {
    if file.encoding != "base64" {
        return Err(RepoError::Decode(format!(
            "unsupported content encoding '{}'",
            file.encoding
        )));
    }
    // GitHub wraps the base64 payload every 60 characters
    let packed: String = file.content.split_whitespace().collect();
    let bytes = STANDARD
        .decode(packed)
        .map_err(|err| RepoError::Decode(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| RepoError::Decode(err.to_string()))
}

/// Newest committer date, then the `Last-Modified` header, then `now`.
fn last_modified_from(commits: &[CommitEntry], header: Option<String>, now: DateTime<Utc>) -> String {
    commits
        .first()
        .and_then(|newest| newest.commit.committer.as_ref())
        .map(|signature| format_last_modified(signature.date))
        .or(header)
        .unwrap_or_else(|| format_last_modified(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::branch_name;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REPO: &str = "/repos/acme/registry";
    const DEVFILE_PATH: &str = "stacks/go/1.0.0/devfile.yaml";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn content_is_base64_with_line_breaks() {
        let file = ContentResponse {
            content: "bWV0YWRhdGE6CiB0YWdz\nOgogLSB0YWc=\n".to_string(),
            encoding: "base64".to_string(),
        };
        assert_eq!(decode_content(&file).unwrap(), "metadata:\n tags:\n - tag");
    }

    #[test]
    fn content_with_unknown_encoding_is_rejected() {
        let file = ContentResponse {
            content: String::new(),
            encoding: "none".to_string(),
        };
        assert!(matches!(decode_content(&file), Err(RepoError::Decode(_))));
    }

    #[test]
    fn last_modified_prefers_committer_date() {
        let commits: Vec<CommitEntry> = serde_json::from_value(serde_json::json!([
            { "commit": { "committer": { "date": "2024-03-03T22:01:01Z" } } }
        ]))
        .unwrap();
        let got = last_modified_from(&commits, Some("Mon, 01 Jan 2024 00:00:00 GMT".into()), now());
        assert_eq!(got, "Sun, 03 Mar 2024 22:01:01 GMT");
    }

    #[test]
    fn last_modified_falls_back_to_header() {
        let commits: Vec<CommitEntry> =
            serde_json::from_value(serde_json::json!([{ "commit": { "committer": null } }])).unwrap();
        let got = last_modified_from(&commits, Some("Mon, 01 Jan 2024 00:00:00 GMT".into()), now());
        assert_eq!(got, "Mon, 01 Jan 2024 00:00:00 GMT");
    }

    #[test]
    fn empty_history_uses_header() {
        let got = last_modified_from(&[], Some("Mon, 01 Jan 2024 00:00:00 GMT".into()), now());
        assert_eq!(got, "Mon, 01 Jan 2024 00:00:00 GMT");
    }

    #[test]
    fn last_modified_without_history_is_now() {
        assert_eq!(last_modified_from(&[], None, now()), "Wed, 01 Jan 2025 00:00:00 GMT");
    }

    #[test]
    fn repo_urls_use_configured_api() {
        let config = MaintainerConfig {
            api_url: "https://ghe.example.com/api/v3/".to_string(),
            registry_repo: "acme/registry".to_string(),
            ..MaintainerConfig::default()
        };
        let repo = GithubRepository::new(&config).unwrap();
        assert_eq!(
            repo.repo_url("contents/stacks/go/devfile.yaml"),
            "https://ghe.example.com/api/v3/repos/acme/registry/contents/stacks/go/devfile.yaml"
        );
    }

    #[test]
    fn delete_body_has_no_content() {
        let body = FileWrite {
            message: "Remove go",
            content: None,
            sha: "abc",
            branch: "devfile_maintainer/remove-go",
        };
        let v = serde_json::to_value(&body).unwrap();
        assert!(v.get("content").is_none());
        assert_eq!(v["sha"], "abc");
    }

    fn github(server: &MockServer) -> GithubRepository {
        let config = MaintainerConfig {
            github_token: "token".to_string(),
            api_url: server.uri(),
            registry_repo: "acme/registry".to_string(),
            default_branch: "main".to_string(),
            ..MaintainerConfig::default()
        };
        GithubRepository::new(&config).unwrap()
    }

    fn change(action: ChangeAction) -> ChangeRequest {
        let kind = action.kind();
        ChangeRequest {
            action,
            stack_name: "go/1.0.0".to_string(),
            target_path: DEVFILE_PATH.to_string(),
            content_hash: "blob1".to_string(),
            branch_name: branch_name(kind, "go/1.0.0"),
            commit_message: format!("{kind} go/1.0.0"),
            title: format!("chore: {kind} go/1.0.0"),
            description: "## What this PR does?\n".to_string(),
        }
    }

    fn deprecate() -> ChangeRequest {
        change(ChangeAction::Deprecate {
            updated_content: "metadata:\n  tags: [Go, Deprecated]\n".to_string(),
        })
    }

    async fn calls(server: &MockServer) -> Vec<String> {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| format!("{} {}", request.method, request.url.path()))
            .collect()
    }

    /// Default branch head plus the ref creation for `branch`.
    async fn mount_branch_creation(server: &MockServer, branch: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("{REPO}/branches/main")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commit": { "sha": "head1" } })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{REPO}/git/refs")))
            .and(body_partial_json(json!({ "ref": format!("refs/heads/{branch}"), "sha": "head1" })))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    async fn mount_pull(server: &MockServer, branch: &str) {
        Mock::given(method("POST"))
            .and(path(format!("{REPO}/pulls")))
            .and(body_partial_json(json!({ "head": branch, "base": "main" })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "html_url": "https://github.com/acme/registry/pull/1" })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn authenticate_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "bot" })))
            .mount(&server)
            .await;

        github(&server).authenticate().await.unwrap();
    }

    #[rstest]
    #[case::unauthorized(401)]
    #[case::forbidden(403)]
    #[tokio::test]
    async fn rejected_credentials(#[case] status: u16) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = github(&server).authenticate().await.unwrap_err();
        assert!(matches!(err, RepoError::Authentication(_)));
    }

    #[tokio::test]
    async fn branch_lookup_maps_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{REPO}/branches/devfile_maintainer/deprecate-go-1.0.0")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commit": { "sha": "x" } })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{REPO}/branches/broken")))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        let repo = github(&server);

        assert!(repo.branch_exists("devfile_maintainer/deprecate-go-1.0.0").await.unwrap());
        // nothing mounted for this one, so the server answers 404
        assert!(!repo.branch_exists("devfile_maintainer/remove-go-1.0.0").await.unwrap());
        let err = repo.branch_exists("broken").await.unwrap_err();
        assert_eq!(
            err,
            RepoError::Remote {
                status: 500,
                message: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn listing_filters_tree_and_decodes_owners() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{REPO}/git/trees/main")))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tree": [
                    { "path": "README.md", "type": "blob", "sha": "r" },
                    { "path": "stacks/go", "type": "tree", "sha": "t" },
                    { "path": "stacks/OWNERS", "type": "blob", "sha": "o0" },
                    { "path": "stacks/go/OWNERS", "type": "blob", "sha": "o1" },
                    { "path": DEVFILE_PATH, "type": "blob", "sha": "blob1" },
                    { "path": "stacks/go/1.0.0/README.md", "type": "blob", "sha": "x" },
                ],
                "truncated": false
            })))
            .mount(&server)
            .await;
        // GitHub wraps base64 content in lines
        let encoded = STANDARD.encode("reviewers:\n  - alice\n");
        let (head, tail) = encoded.split_at(8);
        Mock::given(method("GET"))
            .and(path(format!("{REPO}/contents/stacks/go/OWNERS")))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": format!("{head}\n{tail}\n"),
                "encoding": "base64"
            })))
            .mount(&server)
            .await;
        let repo = github(&server);

        let files = repo.list_artifact_files("stacks").await.unwrap();
        assert_eq!(
            files,
            vec![StackFile {
                path: DEVFILE_PATH.to_string(),
                sha: "blob1".to_string()
            }]
        );

        let owners = repo.list_ownership_files("stacks").await.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].path, "stacks/go/OWNERS");
        assert_eq!(owners[0].content, "reviewers:\n  - alice\n");
    }

    #[tokio::test]
    async fn last_modified_reads_newest_commit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{REPO}/commits")))
            .and(query_param("path", DEVFILE_PATH))
            .and(query_param("per_page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("last-modified", "Mon, 01 Jan 2024 00:00:00 GMT")
                    .set_body_json(json!([{ "commit": { "committer": { "date": "2024-03-03T22:01:01Z" } } }])),
            )
            .mount(&server)
            .await;

        let got = github(&server).fetch_last_modified(DEVFILE_PATH).await.unwrap();
        assert_eq!(got, "Sun, 03 Mar 2024 22:01:01 GMT");
    }

    #[tokio::test]
    async fn deprecate_creates_branch_commits_and_opens_pull() {
        let server = MockServer::start().await;
        let change = deprecate();
        mount_branch_creation(&server, &change.branch_name, 201).await;
        Mock::given(method("PUT"))
            .and(path(format!("{REPO}/contents/{DEVFILE_PATH}")))
            .and(body_partial_json(json!({
                "sha": "blob1",
                "branch": change.branch_name,
                "message": change.commit_message,
                "content": STANDARD.encode("metadata:\n  tags: [Go, Deprecated]\n"),
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        mount_pull(&server, &change.branch_name).await;

        github(&server).apply_change(&change).await.unwrap();

        assert_eq!(
            calls(&server).await,
            vec![
                format!("GET {REPO}/branches/main"),
                format!("POST {REPO}/git/refs"),
                format!("PUT {REPO}/contents/{DEVFILE_PATH}"),
                format!("POST {REPO}/pulls"),
            ]
        );
    }

    #[tokio::test]
    async fn remove_deletes_file_without_content() {
        let server = MockServer::start().await;
        let change = change(ChangeAction::Remove);
        mount_branch_creation(&server, &change.branch_name, 201).await;
        Mock::given(method("DELETE"))
            .and(path(format!("{REPO}/contents/{DEVFILE_PATH}")))
            .and(body_partial_json(json!({ "sha": "blob1", "branch": change.branch_name })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        mount_pull(&server, &change.branch_name).await;

        github(&server).apply_change(&change).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[2].method.as_str(), "DELETE");
        let body: serde_json::Value = serde_json::from_slice(&requests[2].body).unwrap();
        assert!(body.get("content").is_none());
    }

    #[tokio::test]
    async fn existing_ref_stops_before_commit() {
        let server = MockServer::start().await;
        let change = deprecate();
        mount_branch_creation(&server, &change.branch_name, 422).await;

        let err = github(&server).apply_change(&change).await.unwrap_err();
        assert_eq!(err, RepoError::BranchAlreadyExists(change.branch_name.clone()));
        assert_eq!(
            calls(&server).await,
            vec![format!("GET {REPO}/branches/main"), format!("POST {REPO}/git/refs")]
        );
    }

    #[tokio::test]
    async fn failed_commit_deletes_the_new_branch() {
        let server = MockServer::start().await;
        let change = deprecate();
        mount_branch_creation(&server, &change.branch_name, 201).await;
        Mock::given(method("PUT"))
            .and(path(format!("{REPO}/contents/{DEVFILE_PATH}")))
            .respond_with(ResponseTemplate::new(409).set_body_string("sha mismatch"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{REPO}/git/refs/heads/{}", change.branch_name)))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = github(&server).apply_change(&change).await.unwrap_err();
        assert!(matches!(err, RepoError::Remote { status: 409, .. }));
        assert_eq!(
            calls(&server).await.last().map(String::as_str),
            Some(format!("DELETE {REPO}/git/refs/heads/devfile_maintainer/deprecate-go-1.0.0").as_str())
        );
    }

    #[tokio::test]
    async fn failed_pull_deletes_the_new_branch() {
        let server = MockServer::start().await;
        let change = change(ChangeAction::Remove);
        mount_branch_creation(&server, &change.branch_name, 201).await;
        Mock::given(method("DELETE"))
            .and(path(format!("{REPO}/contents/{DEVFILE_PATH}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{REPO}/pulls")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{REPO}/git/refs/heads/{}", change.branch_name)))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = github(&server).apply_change(&change).await.unwrap_err();
        assert!(matches!(err, RepoError::Remote { status: 500, .. }));
        let calls = calls(&server).await;
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[4], format!("DELETE {REPO}/git/refs/heads/{}", change.branch_name));
    }
}
