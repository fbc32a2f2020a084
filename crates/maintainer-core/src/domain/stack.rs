//! Registry stack record: one devfile version fetched from the registry repo.
//!
//! A `RegistryStack` is built once per run from raw repository data and is
//! immutable afterwards. Nothing is persisted between runs.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use super::errors::StackError;

/// Wire format of commit timestamps, e.g. `Sun, 03 Mar 2024 22:01:01 GMT`.
pub const LAST_MODIFIED_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Filenames recognized as stack definitions.
pub const DEVFILE_NAMES: [&str; 2] = ["devfile.yaml", "devfile.yml"];

/// Raw data for one stack version, as handed over by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStack {
    pub path: String,
    pub raw_content: String,
    pub last_modified: String,
    pub file_sha: String,
    pub owners_content: Option<String>,
}

/// A parsed stack version.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryStack {
    /// Path relative to the stacks dir, without the devfile name (`go/1.0.0`).
    pub name: String,

    /// Full repository path of the devfile.
    pub path: String,

    pub raw_content: String,

    /// Time of the newest commit touching the devfile.
    pub last_modified: DateTime<Utc>,

    /// Blob sha; GitHub needs it for a conditional update/delete.
    pub file_sha: String,

    /// `metadata.tags` contains "deprecated" (any case).
    pub deprecated: bool,

    /// Reviewers from the matching OWNERS file, in file order.
    pub owners: Vec<String>,
}

impl RegistryStack {
    pub fn from_raw(raw: RawStack, stacks_dir: &str) -> Result<Self, StackError> {
        let name = derive_name(&raw.path, stacks_dir)?;
        let last_modified = parse_last_modified(&raw.last_modified)?;
        let deprecated = parse_deprecated(&raw.raw_content)?;
        let owners = parse_owners(raw.owners_content.as_deref())?;

        Ok(Self {
            name,
            path: raw.path,
            raw_content: raw.raw_content,
            last_modified,
            file_sha: raw.file_sha,
            deprecated,
            owners,
        })
    }
}

/// Strip `{stacks_dir}/` and the devfile filename from a repository path.
///
/// `stacks/go/1.0.0/devfile.yaml` and `stacks/go/1.0.0/devfile.yml` both
/// become `go/1.0.0`.
pub fn derive_name(path: &str, stacks_dir: &str) -> Result<String, StackError> {
    let root = format!("{}/", stacks_dir.trim_end_matches('/'));
    let relative = path.strip_prefix(&root).unwrap_or(path);

    DEVFILE_NAMES
        .iter()
        .find_map(|file| relative.strip_suffix(&format!("/{file}")).map(str::to_owned))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| StackError::MalformedPath(path.to_string()))
}

pub fn parse_last_modified(value: &str) -> Result<DateTime<Utc>, StackError> {
    NaiveDateTime::parse_from_str(value.trim(), LAST_MODIFIED_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|err| StackError::MalformedTimestamp {
            value: value.to_string(),
            reason: err.to_string(),
        })
}

pub fn format_last_modified(at: DateTime<Utc>) -> String {
    at.format(LAST_MODIFIED_FORMAT).to_string()
}

#[derive(Debug, Deserialize)]
struct DevfileHead {
    metadata: DevfileMetadata,
}

#[derive(Debug, Deserialize)]
struct DevfileMetadata {
    tags: Vec<String>,
}

/// `true` when any `metadata.tags` entry equals "deprecated", ignoring case.
pub fn parse_deprecated(raw_content: &str) -> Result<bool, StackError> {
    let head: DevfileHead = serde_yaml::from_str(raw_content).map_err(StackError::definition)?;
    Ok(head
        .metadata
        .tags
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case("deprecated")))
}

#[derive(Debug, Deserialize)]
struct OwnersDoc {
    #[serde(default)]
    reviewers: Option<Vec<String>>,
}

pub fn parse_owners(owners_content: Option<&str>) -> Result<Vec<String>, StackError> {
    let Some(content) = owners_content else {
        return Ok(Vec::new());
    };
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let doc: OwnersDoc = serde_yaml::from_str(content)
        .map_err(|err| StackError::MalformedDefinition(format!("OWNERS: {err}")))?;
    Ok(doc.reviewers.unwrap_or_default())
}
