use std::time::Duration;

use reqwest::{
    Client, RequestBuilder, Response,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{
    ApiFailure, ErrorContext, RequestFailure, VaultError, api_suggestion, describe_request_error,
};
use super::headings::{Heading, parse_headings};
use super::path::{encode_path, normalize_path};
use super::types::{FileListing, PatchOperation, PatchOptions, Period, SearchHit, TargetType};

pub const DEFAULT_PROTOCOL: &str = "https";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 27124;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(6);

const MARKDOWN: &str = "text/markdown";
const JSONLOGIC: &str = "application/vnd.olrapi.jsonlogic+json";
const DATAVIEW_DQL: &str = "application/vnd.olrapi.dataview.dql+txt";

/// Connection settings for the Local REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub verify_ssl: bool,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl VaultConfig {
    /// Config with default protocol, host, port and timeouts.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: api_key.into(),
            verify_ssl: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Error body returned by the API on failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiErrorBody {
    error_code: Option<i64>,
    message: Option<String>,
}

/// Client for the Local REST API. Every method issues one request.
#[derive(Debug, Clone)]
pub struct VaultClient {
    http: Client,
    base_url: String,
    api_key: String,
    host: String,
    port: u16,
}

impl VaultClient {
    pub fn new(config: &VaultConfig) -> Result<Self, VaultError> {
        let http = Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(VaultError::Setup)?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            api_key: config.api_key.clone(),
            host: config.host.clone(),
            port: config.port,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn vault_url(&self, filepath: &str) -> String {
        format!("{}/vault/{}", self.base_url, encode_path(filepath))
    }

    /// List files and directories in the root of the vault.
    pub async fn list_files_in_vault(&self) -> Result<Vec<String>, VaultError> {
        let operation = "list_files_in_vault";
        let url = format!("{}/vault/", self.base_url);

        let response = self.send(self.http.get(url), operation, Vec::new()).await?;
        let listing: FileListing = self.decode_json(response, operation).await?;
        Ok(listing.files)
    }

    /// List files and directories in a vault directory. Empty directories are not returned.
    pub async fn list_files_in_dir(&self, dirpath: &str) -> Result<Vec<String>, VaultError> {
        let operation = "list_files_in_dir";
        let dirpath = normalize_path(dirpath);
        let url = format!("{}/vault/{}/", self.base_url, encode_path(&dirpath));

        let context = vec![("dirpath", dirpath)];
        let response = self.send(self.http.get(url), operation, context).await?;
        let listing: FileListing = self.decode_json(response, operation).await?;
        Ok(listing.files)
    }

    /// Raw content of a single file.
    pub async fn get_file_contents(&self, filepath: &str) -> Result<String, VaultError> {
        let operation = "get_file_contents";
        let filepath = normalize_path(filepath);
        let url = self.vault_url(&filepath);

        let context = vec![("filepath", filepath)];
        let response = self.send(self.http.get(url), operation, context).await?;
        self.decode_text(response, operation).await
    }

    /// Contents of several files, each under a `# {filepath}` header.
    ///
    /// Files are read one after another. A file that cannot be read gets an
    /// inline error block instead of aborting the batch.
    pub async fn get_batch_file_contents(&self, filepaths: &[String]) -> String {
        let mut result = String::new();

        for filepath in filepaths {
            let block = match self.get_file_contents(filepath).await {
                Ok(content) => format!("# {}\n\n{}\n\n---\n\n", filepath, content),
                Err(err) => {
                    debug!(%filepath, "batch read failed: {}", err);
                    format!("# {}\n\nError reading file: {}\n\n---\n\n", filepath, err)
                }
            };
            result.push_str(&block);
        }

        result
    }

    /// Plain text search across all files.
    pub async fn search(
        &self,
        query: &str,
        context_length: u32,
    ) -> Result<Vec<SearchHit>, VaultError> {
        let operation = "search";
        let url = format!("{}/search/simple/", self.base_url);
        let request = self.http.post(url).query(&[
            ("query", query.to_string()),
            ("contextLength", context_length.to_string()),
        ]);

        let context = vec![
            ("query", query.to_string()),
            ("context_length", context_length.to_string()),
        ];
        let response = self.send(request, operation, context).await?;
        self.decode_json(response, operation).await
    }

    /// Search with a JsonLogic query object.
    pub async fn search_json(&self, query: &Value) -> Result<Value, VaultError> {
        let operation = "search_json";
        let url = format!("{}/search/", self.base_url);
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSONLOGIC)
            .body(query.to_string());

        let context = vec![("query", query.to_string())];
        let response = self.send(request, operation, context).await?;
        self.decode_json(response, operation).await
    }

    /// Append content to a new or existing file.
    pub async fn append_content(&self, filepath: &str, content: &str) -> Result<(), VaultError> {
        let operation = "append_content";
        let filepath = normalize_path(filepath);
        let request = self
            .http
            .post(self.vault_url(&filepath))
            .header(CONTENT_TYPE, MARKDOWN)
            .body(content.to_string());

        self.send(request, operation, vec![("filepath", filepath)]).await?;
        Ok(())
    }

    /// Create a file, or replace its whole content.
    pub async fn put_content(&self, filepath: &str, content: &str) -> Result<(), VaultError> {
        let operation = "put_content";
        let filepath = normalize_path(filepath);
        let request = self
            .http
            .put(self.vault_url(&filepath))
            .header(CONTENT_TYPE, MARKDOWN)
            .body(content.to_string());

        self.send(request, operation, vec![("filepath", filepath)]).await?;
        Ok(())
    }

    /// Insert content relative to a heading, block reference or frontmatter field.
    ///
    /// `operation` and `target_type` are checked before any request is made.
    pub async fn patch_content(
        &self,
        filepath: &str,
        operation: &str,
        target_type: &str,
        target: &str,
        content: &str,
        options: PatchOptions,
    ) -> Result<(), VaultError> {
        let patch_operation: PatchOperation = operation.parse()?;
        let target_type: TargetType = target_type.parse()?;
        if target.is_empty() {
            return Err(VaultError::invalid_argument("Target cannot be empty"));
        }

        let filepath = normalize_path(filepath);
        let encoded_target = urlencoding::encode(target);

        let mut request = self
            .http
            .patch(self.vault_url(&filepath))
            .header(CONTENT_TYPE, MARKDOWN)
            .header("Operation", patch_operation.as_str())
            .header("Target-Type", target_type.as_str())
            .header("Target", encoded_target.into_owned())
            .body(content.to_string());

        if options.create_if_missing {
            request = request.header("Create-Target-If-Missing", HeaderValue::from_static("true"));
        }
        if options.trim_whitespace {
            request = request.header("Trim-Target-Whitespace", HeaderValue::from_static("true"));
        }

        let context = vec![
            ("filepath", filepath),
            ("operation", patch_operation.to_string()),
            ("target_type", target_type.to_string()),
            ("target", target.to_string()),
            ("create_if_missing", options.create_if_missing.to_string()),
            ("trim_whitespace", options.trim_whitespace.to_string()),
        ];
        self.send(request, "patch_content", context).await?;
        Ok(())
    }

    /// Delete a file or directory.
    pub async fn delete_file(&self, filepath: &str) -> Result<(), VaultError> {
        let operation = "delete_file";
        let filepath = normalize_path(filepath);
        let request = self.http.delete(self.vault_url(&filepath));

        self.send(request, operation, vec![("filepath", filepath)]).await?;
        Ok(())
    }

    /// Content of the current periodic note for `period`.
    pub async fn get_periodic_note(&self, period: Period) -> Result<String, VaultError> {
        let operation = "get_periodic_note";
        let url = format!("{}/periodic/{}/", self.base_url, period);

        let context = vec![("period", period.to_string())];
        let response = self.send(self.http.get(url), operation, context).await?;
        self.decode_text(response, operation).await
    }

    /// Most recent periodic notes for `period`.
    pub async fn get_recent_periodic_notes(
        &self,
        period: Period,
        limit: u32,
        include_content: bool,
    ) -> Result<Value, VaultError> {
        let operation = "get_recent_periodic_notes";
        let url = format!("{}/periodic/{}/recent", self.base_url, period);
        let request = self.http.get(url).query(&[
            ("limit", limit.to_string()),
            ("includeContent", include_content.to_string()),
        ]);

        let context = vec![
            ("period", period.to_string()),
            ("limit", limit.to_string()),
            ("include_content", include_content.to_string()),
        ];
        let response = self.send(request, operation, context).await?;
        self.decode_json(response, operation).await
    }

    /// Files modified within the last `days` days, newest first.
    pub async fn get_recent_changes(&self, limit: u32, days: u32) -> Result<Value, VaultError> {
        let operation = "get_recent_changes";
        let url = format!("{}/search/", self.base_url);
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, DATAVIEW_DQL)
            .body(recent_changes_query(limit, days));

        let context = vec![("limit", limit.to_string()), ("days", days.to_string())];
        let response = self.send(request, operation, context).await?;
        self.decode_json(response, operation).await
    }

    /// Headings of a note; empty when the note cannot be read.
    pub async fn find_headings(&self, filepath: &str) -> Vec<Heading> {
        match self.get_file_contents(filepath).await {
            Ok(content) => parse_headings(&content),
            Err(err) => {
                debug!(%filepath, "heading lookup failed: {}", err);
                Vec::new()
            }
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        operation: &'static str,
        context: ErrorContext,
    ) -> Result<Response, VaultError> {
        debug!(operation, "sending request");

        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.request_error(e, operation))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let error_body: ApiErrorBody = if body.is_empty() {
            ApiErrorBody::default()
        } else {
            serde_json::from_slice(&body).unwrap_or_default()
        };
        warn!(operation, status = status.as_u16(), "request failed");

        let suggestion = api_suggestion(status.as_u16(), operation, &context);
        Err(VaultError::Api(ApiFailure {
            status: status.as_u16(),
            code: error_body.error_code.unwrap_or(-1),
            message: error_body
                .message
                .unwrap_or_else(|| "<unknown>".to_string()),
            operation,
            context,
            suggestion,
        }))
    }

    async fn decode_json<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
        operation: &'static str,
    ) -> Result<T, VaultError> {
        response
            .json()
            .await
            .map_err(|e| self.request_error(e, operation))
    }

    async fn decode_text(
        &self,
        response: Response,
        operation: &'static str,
    ) -> Result<String, VaultError> {
        response
            .text()
            .await
            .map_err(|e| self.request_error(e, operation))
    }

    fn request_error(&self, source: reqwest::Error, operation: &'static str) -> VaultError {
        let suggestion = source.is_connect().then(|| {
            format!(
                "Verify that Obsidian is running and the Local REST API plugin is enabled. Check that the host ({}) and port ({}) are correct.",
                self.host, self.port
            )
        });
        warn!(operation, "request error: {}", source);

        VaultError::Request {
            failure: RequestFailure {
                detail: describe_request_error(&source),
                operation,
                suggestion,
            },
            source,
        }
    }
}

/// Dataview DQL query listing recently modified files.
fn recent_changes_query(limit: u32, days: u32) -> String {
    [
        "TABLE file.mtime".to_string(),
        format!("WHERE file.mtime >= date(today) - dur({} days)", days),
        "SORT file.mtime DESC".to_string(),
        format!("LIMIT {}", limit),
    ]
    .join("\n")
}
