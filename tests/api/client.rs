use obsidian_mcp::vault::{
    HeadingPosition, NoteWrite, PatchOperation, PatchOptions, Period, VaultClient, VaultConfig,
    VaultError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{API_KEY, StubVault, closed_port};

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let stub = StubVault::builder()
        .json("GET", "/vault/", json!({ "files": ["a.md", "Projects/"] }))
        .start()
        .await
        .unwrap();

    let files = stub.client().list_files_in_vault().await.unwrap();

    assert_eq!(files, vec!["a.md", "Projects/"]);
    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].header("authorization"),
        Some(format!("Bearer {}", API_KEY).as_str())
    );
}

#[tokio::test]
async fn test_list_files_in_dir_normalizes_path() {
    let stub = StubVault::builder()
        .json("GET", "/vault/Projects/2024/", json!({ "files": ["plan.md"] }))
        .start()
        .await
        .unwrap();

    let files = stub
        .client()
        .list_files_in_dir("\\Projects\\\\2024/")
        .await
        .unwrap();

    assert_eq!(files, vec!["plan.md"]);
}

#[tokio::test]
async fn test_file_paths_are_percent_encoded() {
    let stub = StubVault::builder()
        .note("Budget%2050%25%20off.md", "sale")
        .note("Q%26A/why%3F.md", "because")
        .no_content("DELETE", "/vault/Budget%2050%25%20off.md")
        .json("GET", "/vault/50%25%20done/", json!({ "files": ["50% done/a.md"] }))
        .start()
        .await
        .unwrap();
    let client = stub.client();

    assert_eq!(
        client.get_file_contents("Budget 50% off.md").await.unwrap(),
        "sale"
    );
    assert_eq!(
        client.get_file_contents("Q&A/why?.md").await.unwrap(),
        "because"
    );
    client.delete_file("Budget 50% off.md").await.unwrap();
    assert_eq!(
        client.list_files_in_dir("50% done").await.unwrap(),
        vec!["50% done/a.md"]
    );

    let requests = stub.requests();
    assert_eq!(requests[0].path, "/vault/Budget%2050%25%20off.md");
    assert_eq!(requests[1].path, "/vault/Q%26A/why%3F.md");
    assert!(requests[1].query.is_none());
    assert_eq!(requests[2].method, "DELETE");
    assert_eq!(requests[3].path, "/vault/50%25%20done/");
}

#[tokio::test]
async fn test_missing_file_suggests_listing_vault() {
    let stub = StubVault::builder().start().await.unwrap();

    let err = stub
        .client()
        .get_file_contents("Notes/missing.md")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    let message = err.to_string();
    assert!(message.starts_with("Error 40400: Not Found"), "{message}");
    assert!(message.contains("Operation: get_file_contents"));
    assert!(message.contains("filepath='Notes/missing.md'"));
    assert!(message.contains(
        "Suggestion: Check if the file 'Notes/missing.md' exists in your vault. Use list_files_in_vault() to see available files."
    ));
}

#[tokio::test]
async fn test_batch_read_inlines_failures() {
    let stub = StubVault::builder()
        .note("good.md", "hello")
        .start()
        .await
        .unwrap();

    let output = stub
        .client()
        .get_batch_file_contents(&["good.md".to_string(), "missing.md".to_string()])
        .await;

    assert!(output.starts_with(
        "# good.md\n\nhello\n\n---\n\n# missing.md\n\nError reading file: Error 40400: Not Found"
    ));
    assert!(output.ends_with("\n\n---\n\n"));
}

#[tokio::test]
async fn test_patch_rejects_bad_values_before_request() {
    let stub = StubVault::builder().start().await.unwrap();
    let client = stub.client();

    let err = client
        .patch_content(
            "a.md",
            "insert",
            "heading",
            "Tasks",
            "x",
            PatchOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidArgument(_)));
    assert_eq!(
        err.to_string(),
        "Operation must be one of: append, prepend, replace"
    );

    let err = client
        .patch_content(
            "a.md",
            "append",
            "section",
            "Tasks",
            "x",
            PatchOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Target type must be one of: heading, block, frontmatter"
    );

    let err = client
        .patch_content(
            "a.md",
            "append",
            "heading",
            "",
            "x",
            PatchOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Target cannot be empty");

    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_patch_sends_target_headers() {
    let stub = StubVault::builder()
        .no_content("PATCH", "/vault/plan.md")
        .start()
        .await
        .unwrap();

    stub.client()
        .patch_content(
            "/plan.md",
            "prepend",
            "heading",
            "Project::Tasks",
            "- [ ] review",
            PatchOptions {
                create_if_missing: true,
                trim_whitespace: false,
            },
        )
        .await
        .unwrap();

    let request = &stub.requests()[0];
    assert_eq!(request.method, "PATCH");
    assert_eq!(request.header("operation"), Some("prepend"));
    assert_eq!(request.header("target-type"), Some("heading"));
    assert_eq!(request.header("target"), Some("Project%3A%3ATasks"));
    assert_eq!(request.header("create-target-if-missing"), Some("true"));
    assert_eq!(request.header("trim-target-whitespace"), None);
    assert_eq!(request.header("content-type"), Some("text/markdown"));
    assert_eq!(request.body, "- [ ] review");
}

#[tokio::test]
async fn test_patch_rejected_target_suggests_encoding() {
    let stub = StubVault::builder()
        .error("PATCH", "/vault/plan.md", 400, 40080, "Bad Request")
        .start()
        .await
        .unwrap();

    let err = stub
        .client()
        .patch_content(
            "plan.md",
            "append",
            "block",
            "^abc",
            "x",
            PatchOptions::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    let message = err.to_string();
    assert!(message.contains("Error 40080: Bad Request"));
    assert!(message.contains("target_type='block'"));
    assert!(message.contains("Suggestion:"));
}

#[tokio::test]
async fn test_connection_refused_hint() {
    let port = closed_port().await;
    let config = VaultConfig {
        protocol: "http".to_string(),
        port,
        ..VaultConfig::new(API_KEY)
    };

    let err = VaultClient::new(&config)
        .unwrap()
        .get_file_contents("a.md")
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::Request { .. }));
    let message = err.to_string();
    assert!(message.starts_with("Request failed: "), "{message}");
    assert!(message.contains("Operation: get_file_contents"));
    assert!(message.contains(&format!(
        "Verify that Obsidian is running and the Local REST API plugin is enabled. Check that the host (127.0.0.1) and port ({}) are correct.",
        port
    )));
}

#[tokio::test]
async fn test_simple_search_sends_query_params() {
    let stub = StubVault::builder()
        .json(
            "POST",
            "/search/simple/",
            json!([{
                "filename": "a.md",
                "score": 0.5,
                "matches": [{ "match": { "start": 4, "end": 9 }, "context": "the meeting notes" }]
            }]),
        )
        .start()
        .await
        .unwrap();

    let hits = stub.client().search("meeting", 40).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].filename, "a.md");
    assert_eq!(hits[0].matches[0].span.end, 9);

    let query = stub.requests()[0].query.clone().unwrap();
    assert!(query.contains("query=meeting"));
    assert!(query.contains("contextLength=40"));
}

#[tokio::test]
async fn test_complex_search_posts_jsonlogic() {
    let stub = StubVault::builder()
        .json("POST", "/search/", json!([{ "filename": "a.md", "result": true }]))
        .start()
        .await
        .unwrap();

    let query = json!({ "glob": ["*.md", { "var": "path" }] });
    let results = stub.client().search_json(&query).await.unwrap();

    assert_eq!(results[0]["filename"], "a.md");
    let request = &stub.requests()[0];
    assert_eq!(
        request.header("content-type"),
        Some("application/vnd.olrapi.jsonlogic+json")
    );
    assert_eq!(serde_json::from_str::<serde_json::Value>(&request.body).unwrap(), query);
}

#[tokio::test]
async fn test_recent_changes_posts_dql() {
    let stub = StubVault::builder()
        .json("POST", "/search/", json!([]))
        .start()
        .await
        .unwrap();

    stub.client().get_recent_changes(5, 7).await.unwrap();

    let request = &stub.requests()[0];
    assert_eq!(
        request.header("content-type"),
        Some("application/vnd.olrapi.dataview.dql+txt")
    );
    assert_eq!(
        request.body,
        "TABLE file.mtime\nWHERE file.mtime >= date(today) - dur(7 days)\nSORT file.mtime DESC\nLIMIT 5"
    );
}

#[tokio::test]
async fn test_periodic_notes() {
    let stub = StubVault::builder()
        .respond("GET", "/periodic/weekly/", 200, "text/markdown", "# Week 42")
        .json("GET", "/periodic/daily/recent", json!([{ "path": "Daily/2024-01-01.md" }]))
        .start()
        .await
        .unwrap();
    let client = stub.client();

    assert_eq!(client.get_periodic_note(Period::Weekly).await.unwrap(), "# Week 42");

    let notes = client
        .get_recent_periodic_notes(Period::Daily, 3, false)
        .await
        .unwrap();
    assert_eq!(notes[0]["path"], "Daily/2024-01-01.md");

    let query = stub.requests()[1].query.clone().unwrap();
    assert!(query.contains("limit=3"));
    assert!(query.contains("includeContent=false"));
}

#[tokio::test]
async fn test_find_headings_is_empty_on_error() {
    let stub = StubVault::builder()
        .note("plan.md", "# Project\n## Tasks\ntext")
        .start()
        .await
        .unwrap();
    let client = stub.client();

    let paths: Vec<String> = client
        .find_headings("plan.md")
        .await
        .into_iter()
        .map(|h| h.path)
        .collect();
    assert_eq!(paths, vec!["Project", "Project::Tasks"]);

    assert!(client.find_headings("missing.md").await.is_empty());
}

#[tokio::test]
async fn test_add_to_heading_maps_position() {
    let stub = StubVault::builder()
        .no_content("PATCH", "/vault/plan.md")
        .start()
        .await
        .unwrap();

    stub.client()
        .add_to_heading(
            "plan.md",
            "Project::Tasks",
            "- first",
            HeadingPosition::Start,
            PatchOptions {
                create_if_missing: false,
                trim_whitespace: true,
            },
        )
        .await
        .unwrap();

    let request = &stub.requests()[0];
    assert_eq!(request.header("operation"), Some("prepend"));
    assert_eq!(request.header("target-type"), Some("heading"));
    assert_eq!(request.header("trim-target-whitespace"), Some("true"));
}

#[tokio::test]
async fn test_set_frontmatter_field_replaces() {
    let stub = StubVault::builder()
        .no_content("PATCH", "/vault/plan.md")
        .start()
        .await
        .unwrap();

    stub.client()
        .set_frontmatter_field("plan.md", "status", "done", true)
        .await
        .unwrap();

    let request = &stub.requests()[0];
    assert_eq!(request.header("operation"), Some("replace"));
    assert_eq!(request.header("target-type"), Some("frontmatter"));
    assert_eq!(request.header("target"), Some("status"));
    assert_eq!(request.header("create-target-if-missing"), Some("true"));
    assert_eq!(request.body, "done");
}

#[tokio::test]
async fn test_add_tag_appends_to_existing_tags() {
    let stub = StubVault::builder()
        .note("tagged.md", "---\ntags: [work]\n---\nbody")
        .no_content("PATCH", "/vault/tagged.md")
        .start()
        .await
        .unwrap();

    stub.client().add_tag("tagged.md", "#rust").await.unwrap();

    let patch = &stub.requests_with_method("PATCH")[0];
    assert_eq!(patch.header("operation"), Some("append"));
    assert_eq!(patch.header("target"), Some("tags"));
    assert_eq!(patch.body, ", rust");
}

#[tokio::test]
async fn test_add_tag_replaces_when_append_fails() {
    let stub = StubVault::builder()
        .note("tagged.md", "---\ntags: [work]\n---\nbody")
        .start()
        .await
        .unwrap();

    let err = stub.client().add_tag("tagged.md", "rust").await.unwrap_err();

    assert!(err.is_not_found());
    let patches: Vec<(String, String)> = stub
        .requests_with_method("PATCH")
        .into_iter()
        .map(|r| (r.header("operation").unwrap_or_default().to_string(), r.body))
        .collect();
    assert_eq!(
        patches,
        vec![
            ("append".to_string(), ", rust".to_string()),
            ("replace".to_string(), "[rust]".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_add_tag_creates_tags_field() {
    let stub = StubVault::builder()
        .note("plain.md", "no frontmatter here\ntags: not-frontmatter")
        .no_content("PATCH", "/vault/plain.md")
        .start()
        .await
        .unwrap();

    stub.client().add_tag("plain.md", "rust").await.unwrap();

    let patch = &stub.requests_with_method("PATCH")[0];
    assert_eq!(patch.header("operation"), Some("replace"));
    assert_eq!(patch.body, "[rust]");
}

#[tokio::test]
async fn test_create_or_update_note() {
    let stub = StubVault::builder()
        .note("existing.md", "old")
        .no_content("POST", "/vault/existing.md")
        .no_content("PUT", "/vault/existing.md")
        .no_content("PUT", "/vault/new.md")
        .start()
        .await
        .unwrap();
    let client = stub.client();

    let outcome = client
        .create_or_update_note("existing.md", "more", false)
        .await
        .unwrap();
    assert_eq!(outcome, NoteWrite::Appended);

    let outcome = client
        .create_or_update_note("existing.md", "fresh", true)
        .await
        .unwrap();
    assert_eq!(outcome, NoteWrite::Overwritten);

    let outcome = client
        .create_or_update_note("new.md", "hello", false)
        .await
        .unwrap();
    assert_eq!(outcome, NoteWrite::Created);

    let writes: Vec<(String, String)> = stub
        .requests()
        .into_iter()
        .filter(|r| r.method != "GET")
        .map(|r| (r.method, r.path))
        .collect();
    assert_eq!(
        writes,
        vec![
            ("POST".to_string(), "/vault/existing.md".to_string()),
            ("PUT".to_string(), "/vault/existing.md".to_string()),
            ("PUT".to_string(), "/vault/new.md".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_patch_with_fallback_retries_once() {
    let stub = StubVault::builder().start().await.unwrap();

    let err = stub
        .client()
        .patch_with_fallback(
            "plan.md",
            "replace",
            "heading",
            "Tasks",
            "x",
            PatchOptions::default(),
            Some(PatchOperation::Append),
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    let operations: Vec<String> = stub
        .requests_with_method("PATCH")
        .iter()
        .filter_map(|r| r.header("operation").map(str::to_string))
        .collect();
    assert_eq!(operations, vec!["replace", "append"]);
}

#[tokio::test]
async fn test_delete_file() {
    let stub = StubVault::builder()
        .no_content("DELETE", "/vault/old.md")
        .start()
        .await
        .unwrap();
    let client = stub.client();

    client.delete_file("old.md").await.unwrap();
    assert!(client.delete_file("gone.md").await.unwrap_err().is_not_found());
}
