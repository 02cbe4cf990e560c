//! Integration tests for the download engine.
//!
//! These tests verify the full fetch flow with mock HTTP servers.

use csvdl_core::{DownloadEngine, EngineError, HttpClient, Row, Table};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to build an input table over `(species, image_url)` pairs.
fn input_table(rows: &[(&str, &str)]) -> Table {
    Table::new(
        vec!["species".to_string(), "image_url".to_string()],
        rows.iter()
            .map(|(name, url)| Row::new(vec![(*name).to_string(), (*url).to_string()]))
            .collect(),
    )
}

/// Helper to mount a file endpoint on a mock server.
async fn mount_file(server: &MockServer, path_str: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_run_downloads_all_rows_and_writes_output_table() {
    let server = MockServer::start().await;
    mount_file(&server, "/frog.jpg", b"frog bytes").await;
    mount_file(&server, "/bat.png", b"bat bytes").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let frog_url = format!("{}/frog.jpg", server.uri());
    let bat_url = format!("{}/bat.png", server.uri());
    let table = input_table(&[
        ("Tree Frog", frog_url.as_str()),
        ("Bat", bat_url.as_str()),
    ]);
    let engine =
        DownloadEngine::new(table, "image_url", "species", temp_dir.path(), None).unwrap();
    let stats = engine.run(&HttpClient::new()).await.unwrap();

    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.already_downloaded, 0);

    let frog = temp_dir.path().join("tree_frog_001.jpg");
    let bat = temp_dir.path().join("bat_001.png");
    assert_eq!(std::fs::read(&frog).unwrap(), b"frog bytes");
    assert_eq!(std::fs::read(&bat).unwrap(), b"bat bytes");

    let output = Table::read(&temp_dir.path().join("output.csv")).unwrap();
    assert_eq!(
        output.columns(),
        ["species", "image_url", "output_filename"]
    );
    // Rows come back sorted by the name column.
    assert_eq!(output.rows()[0].get(0), Some("Bat"));
    assert_eq!(output.rows()[0].get(2), Some("bat_001.png"));
    assert_eq!(output.rows()[1].get(2), Some("tree_frog_001.jpg"));
}

#[tokio::test]
async fn test_second_run_is_idempotent_and_issues_no_requests() {
    let server = MockServer::start().await;
    mount_file(&server, "/a.jpg", b"a").await;
    mount_file(&server, "/b.jpg", b"b").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let rows = [
        ("frog", format!("{}/a.jpg", server.uri())),
        ("bat", format!("{}/b.jpg", server.uri())),
    ];
    let rows: Vec<(&str, &str)> = rows.iter().map(|(n, u)| (*n, u.as_str())).collect();

    let engine = DownloadEngine::new(
        input_table(&rows),
        "image_url",
        "species",
        temp_dir.path(),
        None,
    )
    .unwrap();
    let first = engine.run(&HttpClient::new()).await.unwrap();
    assert_eq!(first.succeeded, 2);

    let engine = DownloadEngine::new(
        input_table(&rows),
        "image_url",
        "species",
        temp_dir.path(),
        None,
    )
    .unwrap();
    let second = engine.run(&HttpClient::new()).await.unwrap();

    assert_eq!(second.already_downloaded, 2);
    assert_eq!(second.succeeded, 0);
    assert_eq!(second.failed, 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests.len(),
        2,
        "second run must not issue any network requests"
    );
}

#[tokio::test]
async fn test_attempt_cap_bounds_requests_but_not_names() {
    let server = MockServer::start().await;
    mount_file(&server, "/a.jpg", b"a").await;
    mount_file(&server, "/b.jpg", b"b").await;
    mount_file(&server, "/c.jpg", b"c").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let urls = [
        format!("{}/a.jpg", server.uri()),
        format!("{}/b.jpg", server.uri()),
        format!("{}/c.jpg", server.uri()),
    ];
    let table = input_table(&[
        ("ant", urls[0].as_str()),
        ("bee", urls[1].as_str()),
        ("cat", urls[2].as_str()),
    ]);

    let engine =
        DownloadEngine::new(table, "image_url", "species", temp_dir.path(), Some(1)).unwrap();
    let stats = engine.run(&HttpClient::new()).await.unwrap();

    assert_eq!(stats.succeeded, 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(temp_dir.path().join("ant_001.jpg").exists());
    assert!(!temp_dir.path().join("bee_001.jpg").exists());

    // Every row still carries its proposed filename in the output table.
    let output = Table::read(&temp_dir.path().join("output.csv")).unwrap();
    let idx = output.column_index("output_filename").unwrap();
    let filenames: Vec<&str> = output.rows().iter().map(|r| r.get(idx).unwrap()).collect();
    assert_eq!(filenames, ["ant_001.jpg", "bee_001.jpg", "cat_001.jpg"]);
}

#[tokio::test]
async fn test_attempt_cap_of_zero_still_writes_output_table() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let table = input_table(&[("frog", "http://127.0.0.1:1/a.jpg")]);
    let engine =
        DownloadEngine::new(table, "image_url", "species", temp_dir.path(), Some(0)).unwrap();
    let stats = engine.run(&HttpClient::new()).await.unwrap();

    assert_eq!(stats.succeeded + stats.failed, 0);
    assert!(temp_dir.path().join("output.csv").exists());
}

#[tokio::test]
async fn test_per_item_failure_does_not_abort_the_run() {
    let server = MockServer::start().await;
    mount_file(&server, "/good.jpg", b"ok").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    // Port 1 refuses connections, so the first sorted row fails.
    let bad_url = "http://127.0.0.1:1/bad.jpg";
    let good_url = format!("{}/good.jpg", server.uri());
    let table = input_table(&[("aardvark", bad_url), ("zebra", good_url.as_str())]);

    let engine =
        DownloadEngine::new(table, "image_url", "species", temp_dir.path(), None).unwrap();
    let stats = engine.run(&HttpClient::new()).await.unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.succeeded, 1);
    assert!(stats.failed_urls.contains(bad_url));
    assert!(!temp_dir.path().join("aardvark_001.jpg").exists());
    assert!(temp_dir.path().join("zebra_001.jpg").exists());
    assert!(temp_dir.path().join("output.csv").exists());
}

#[tokio::test]
async fn test_non_success_status_body_is_kept_and_counted_succeeded() {
    // Carried behavior boundary: a received response is written whatever
    // its status, and counts as succeeded.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404).set_body_bytes(b"not found".to_vec()))
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let url = format!("{}/gone.jpg", server.uri());
    let table = input_table(&[("dodo", url.as_str())]);
    let engine =
        DownloadEngine::new(table, "image_url", "species", temp_dir.path(), None).unwrap();
    let stats = engine.run(&HttpClient::new()).await.unwrap();

    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(
        std::fs::read(temp_dir.path().join("dodo_001.jpg")).unwrap(),
        b"not found"
    );
}

#[tokio::test]
async fn test_construction_failure_leaves_no_side_effects() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp_dir.path().join("images");

    let table = input_table(&[("frog", "http://x/a.jpg")]);
    let result = DownloadEngine::new(table, "no_such_column", "species", &output_dir, None);

    assert!(matches!(result, Err(EngineError::MissingColumn { .. })));
    assert!(
        !output_dir.exists(),
        "failed construction must not create the output directory"
    );
}

#[tokio::test]
async fn test_duplicate_names_get_distinct_files() {
    let server = MockServer::start().await;
    mount_file(&server, "/one.jpg", b"one").await;
    mount_file(&server, "/two.jpg", b"two").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let urls = [
        format!("{}/one.jpg", server.uri()),
        format!("{}/two.jpg", server.uri()),
    ];
    let table = input_table(&[("Same Name", urls[0].as_str()), ("Same Name", urls[1].as_str())]);
    let engine =
        DownloadEngine::new(table, "image_url", "species", temp_dir.path(), None).unwrap();
    let stats = engine.run(&HttpClient::new()).await.unwrap();

    assert_eq!(stats.succeeded, 2);
    assert_eq!(
        std::fs::read(temp_dir.path().join("same_name_001.jpg")).unwrap(),
        b"one"
    );
    assert_eq!(
        std::fs::read(temp_dir.path().join("same_name_002.jpg")).unwrap(),
        b"two"
    );
}
