//! End-to-end sync passes against a mocked Google API and a SQLite store.

use std::path::Path;

use mockito::{Matcher, Mock, Server};
use serde_json::json;
use sheetsync_core::storage::SqliteStore;
use sheetsync_core::{
    build_scheduler, CommunityGroup, Config, CoreError, DocumentError, Secrets, Speaker, StateStore,
    SyncRecord,
};

fn write_config(dir: &Path, server_url: &str) -> Config {
    std::fs::write(
        dir.join("secrets.json"),
        json!({
            "google": {
                "clientId": "client",
                "clientSecret": "secret",
                "token": {"access_token": "test-token", "refresh_token": "refresh"}
            }
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.join("sheets.json"),
        json!([{"table": "t1", "sheet": "s1"}, {"table": "t2", "sheet": "s2"}]).to_string(),
    )
    .unwrap();

    let config_path = dir.join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
            targets_file = "sheets.json"

            [store]
            backend = "sqlite"
            sqlite_path = "state.db"

            [google]
            drive_base_url = "{server_url}"
            sheets_base_url = "{server_url}"
            token_url = "{server_url}/token"
            "#
        ),
    )
    .unwrap();

    Config::load(Some(&config_path)).unwrap()
}

async fn mock_modified(server: &mut Server, id: &str, modified: &str) -> Mock {
    server
        .mock("GET", format!("/drive/v3/files/{id}").as_str())
        .match_query(Matcher::UrlEncoded("fields".into(), "modifiedTime".into()))
        .match_header("authorization", "Bearer test-token")
        .with_header("content-type", "application/json")
        .with_body(json!({ "modifiedTime": modified }).to_string())
        .create_async()
        .await
}

async fn mock_values(server: &mut Server, id: &str, values: serde_json::Value) -> Mock {
    server
        .mock(
            "GET",
            Matcher::Regex(format!(r"^/v4/spreadsheets/{id}/values/C2(:|%3A)J$")),
        )
        .with_header("content-type", "application/json")
        .with_body(json!({ "range": "Sheet1!C2:J", "values": values }).to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn first_pass_writes_every_target() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.url());

    mock_modified(&mut server, "s1", "2024-06-01T00:00:00Z").await;
    mock_modified(&mut server, "s2", "2024-06-01T00:00:00Z").await;
    mock_values(
        &mut server,
        "s1",
        json!([
            ["C1", "09:00", "Alice", "Acme", "Talk", "Desc"],
            ["", "10:00", "Bob", "Acme", "Talk2", "Desc2"]
        ]),
    )
    .await;
    mock_values(&mut server, "s2", json!([[" Rust ", "12:00", "Carol"]])).await;

    let secrets = Secrets::load(&config.secrets_path()).unwrap();
    let scheduler = build_scheduler(&config, &secrets).unwrap();
    let summary = scheduler.run_pass().await.unwrap();
    assert_eq!(summary.updated, vec!["t1", "t2"]);
    drop(scheduler);

    let store = SqliteStore::open(&config.sqlite_path().unwrap()).unwrap();
    let t1 = serde_json::to_value(store.read("t1").await.unwrap().unwrap()).unwrap();
    assert_eq!(t1["lastFileUpdate"], "2024-06-01T00:00:00Z");
    assert_eq!(t1["data"][0]["community"], "C1");
    assert_eq!(t1["data"][0]["program"][1]["speaker"], "Bob");

    let t2 = store.read("t2").await.unwrap().unwrap();
    let groups = t2.data.unwrap();
    assert_eq!(groups[0].community.as_deref(), Some("Rust"));
    assert_eq!(groups[0].program[0].company, None);
}

#[tokio::test]
async fn unchanged_sheets_are_not_refetched() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.url());

    mock_modified(&mut server, "s1", "2024-06-01T00:00:00Z").await;
    mock_modified(&mut server, "s2", "2024-06-01T00:00:00Z").await;
    let values_s1 = server
        .mock("GET", Matcher::Regex(r"^/v4/spreadsheets/s1/values/".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"values": [["A", "09:00"]]}"#)
        .expect(1)
        .create_async()
        .await;
    mock_values(&mut server, "s2", json!([["B", "09:00"]])).await;

    let secrets = Secrets::load(&config.secrets_path()).unwrap();
    let scheduler = build_scheduler(&config, &secrets).unwrap();

    scheduler.run_pass().await.unwrap();
    let second = scheduler.run_pass().await.unwrap();

    assert!(second.updated.is_empty());
    assert_eq!(second.unchanged, vec!["t1", "t2"]);
    values_s1.assert_async().await;
}

#[tokio::test]
async fn missing_document_fails_the_pass_before_later_targets() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.url());

    server
        .mock("GET", "/drive/v3/files/s1")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"code": 404, "message": "File not found: s1."}}"#)
        .create_async()
        .await;
    let never = server
        .mock("GET", "/drive/v3/files/s2")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let secrets = Secrets::load(&config.secrets_path()).unwrap();
    let scheduler = build_scheduler(&config, &secrets).unwrap();

    let err = scheduler.run_pass().await.unwrap_err();
    assert!(err.to_string().contains("File not found: s1."));
    never.assert_async().await;
}

#[tokio::test]
async fn garbled_values_response_keeps_stored_program() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.url());

    let good = SyncRecord {
        last_file_update: "2024-06-01T00:00:00Z".into(),
        data: Some(vec![CommunityGroup {
            community: Some("C1".into()),
            program: vec![Speaker {
                time: Some("09:00".into()),
                speaker: Some("Alice".into()),
                ..Default::default()
            }],
        }]),
    };
    {
        let store = SqliteStore::open(&config.sqlite_path().unwrap()).unwrap();
        store.write("t1", &good).await.unwrap();
    }

    mock_modified(&mut server, "s1", "2024-06-02T00:00:00Z").await;
    server
        .mock("GET", Matcher::Regex(r"^/v4/spreadsheets/s1/values/".into()))
        .with_header("content-type", "text/html")
        .with_body("<html>truncated garbage")
        .create_async()
        .await;

    let secrets = Secrets::load(&config.secrets_path()).unwrap();
    let scheduler = build_scheduler(&config, &secrets).unwrap();
    let err = scheduler.run_pass().await.unwrap_err();
    assert!(matches!(err, CoreError::Document(DocumentError::Decode(_))));
    drop(scheduler);

    let store = SqliteStore::open(&config.sqlite_path().unwrap()).unwrap();
    assert_eq!(store.read("t1").await.unwrap(), Some(good));
}
