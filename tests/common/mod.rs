#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const MASTER_KEY: &str = "masterKey";

/// The binary with a clean environment: no credential and no log filter
/// inherited from the machine running the tests.
pub fn bare_cli() -> Command {
    let mut cmd = Command::cargo_bin("meilisearch-cli").unwrap();
    cmd.env_remove("MEILI_HTTP_ADDR")
        .env_remove("MEILI_MASTER_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// The binary configured through the environment to talk to `url`.
pub fn cli(url: &str) -> Command {
    let mut cmd = bare_cli();
    cmd.env("MEILI_HTTP_ADDR", url)
        .env("MEILI_MASTER_KEY", MASTER_KEY)
        .args(["--interval", "1"]);
    cmd
}

/// Nothing listens there, any request fails to connect.
pub fn offline_cli() -> Command {
    cli("http://127.0.0.1:1")
}

pub fn enqueued(uid: u64) -> Value {
    json!({
        "taskUid": uid,
        "indexUid": "movies",
        "status": "enqueued",
        "type": "documentAdditionOrUpdate",
        "enqueuedAt": "2022-10-04T13:38:58.101436Z",
    })
}

pub fn task(uid: u64, status: &str) -> Value {
    json!({
        "uid": uid,
        "indexUid": "movies",
        "status": status,
        "type": "documentAdditionOrUpdate",
        "duration": "PT0.01S",
    })
}

/// Answers `GET /tasks/{uid}` with `processing` once, then with `status`.
pub async fn mount_task(server: &MockServer, uid: u64, status: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/tasks/{uid}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(task(uid, "processing")))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/tasks/{uid}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(status))
        .mount(server)
        .await;
}
