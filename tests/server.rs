//! HTTP API tests.
//!
//! Each test starts the real server on a free port and drives it with
//! `reqwest`, the same way the web page does.

use hriday_mitra::config::Config;
use hriday_mitra::models::FaqRecord;
use hriday_mitra::server::{run_server, MAX_QUERY_CHARS};
use hriday_mitra::store::KnowledgeStore;
use serde_json::{json, Value};
use tempfile::TempDir;

fn test_config(tmp: &TempDir, port: u16) -> Config {
    let mut cfg = Config::with_store(tmp.path().join("faqs.json"));
    cfg.server.bind = format!("127.0.0.1:{}", port);
    cfg
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

/// Start a server over `records` and return its base URL.
async fn start(tmp: &TempDir, records: &[FaqRecord]) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let cfg = test_config(tmp, port);
    KnowledgeStore::new(&cfg.store.path).save(records).unwrap();

    let handle = tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;
    (format!("http://127.0.0.1:{}", port), handle)
}

fn bp_record() -> FaqRecord {
    FaqRecord::new("What is normal blood pressure?", "Below 120/80 mmHg.")
}

#[tokio::test]
async fn test_health_and_page() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp, &[]).await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let page = client.get(&base).send().await.unwrap();
    assert!(page.status().is_success());
    let html = page.text().await.unwrap();
    assert!(html.contains("Admin Panel"));

    let info: Value = client
        .get(format!("{}/api/info", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(info["title"].as_str().unwrap().contains("Hriday Mitra"));

    handle.abort();
}

#[tokio::test]
async fn test_session_conversation() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp, &[bp_record()]).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/sessions", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let session: Value = resp.json().await.unwrap();
    let id = session["id"].as_str().unwrap().to_string();
    assert_eq!(session["turns"].as_array().unwrap().len(), 0);

    let ex: Value = client
        .post(format!("{}/api/sessions/{}/messages", base, id))
        .json(&json!({ "query": "normal bp value" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ex["matched"], true);
    assert!(ex["score"].as_f64().unwrap() >= 70.0);
    assert!(ex["reply"]["content"]
        .as_str()
        .unwrap()
        .starts_with("Below 120/80 mmHg."));

    let ex: Value = client
        .post(format!("{}/api/sessions/{}/messages", base, id))
        .json(&json!({ "query": "best pizza topping" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ex["matched"], false);
    assert_eq!(ex["notices"][0]["level"], "warning");

    let transcript: Value = client
        .get(format!("{}/api/sessions/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let turns = transcript["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 4);
    let roles: Vec<&str> = turns.iter().map(|t| t["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);
    assert_eq!(turns[2]["content"], "best pizza topping");

    // A second session starts empty.
    let other: Value = client
        .post(format!("{}/api/sessions", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(other["id"], transcript["id"]);
    assert_eq!(other["turns"].as_array().unwrap().len(), 0);

    let resp = client
        .delete(format!("{}/api/sessions/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{}/api/sessions/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    handle.abort();
}

#[tokio::test]
async fn test_empty_query_rejected() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp, &[bp_record()]).await;
    let client = reqwest::Client::new();

    let session: Value = client
        .post(format!("{}/api/sessions", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = session["id"].as_str().unwrap();

    let resp = client
        .post(format!("{}/api/sessions/{}/messages", base, id))
        .json(&json!({ "query": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .post(format!("{}/api/sessions/not-a-uuid/messages", base))
        .json(&json!({ "query": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    handle.abort();
}

#[tokio::test]
async fn test_admin_add_and_delete() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp, &[bp_record()]).await;
    let client = reqwest::Client::new();

    let added: Value = client
        .post(format!("{}/api/faqs", base))
        .json(&json!({ "question": "  What is CVD?  ", "answer": "Cardiovascular disease." }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(added["faqs"].as_array().unwrap().len(), 2);
    assert_eq!(added["faqs"][1]["question"], "What is CVD?");
    assert_eq!(added["notices"][0]["level"], "success");

    let resp = client
        .post(format!("{}/api/faqs", base))
        .json(&json!({ "question": " ", "answer": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"]["message"],
        "Please provide both a question and an answer."
    );

    let deleted: Value = client
        .delete(format!("{}/api/faqs/0", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted["notices"][0]["message"], "FAQ deleted. Please refresh the page.");

    let listed: Value = client
        .get(format!("{}/api/faqs", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let faqs = listed["faqs"].as_array().unwrap();
    assert_eq!(faqs.len(), 1);
    assert_eq!(faqs[0]["question"], "What is CVD?");

    let resp = client
        .delete(format!("{}/api/faqs/5", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let on_disk = KnowledgeStore::new(tmp.path().join("faqs.json")).load().unwrap();
    assert_eq!(
        on_disk,
        vec![FaqRecord::new("What is CVD?", "Cardiovascular disease.")]
    );

    handle.abort();
}

#[tokio::test]
async fn test_missing_store_is_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp, &[]).await;
    std::fs::remove_file(tmp.path().join("faqs.json")).unwrap();
    let client = reqwest::Client::new();

    let listed: Value = client
        .get(format!("{}/api/faqs", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["faqs"].as_array().unwrap().len(), 0);
    assert_eq!(listed["notices"][0]["level"], "error");

    let session: Value = client
        .post(format!("{}/api/sessions", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ex: Value = client
        .post(format!("{}/api/sessions/{}/messages", base, session["id"].as_str().unwrap()))
        .json(&json!({ "query": "What is normal blood pressure?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ex["matched"], false);
    assert_eq!(ex["score"], 0.0);

    handle.abort();
}

#[tokio::test]
async fn test_overlong_query_rejected() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp, &[bp_record()]).await;
    let client = reqwest::Client::new();

    let session: Value = client
        .post(format!("{}/api/sessions", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = session["id"].as_str().unwrap();

    let resp = client
        .post(format!("{}/api/sessions/{}/messages", base, id))
        .json(&json!({ "query": "blood pressure ".repeat(20_000) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains(&MAX_QUERY_CHARS.to_string()));

    // A query right at the limit is still answered.
    let at_limit = "a".repeat(MAX_QUERY_CHARS);
    let resp = client
        .post(format!("{}/api/sessions/{}/messages", base, id))
        .json(&json!({ "query": at_limit }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let transcript: Value = client
        .get(format!("{}/api/sessions/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(transcript["turns"].as_array().unwrap().len(), 2);

    handle.abort();
}

#[tokio::test]
async fn test_extractor_rejections_use_error_contract() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp, &[bp_record()]).await;
    let client = reqwest::Client::new();

    let session: Value = client
        .post(format!("{}/api/sessions", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = session["id"].as_str().unwrap();

    let resp = client
        .post(format!("{}/api/sessions/{}/messages", base, id))
        .header("Content-Type", "application/json")
        .body("{\"query\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .post(format!("{}/api/faqs", base))
        .json(&json!({ "question": "missing answer" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .delete(format!("{}/api/faqs/first", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let on_disk = KnowledgeStore::new(tmp.path().join("faqs.json")).load().unwrap();
    assert_eq!(on_disk, vec![bp_record()]);

    handle.abort();
}
