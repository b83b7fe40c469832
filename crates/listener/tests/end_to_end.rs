//! Drives a real listener over TCP with an HTTP client.

use std::sync::Arc;

use listener::{ApiState, WebhookServer};
use serde_json::{json, Value};
use store::InMemoryEventStore;

struct Running {
    base: String,
    shutdown: listener::ShutdownHandle,
    task: tokio::task::JoinHandle<Result<(), listener::ListenerError>>,
}

impl Running {
    async fn start() -> Self {
        let state = ApiState::new(Arc::new(InMemoryEventStore::new()));
        let server = WebhookServer::bind("127.0.0.1:0", state).expect("bind");
        let addr = server.local_addr().expect("tcp address");
        let shutdown = server.shutdown_handle();
        let task = tokio::spawn(server.run());
        Self {
            base: format!("http://{addr}"),
            shutdown,
            task,
        }
    }

    async fn stop(self) {
        self.shutdown.shutdown();
        self.task.await.expect("join").expect("server result");
    }
}

async fn deliver(client: &reqwest::Client, base: &str, event: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{base}/webhook"))
        .header("X-GitHub-Event", event)
        .json(&body)
        .send()
        .await
        .expect("send")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn webhook_deliveries_are_listed_and_summarised() {
    let server = Running::start().await;
    let client = reqwest::Client::new();

    let push = deliver(
        &client,
        &server.base,
        "push",
        json!({
            "pusher": {"name": "alice"},
            "ref": "refs/heads/main",
            "repository": {"name": "repo1"},
        }),
    )
    .await;
    assert_eq!(push.status(), 200);
    assert_eq!(
        push.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(push.json::<Value>().await.unwrap(), json!({"status": "success"}));

    let opened = deliver(
        &client,
        &server.base,
        "pull_request",
        json!({
            "action": "opened",
            "pull_request": {
                "number": 8,
                "user": {"login": "bob"},
                "head": {"ref": "feature"},
                "base": {"ref": "main", "repo": {"name": "repo1"}},
            },
        }),
    )
    .await;
    assert_eq!(opened.status(), 200);

    let ping = deliver(&client, &server.base, "ping", json!({"zen": "Keep it simple."})).await;
    assert_eq!(
        ping.json::<Value>().await.unwrap(),
        json!({"status": "ignored", "reason": "Unhandled event type: ping"})
    );

    let events: Value = client
        .get(format!("{}/events?type=pull_request", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(events["count"], 1);
    assert_eq!(events["events"][0]["type"], "pull_request");
    assert_eq!(events["events"][0]["pr_number"], 8);
    assert_eq!(events["events"][0]["action"], "opened");

    let summary: Value = client
        .get(format!("{}/events/summary", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["total_events"], 2);

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejected_requests_carry_json_errors() {
    let server = Running::start().await;
    let client = reqwest::Client::new();

    let missing_header = client
        .post(format!("{}/webhook", server.base))
        .json(&json!({"ref": "refs/heads/main"}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_header.status(), 400);
    assert_eq!(
        missing_header.json::<Value>().await.unwrap(),
        json!({"error": "Missing X-GitHub-Event header"})
    );

    let not_found = client
        .get(format!("{}/missing", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(not_found.status(), 404);

    let preflight = client
        .request(reqwest::Method::OPTIONS, format!("{}/webhook", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(preflight.status(), 204);

    server.stop().await;
}
