use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    daily_goal: u32,
    reminder_interval: u32,
    wake_start: String,
    wake_end: String,
    notifications_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryItem {
    amount: u32,
    time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard {
    date: String,
    settings: Settings,
    today_total: u64,
    progress: u32,
    remaining: u64,
    history: Vec<HistoryItem>,
    next_reminder: Option<String>,
    permission: String,
    request_permission: bool,
    notice: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Notifications {
    notifications: Vec<serde_json::Value>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("hydrate_plus_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/state")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(data_dir: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_hydrate_plus"))
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", data_dir)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(&unique_data_dir()).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn dashboard(client: &Client, base_url: &str) -> Dashboard {
    client
        .get(format!("{base_url}/api/state"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn post(client: &Client, url: String, body: serde_json::Value) -> reqwest::Response {
    client.post(url).json(&body).send().await.unwrap()
}

#[tokio::test]
async fn http_intake_updates_today_total() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = dashboard(&client, &server.base_url).await;

    let response = post(
        &client,
        format!("{}/api/intake", server.base_url),
        serde_json::json!({ "amount": 250 }),
    )
    .await;
    assert!(response.status().is_success());
    let after: Dashboard = response.json().await.unwrap();

    assert_eq!(after.today_total, before.today_total + 250);
    assert_eq!(after.history.len(), before.history.len() + 1);
    assert_eq!(after.history[0].amount, 250);
    assert_eq!(after.history[0].time.len(), 5);
    assert!(!after.date.is_empty());
}

#[tokio::test]
async fn http_invalid_intake_is_ignored() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = dashboard(&client, &server.base_url).await;

    for amount in [serde_json::json!("abc"), serde_json::json!(-20), serde_json::json!(0)] {
        let response = post(
            &client,
            format!("{}/api/intake", server.base_url),
            serde_json::json!({ "amount": amount }),
        )
        .await;
        assert!(response.status().is_success());
    }

    let after = dashboard(&client, &server.base_url).await;
    assert_eq!(after.today_total, before.today_total);
    assert_eq!(after.history.len(), before.history.len());
}

#[tokio::test]
async fn http_settings_and_reset() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = post(
        &client,
        format!("{}/api/settings", server.base_url),
        serde_json::json!({ "dailyGoal": 1000, "wakeStart": "06:30" }),
    )
    .await;
    assert!(response.status().is_success());

    let rejected = post(
        &client,
        format!("{}/api/settings", server.base_url),
        serde_json::json!({ "reminderInterval": 0 }),
    )
    .await;
    assert_eq!(rejected.status(), reqwest::StatusCode::BAD_REQUEST);

    post(
        &client,
        format!("{}/api/intake", server.base_url),
        serde_json::json!({ "amount": "400" }),
    )
    .await;

    let reset: Dashboard = post(
        &client,
        format!("{}/api/reset-today", server.base_url),
        serde_json::json!({}),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(reset.today_total, 0);
    assert_eq!(reset.progress, 0);
    assert_eq!(reset.remaining, 1000);
    assert_eq!(reset.settings.daily_goal, 1000);
    assert_eq!(reset.settings.reminder_interval, 120);
    assert_eq!(reset.settings.wake_start, "06:30");
    assert_eq!(reset.settings.wake_end, "22:00");

    let recommended: Dashboard = post(
        &client,
        format!("{}/api/settings/recommended", server.base_url),
        serde_json::json!({}),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(recommended.settings.daily_goal, 2100);
}

#[tokio::test]
async fn http_permission_flow_arms_reminder() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let enabled: Dashboard = post(
        &client,
        format!("{}/api/settings", server.base_url),
        serde_json::json!({ "notificationsEnabled": true }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert!(enabled.settings.notifications_enabled);

    let denied: Dashboard = post(
        &client,
        format!("{}/api/permission", server.base_url),
        serde_json::json!({ "permission": "denied" }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(denied.permission, "denied");
    assert!(denied.notice.is_some());
    assert!(denied.next_reminder.is_none());

    let undecided: Dashboard = post(
        &client,
        format!("{}/api/permission", server.base_url),
        serde_json::json!({ "permission": "default" }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert!(undecided.request_permission);

    let granted: Dashboard = post(
        &client,
        format!("{}/api/permission", server.base_url),
        serde_json::json!({ "permission": "granted" }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert!(granted.next_reminder.is_some());
    assert!(!granted.request_permission);
    assert!(granted.notice.is_none());

    let disabled: Dashboard = post(
        &client,
        format!("{}/api/settings", server.base_url),
        serde_json::json!({ "notificationsEnabled": false }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert!(disabled.next_reminder.is_none());

    let pending: Notifications = client
        .get(format!("{}/api/notifications", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(pending.notifications.is_empty());
}

#[tokio::test]
async fn http_state_survives_restart() {
    let _guard = TEST_LOCK.lock().await;
    let data_dir = unique_data_dir();
    let client = Client::new();

    {
        let server = spawn_server(&data_dir).await;
        post(
            &client,
            format!("{}/api/intake", server.base_url),
            serde_json::json!({ "amount": 330 }),
        )
        .await;
        post(
            &client,
            format!("{}/api/settings", server.base_url),
            serde_json::json!({ "wakeEnd": "21:15" }),
        )
        .await;
    }

    let server = spawn_server(&data_dir).await;
    let restored = dashboard(&client, &server.base_url).await;
    assert_eq!(restored.today_total, 330);
    assert_eq!(restored.settings.wake_end, "21:15");
    assert!(!restored.settings.notifications_enabled);
    drop(server);

    let _ = std::fs::remove_dir_all(data_dir);
}

#[tokio::test]
async fn http_index_renders_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Hydrate+"));
    assert!(html.contains("Riwayat Hari Ini"));
}
