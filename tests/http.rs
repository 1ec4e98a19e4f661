use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    logged_in: bool,
    account_id: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BadgeView {
    label: String,
}

#[derive(Debug, Deserialize)]
struct HabitRow {
    name: String,
    checked_days: Vec<u32>,
    total: u32,
    badges: Vec<BadgeView>,
}

#[derive(Debug, Deserialize)]
struct BoardResponse {
    month: u32,
    month_name: String,
    days_in_month: u32,
    habits: Vec<HabitRow>,
    celebration: Option<String>,
}

impl BoardResponse {
    fn habit(&self, name: &str) -> &HabitRow {
        self.habits
            .iter()
            .find(|row| row.name == name)
            .unwrap_or_else(|| panic!("missing habit {name}"))
    }

    fn names(&self) -> Vec<&str> {
        self.habits.iter().map(|row| row.name.as_str()).collect()
    }
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

#[cfg(unix)]
mod cleanup {
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, Once};

    static REGISTER: Once = Once::new();
    static PIDS: Lazy<Mutex<Vec<i32>>> = Lazy::new(|| Mutex::new(Vec::new()));

    pub fn register(pid: u32) {
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().copied().filter(|pid| *pid > 0) {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
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

fn unique_data_dir(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_tracker_http_{label}_{}_{}", std::process::id(), nanos));
    path
}

async fn wait_until_ready(base_url: &str) {
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = Client::new().get(format!("{base_url}/api/session")).send().await {
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

async fn spawn_server(data_dir: &Path) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_habit_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", data_dir)
        .env("CELEBRATION_MS", "60000")
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

impl TestServer {
    async fn post(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        Client::new()
            .post(format!("{}{path}", self.base_url))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn credentials(&self, path: &str, username: &str, password: &str) -> reqwest::Response {
        self.post(path, serde_json::json!({ "username": username, "password": password }))
            .await
    }

    async fn board(&self) -> BoardResponse {
        Client::new()
            .get(format!("{}/api/board", self.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn session(&self) -> SessionResponse {
        Client::new()
            .get(format!("{}/api/session", self.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn http_signup_and_login_report_user_facing_errors() {
    let server = spawn_server(&unique_data_dir("auth")).await;

    let response = server.credentials("/api/signup", "Pat", "pw").await;
    assert_eq!(response.status(), StatusCode::OK);
    let session: SessionResponse = response.json().await.unwrap();
    assert!(session.logged_in);
    assert_eq!(session.account_id.as_deref(), Some("pat"));
    assert_eq!(session.display_name.as_deref(), Some("Pat"));

    let duplicate = server.credentials("/api/signup", " pat ", "other").await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(
        duplicate.text().await.unwrap(),
        "Account already exists! Please login instead."
    );

    let blank = server.credentials("/api/login", "pat", "   ").await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    assert_eq!(blank.text().await.unwrap(), "Please enter both username and password");

    let wrong = server.credentials("/api/login", "PAT", "nope").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.text().await.unwrap(), "Incorrect password!");

    let unknown = server.credentials("/api/login", "quinn", "pw").await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(unknown.text().await.unwrap(), "Account not found! Please sign up first.");

    // Failed attempts do not end the existing session.
    assert!(server.session().await.logged_in);
}

#[tokio::test]
async fn http_tracking_flow_survives_logout() {
    let server = spawn_server(&unique_data_dir("flow")).await;
    server.credentials("/api/signup", "rae", "pw").await;

    let board = server.board().await;
    assert_eq!(board.names(), vec!["Reading", "Coding"]);
    assert_eq!(board.month, 0);
    assert_eq!(board.month_name, "Jan");

    let board: BoardResponse = server
        .post("/api/habits", serde_json::json!({ "name": "  Yoga " }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(board.names(), vec!["Reading", "Coding", "Yoga"]);

    let board: BoardResponse = server
        .post("/api/month", serde_json::json!({ "month": 1 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(board.days_in_month, 28);

    let bad_day = server
        .post("/api/toggle", serde_json::json!({ "habit": "Yoga", "day": 29 }))
        .await;
    assert_eq!(bad_day.status(), StatusCode::BAD_REQUEST);
    let bad_habit = server
        .post("/api/toggle", serde_json::json!({ "habit": "Juggling", "day": 3 }))
        .await;
    assert_eq!(bad_habit.status(), StatusCode::BAD_REQUEST);
    let bad_month = server.post("/api/month", serde_json::json!({ "month": 12 })).await;
    assert_eq!(bad_month.status(), StatusCode::BAD_REQUEST);

    let mut last = None;
    for day in 1..=7 {
        let board: BoardResponse = server
            .post("/api/toggle", serde_json::json!({ "habit": "Yoga", "day": day }))
            .await
            .json()
            .await
            .unwrap();
        if day < 7 {
            assert!(board.celebration.is_none());
        }
        last = Some(board);
    }
    let board = last.unwrap();
    assert_eq!(board.celebration.as_deref(), Some("🎉 Week streak! You're on fire!"));
    let yoga = board.habit("Yoga");
    assert_eq!(yoga.total, 7);
    assert_eq!(yoga.checked_days, vec![1, 2, 3, 4, 5, 6, 7]);
    let labels: Vec<_> = yoga.badges.iter().map(|badge| badge.label.as_str()).collect();
    assert_eq!(labels, vec!["Week"]);

    let deleted = Client::new()
        .delete(format!("{}/api/habits/Coding", server.base_url))
        .send()
        .await
        .unwrap();
    let board: BoardResponse = deleted.json().await.unwrap();
    assert_eq!(board.names(), vec!["Reading", "Yoga"]);

    let session: SessionResponse = server
        .post("/api/logout", serde_json::json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert!(!session.logged_in);
    let board = server.board().await;
    assert_eq!(board.names(), vec!["Reading", "Coding"]);
    assert!(board.celebration.is_none());

    server.credentials("/api/login", "Rae", "pw").await;
    let board: BoardResponse = server
        .post("/api/month", serde_json::json!({ "step": "next" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(board.month, 2);
    let board: BoardResponse = server
        .post("/api/month", serde_json::json!({ "step": "prev" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(board.month, 1);
    assert_eq!(board.names(), vec!["Reading", "Yoga"]);
    assert_eq!(board.habit("Yoga").total, 7);
}

#[tokio::test]
async fn http_restart_resumes_session() {
    let data_dir = unique_data_dir("restart");
    {
        let server = spawn_server(&data_dir).await;
        server.credentials("/api/signup", "Sam", "pw").await;
        server
            .post("/api/habits", serde_json::json!({ "name": "Journaling" }))
            .await;
    }

    let server = spawn_server(&data_dir).await;
    let session = server.session().await;
    assert!(session.logged_in);
    assert_eq!(session.account_id.as_deref(), Some("sam"));
    assert_eq!(server.board().await.names(), vec!["Reading", "Coding", "Journaling"]);

    server.post("/api/logout", serde_json::json!({})).await;
    drop(server);

    let server = spawn_server(&data_dir).await;
    assert!(!server.session().await.logged_in);
}
