use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize, PartialEq)]
struct Routine {
    id: String,
    title: String,
    description: Option<String>,
    completed: bool,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Section {
    category: String,
    title: String,
    completed: usize,
    total: usize,
    routines: Vec<Routine>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    session: String,
    weekday: String,
    date: String,
    completed: usize,
    total: usize,
    percentage: Option<f64>,
    remaining_message: String,
    last_check_in: Option<String>,
    sections: Vec<Section>,
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

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/")).send().await {
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

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_routine_tracker"))
        .env("PORT", port.to_string())
        .env("BIND_ADDR", "127.0.0.1")
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
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn start(client: &Client, server: &TestServer) -> Snapshot {
    client
        .post(format!("{}/api/sessions", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn reset(client: &Client, server: &TestServer, session: &str) -> Snapshot {
    client
        .post(format!("{}/api/reset?session={session}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn toggle(client: &Client, server: &TestServer, session: &str, id: &str) -> Snapshot {
    let response = client
        .post(format!("{}/api/toggle?session={session}", server.base_url))
        .json(&serde_json::json!({ "id": id }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

async fn page(client: &Client, server: &TestServer, session: Option<&str>) -> String {
    let url = match session {
        Some(session) => format!("{}/?session={session}", server.base_url),
        None => format!("{}/", server.base_url),
    };
    client.get(url).send().await.unwrap().text().await.unwrap()
}

#[tokio::test]
async fn http_seed_state_is_empty_progress() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let seed = start(&client, &server).await;
    assert!(!seed.session.is_empty());
    assert_eq!(seed.total, 11);
    assert_eq!(seed.completed, 0);
    assert_eq!(seed.percentage, Some(0.0));
    assert_eq!(seed.last_check_in, None);
    assert!(!seed.weekday.is_empty());
    assert!(!seed.date.is_empty());
    let sizes: Vec<usize> = seed.sections.iter().map(|s| s.total).collect();
    assert_eq!(sizes, vec![4, 3, 4]);

    let html = page(&client, &server, None).await;
    assert!(html.contains(">0%<"));
    assert!(html.contains("11 routines remaining"));
}

#[tokio::test]
async fn http_toggle_first_morning_routine() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let seed = start(&client, &server).await;

    let snapshot = toggle(&client, &server, &seed.session, "m1").await;
    let morning = &snapshot.sections[0];
    assert_eq!(morning.category, "morning");
    assert_eq!((morning.completed, morning.total), (1, 4));
    assert_eq!(snapshot.percentage.map(f64::round), Some(9.0));
    assert_eq!(snapshot.remaining_message, "10 routines remaining");
    assert_eq!(snapshot.last_check_in.as_deref(), Some("just now"));

    let html = page(&client, &server, Some(seed.session.as_str())).await;
    assert!(html.contains(">9%<"));
    assert!(html.contains("10 routines remaining"));
    assert!(html.contains(">1/4<"));
}

#[tokio::test]
async fn http_reload_resets_to_seed() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let seed = start(&client, &server).await;
    toggle(&client, &server, &seed.session, "m1").await;
    toggle(&client, &server, &seed.session, "a2").await;

    let html = page(&client, &server, None).await;
    assert!(html.contains(">0%<"));
    assert!(html.contains("11 routines remaining"));
    assert!(!html.contains(&seed.session));
}

#[tokio::test]
async fn http_toggle_everything_completes_the_day() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let seed = start(&client, &server).await;

    let ids: Vec<String> = seed
        .sections
        .iter()
        .flat_map(|section| section.routines.iter().map(|r| r.id.clone()))
        .collect();
    let mut last = None;
    for id in &ids {
        last = Some(toggle(&client, &server, &seed.session, id).await);
    }

    let done = last.expect("at least one routine");
    assert_eq!(done.completed, done.total);
    assert_eq!(done.percentage, Some(100.0));
    assert_eq!(done.remaining_message, "Amazing! All routines complete!");

    let html = page(&client, &server, Some(seed.session.as_str())).await;
    assert!(html.contains(">100%<"));
    assert!(html.contains("Amazing! All routines complete!"));

    let restarted = reset(&client, &server, &seed.session).await;
    assert_eq!(restarted.sections, seed.sections);
    assert_eq!(restarted.last_check_in, None);
}

#[tokio::test]
async fn http_double_toggle_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let seed = start(&client, &server).await;

    toggle(&client, &server, &seed.session, "m1").await;
    let back = toggle(&client, &server, &seed.session, "m1").await;
    assert_eq!(back.sections, seed.sections);
    assert_eq!(back.completed, 0);
}

#[tokio::test]
async fn http_unknown_id_is_a_no_op() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let seed = start(&client, &server).await;

    let after = toggle(&client, &server, &seed.session, "does-not-exist").await;
    assert_eq!(after.sections, seed.sections);
    assert_eq!(after.last_check_in, None);

    let blank = client
        .post(format!("{}/api/toggle?session={}", server.base_url, seed.session))
        .json(&serde_json::json!({ "id": " " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let stale = client
        .post(format!("{}/api/toggle?session=stale", server.base_url))
        .json(&serde_json::json!({ "id": "m1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(stale.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_sections_by_category() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let seed = start(&client, &server).await;
    toggle(&client, &server, &seed.session, "e2").await;

    let evening: Section = client
        .get(format!("{}/api/sections/evening?session={}", server.base_url, seed.session))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(evening.title, "Evening Routine");
    assert_eq!((evening.completed, evening.total), (1, 4));
    let order: Vec<&str> = evening.routines.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec!["e1", "e2", "e3", "e4"]);
    assert!(evening.routines[1].completed);
    assert_eq!(evening.routines[0].title, "Review the day");
    assert_eq!(evening.routines[0].description.as_deref(), Some("Reflect on wins"));

    let unknown = client
        .get(format!("{}/api/sections/night?session={}", server.base_url, seed.session))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    assert!(unknown.text().await.unwrap().contains("night"));
}

#[tokio::test]
async fn http_form_toggle_keeps_session_in_redirect() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let seed = start(&client, &server).await;

    let response = client
        .post(format!("{}/routines/a3/toggle?session={}", server.base_url, seed.session))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers()["location"],
        format!("/?session={}", seed.session).as_str()
    );

    let html = page(&client, &server, Some(seed.session.as_str())).await;
    assert!(html.contains(r#"id="count-afternoon">1/3<"#));

    let fresh = page(&client, &server, None).await;
    assert!(fresh.contains(r#"id="count-afternoon">0/3<"#));
}
