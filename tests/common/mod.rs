//! In-process test harness: one router per test over a throwaway SQLite file,
//! with a cookie jar carried between requests like a browser would.

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use axum_extra::extract::cookie::Key;
use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};
use student_roster::{Config, RosterState, db, db::SqlitePool, roster_router};
use tower::ServiceExt;

static NEXT_DB: AtomicU64 = AtomicU64::new(0);

pub struct TestApp {
    router: Router,
    cookies: BTreeMap<String, String>,
    db_path: PathBuf,
    pub pool: SqlitePool,
    pub state: RosterState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location(), Some(to));
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut db_path = std::env::temp_dir();
        db_path.push(format!(
            "student-roster-{}-{}-{}.sqlite",
            std::process::id(),
            nanos,
            NEXT_DB.fetch_add(1, Ordering::Relaxed)
        ));

        let database_url = format!("sqlite:{}", db_path.display());
        let pool = db::connect(&database_url).await.expect("open test database");

        let mut cfg = Config::default();
        // Keep hashing fast; production cost comes from config.
        cfg.password.memory_kib = 64;
        cfg.password.iterations = 1;

        let state = RosterState::new(pool.clone(), &cfg, Key::generate()).expect("build state");
        let router = roster_router(state.clone());

        Self {
            router,
            cookies: BTreeMap::new(),
            db_path,
            pool,
            state,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = self.request("GET", uri).body(Body::empty()).expect("build request");
        self.send(req).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let req = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("build request");
        self.send(req).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form("/register", &[("username", username), ("password", password)])
            .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }

    /// Register and log in, discarding the flash page in between.
    pub async fn signed_in(username: &str, password: &str) -> Self {
        let mut app = Self::spawn().await;
        app.register(username, password).await.assert_redirect("/login");
        app.login(username, password).await.assert_redirect("/");
        app
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Snapshot of the jar, for replaying it later.
    pub fn cookies(&self) -> BTreeMap<String, String> {
        self.cookies.clone()
    }

    pub fn restore_cookies(&mut self, cookies: BTreeMap<String, String>) {
        self.cookies = cookies;
    }

    pub async fn student_rows(&self) -> Vec<(String, i64, String)> {
        sqlx::query_as("SELECT name, age, grade FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .expect("query students")
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let header_value = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, header_value);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("request failed");
        let status = resp.status();
        let headers = resp.headers().clone();
        self.store_cookies(&headers);
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let body = String::from_utf8(body.to_vec()).expect("response body was not utf-8");
        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn store_cookies(&mut self, headers: &HeaderMap) {
        for raw in headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
        {
            let mut parts = raw.split(';').map(str::trim);
            let Some((name, value)) = parts.next().and_then(|kv| kv.split_once('=')) else {
                continue;
            };
            let expired = parts.any(|attr| attr.eq_ignore_ascii_case("Max-Age=0"));
            if expired || value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.db_path);
        for suffix in ["-wal", "-shm"] {
            let mut p = self.db_path.clone().into_os_string();
            p.push(suffix);
            let _ = fs::remove_file(p);
        }
    }
}

fn form_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
