//! Minimal HTTP/1.1 stand-in for the Spotify token and album endpoints.
//!
//! `POST /api/token` issues `tok-<n>` bearer tokens (Basic auth required);
//! `GET /v1/albums/<id>` answers from a fixed catalog when the bearer token is
//! one the server issued.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Token endpoint answers 400 invalid_client.
    pub reject_credentials: bool,
    /// The first issued token is refused by the album endpoint (simulates early revocation).
    pub revoke_first_token: bool,
    /// Album endpoint answers 429 for every request.
    pub throttle: bool,
}

pub struct CatalogServer {
    pub token_url: String,
    pub api_base: String,
    token_requests: Arc<AtomicUsize>,
    album_requests: Arc<AtomicUsize>,
}

impl CatalogServer {
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn album_requests(&self) -> usize {
        self.album_requests.load(Ordering::SeqCst)
    }
}

struct State {
    albums: HashMap<String, (String, Vec<String>)>,
    opts: CatalogOptions,
    issued: Mutex<Vec<String>>,
    token_requests: Arc<AtomicUsize>,
    album_requests: Arc<AtomicUsize>,
}

/// Serves `albums` (id → (title, artists)). Runs until the process exits.
pub fn start(albums: &[(&str, &str, &[&str])], opts: CatalogOptions) -> CatalogServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let token_requests = Arc::new(AtomicUsize::new(0));
    let album_requests = Arc::new(AtomicUsize::new(0));
    let state = Arc::new(State {
        albums: albums
            .iter()
            .map(|(id, title, artists)| {
                (
                    id.to_string(),
                    (title.to_string(), artists.iter().map(|a| a.to_string()).collect()),
                )
            })
            .collect(),
        opts,
        issued: Mutex::new(Vec::new()),
        token_requests: Arc::clone(&token_requests),
        album_requests: Arc::clone(&album_requests),
    });
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&state);
            thread::spawn(move || handle(stream, &state));
        }
    });
    CatalogServer {
        token_url: format!("http://127.0.0.1:{}/api/token", port),
        api_base: format!("http://127.0.0.1:{}/v1", port),
        token_requests,
        album_requests,
    }
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_head(&mut stream) else {
        return;
    };
    let (method, path, authorization) = parse_request(&request);

    let (status, body) = if method.eq_ignore_ascii_case("POST") && path == "/api/token" {
        token(state, authorization.as_deref())
    } else if method.eq_ignore_ascii_case("GET") && path.starts_with("/v1/albums/") {
        album(state, &path["/v1/albums/".len()..], authorization.as_deref())
    } else {
        ("404 Not Found", r#"{"error":{"status":404,"message":"no route"}}"#.to_string())
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn token(state: &State, authorization: Option<&str>) -> (&'static str, String) {
    state.token_requests.fetch_add(1, Ordering::SeqCst);
    let basic = authorization.is_some_and(|v| v.starts_with("Basic "));
    if state.opts.reject_credentials || !basic {
        return ("400 Bad Request", r#"{"error":"invalid_client"}"#.to_string());
    }
    let mut issued = state.issued.lock().unwrap();
    let value = format!("tok-{}", issued.len() + 1);
    issued.push(value.clone());
    (
        "200 OK",
        format!(
            r#"{{"access_token":"{}","token_type":"Bearer","expires_in":3600}}"#,
            value
        ),
    )
}

fn album(state: &State, id: &str, authorization: Option<&str>) -> (&'static str, String) {
    state.album_requests.fetch_add(1, Ordering::SeqCst);
    let token = authorization.and_then(|v| v.strip_prefix("Bearer ")).unwrap_or("");
    let accepted = {
        let issued = state.issued.lock().unwrap();
        issued.iter().any(|t| t == token) && !(state.opts.revoke_first_token && token == "tok-1")
    };
    if !accepted {
        return (
            "401 Unauthorized",
            r#"{"error":{"status":401,"message":"Invalid access token"}}"#.to_string(),
        );
    }
    if state.opts.throttle {
        return ("429 Too Many Requests", r#"{"error":{"status":429}}"#.to_string());
    }
    match state.albums.get(id) {
        Some((title, artists)) => {
            let artists: Vec<String> = artists
                .iter()
                .map(|a| format!(r#"{{"name":"{}","type":"artist"}}"#, a))
                .collect();
            (
                "200 OK",
                format!(
                    r#"{{"id":"{}","name":"{}","album_type":"album","artists":[{}]}}"#,
                    id,
                    title,
                    artists.join(",")
                ),
            )
        }
        None => (
            "404 Not Found",
            r#"{"error":{"status":404,"message":"Non existing id"}}"#.to_string(),
        ),
    }
}

/// Reads the request head plus any `Content-Length` body so the socket is drained before close.
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };
    let head = String::from_utf8(buf[..head_end].to_vec()).ok()?;
    let body_len = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let mut have = buf.len() - head_end;
    while have < body_len {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => have += n,
        }
    }
    Some(head)
}

/// Returns (method, path, Authorization header value).
fn parse_request(request: &str) -> (String, String, Option<String>) {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_string();
    let path = first.next().unwrap_or("").to_string();
    let mut authorization = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("authorization") {
                authorization = Some(value.trim().to_string());
            }
        }
    }
    (method, path, authorization)
}
