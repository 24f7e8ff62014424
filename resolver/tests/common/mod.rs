//! Minimal HTTP/1.1 server for resolver integration tests.
//!
//! Serves a fixed table of routes (pages, redirects, and slow responses) and
//! records how many times each path was requested, along with the request
//! headers of the most recent hit.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Clone, Debug)]
pub enum Route {
    Page { status: u16, body: String },
    Redirect(String),
    Slow(Duration),
}

impl Route {
    pub fn ok(body: &str) -> Self {
        Self::Page {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self::Redirect(location.to_string())
    }
}

#[derive(Default)]
struct Requests {
    hits: HashMap<String, usize>,
    headers: HashMap<String, String>,
}

pub struct PageServer {
    base: String,
    requests: Arc<Mutex<Requests>>,
}

impl PageServer {
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(
            routes
                .into_iter()
                .map(|(path, route)| (path.to_string(), route))
                .collect::<HashMap<_, _>>(),
        );
        let requests = Arc::new(Mutex::new(Requests::default()));
        let server_requests = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let requests = Arc::clone(&server_requests);
                thread::spawn(move || handle(stream, &routes, &requests));
            }
        });

        Self {
            base: format!("http://127.0.0.1:{}", port),
            requests,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .hits
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// The raw header block of the last request for the path, lowercased.
    pub fn last_headers(&self, path: &str) -> Option<String> {
        self.requests.lock().unwrap().headers.get(path).cloned()
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, requests: &Mutex<Requests>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));

    let request = match read_head(&mut stream) {
        Some(request) => request,
        None => return,
    };

    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    {
        let mut requests = requests.lock().unwrap();
        *requests.hits.entry(path.clone()).or_default() += 1;
        requests
            .headers
            .insert(path.clone(), request.to_ascii_lowercase());
    }

    let response = match routes.get(&path) {
        Some(Route::Page { status, body }) => page(*status, body),
        Some(Route::Redirect(location)) => format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            location
        ),
        Some(Route::Slow(delay)) => {
            thread::sleep(*delay);
            page(200, "<html><body>slow</body></html>")
        }
        None => page(404, "<html><body>not found</body></html>"),
    };

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn page(status: u16, body: &str) -> String {
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };

    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    )
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let count = stream.read(&mut chunk).ok()?;

        if count == 0 {
            break;
        }

        buffer.extend_from_slice(&chunk[..count]);

        if buffer.windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
    }

    String::from_utf8(buffer).ok()
}
