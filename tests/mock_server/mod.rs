//! Minimal in-process DVID stand-in for integration tests
//!
//! Stores POST bodies under their request path and serves them back on GET.
//! The server runs on its own thread and tokio runtime, so blocking and async
//! clients can both talk to it.

#![allow(dead_code)]

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// How the server answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Key-addressed storage with 200 responses (404 for unknown paths on GET)
    Store,
    /// Store as usual but always answer with this status and an error body
    Status(u16),
    /// Read the request and never answer
    Silent,
    /// Announce a longer body than is sent, then close the connection
    Truncated,
}

/// A request as seen by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

pub const ERROR_BODY: &[u8] = b"dvid internal error";

type Shared<T> = Arc<Mutex<T>>;

#[derive(Clone)]
struct State {
    mode: Mode,
    values: Shared<HashMap<String, Vec<u8>>>,
    requests: Shared<Vec<RecordedRequest>>,
}

pub struct MockDvid {
    addr: SocketAddr,
    state: State,
}

impl MockDvid {
    pub fn start(mode: Mode) -> Self {
        let state = State {
            mode,
            values: Arc::default(),
            requests: Arc::default(),
        };

        let (addr_tx, addr_rx) = mpsc::channel();
        let server_state = state.clone();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock server runtime");
            runtime.block_on(serve(server_state, addr_tx));
        });
        let addr = addr_rx.recv().expect("mock server address");

        Self { addr, state }
    }

    /// `host:port` suitable for the `server` config field
    pub fn server(&self) -> String {
        self.addr.to_string()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn value_at(&self, path: &str) -> Option<Vec<u8>> {
        self.state.values.lock().unwrap().get(path).cloned()
    }
}

/// An address nothing listens on
pub fn unused_server() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

async fn serve(state: State, addr_tx: mpsc::Sender<SocketAddr>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    addr_tx
        .send(listener.local_addr().expect("mock server address"))
        .expect("test is waiting for the address");

    loop {
        let Ok((stream, _)) = listener.accept().await else {
            continue;
        };
        let state = state.clone();

        tokio::spawn(async move {
            if state.mode == Mode::Truncated {
                truncate(stream, &state).await;
                return;
            }

            let io = TokioIo::new(stream);
            let _ = http1::Builder::new()
                .serve_connection(io, service_fn(move |req| handle(state.clone(), req)))
                .await;
        });
    }
}

async fn handle(state: State, req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(_) => Vec::new(),
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        body: body.clone(),
    });

    if state.mode == Mode::Silent {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }

    let (status, body) = match method {
        Method::POST => {
            state.values.lock().unwrap().insert(path, body);
            (StatusCode::OK, Vec::new())
        }
        Method::GET => match state.values.lock().unwrap().get(&path) {
            Some(value) => (StatusCode::OK, value.clone()),
            None => (StatusCode::NOT_FOUND, Vec::new()),
        },
        _ => (StatusCode::METHOD_NOT_ALLOWED, Vec::new()),
    };

    let (status, body) = match state.mode {
        Mode::Status(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ERROR_BODY.to_vec(),
        ),
        _ => (status, body),
    };

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    Ok(response)
}

/// Answer with a short body after promising a longer one
///
/// hyper refuses to send a body shorter than its Content-Length, so this mode
/// writes the response by hand.
async fn truncate(mut stream: TcpStream, state: &State) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let request_line = String::from_utf8_lossy(&head);
    let mut parts = request_line.split_whitespace();
    if let (Some(method), Some(path)) = (parts.next(), parts.next()) {
        state.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            body: Vec::new(),
        });
    }

    let _ = stream
        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial")
        .await;
    let _ = stream.shutdown().await;
}
