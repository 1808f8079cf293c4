#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;

use lt_rtml::submission::soap::SOAP_ENV_NAMESPACE;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// One request as seen by the mock node agent.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

struct MockState {
    status: StatusCode,
    body: String,
    delay: Duration,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process stand-in for `/node_agent2/node_agent`, bound to an ephemeral port.
pub struct MockNodeAgent {
    pub host: String,
    pub port: u16,
    state: Arc<MockState>,
}

impl MockNodeAgent {
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    pub async fn start_with_delay(status: u16, body: impl Into<String>, delay: Duration) -> Self {
        let state = Arc::new(MockState {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.into(),
            delay,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/node_agent2/node_agent", post(handle))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock node agent");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            host: addr.ip().to_string(),
            port: addr.port(),
            state,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/node_agent2/node_agent", self.host, self.port)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        username: header_value("Username"),
        password: header_value("Password"),
        content_type: header_value("Content-Type"),
        body,
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (
        state.status,
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        state.body.clone(),
    )
}

/// SOAP reply whose return value is `rtml`, escaped as text.
pub fn soap_return(rtml: &str) -> String {
    let escaped = rtml
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <soapenv:Envelope xmlns:soapenv=\"{}\"><soapenv:Body>\
         <ns1:handle_rtmlResponse xmlns:ns1=\"urn:node_agent2\">\
         <handle_rtmlReturn>{}</handle_rtmlReturn>\
         </ns1:handle_rtmlResponse></soapenv:Body></soapenv:Envelope>",
        SOAP_ENV_NAMESPACE, escaped
    )
}

pub fn soap_fault(reason: &str) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"{}\"><soapenv:Body><soapenv:Fault>\
         <faultcode>soapenv:Server</faultcode><faultstring>{}</faultstring>\
         </soapenv:Fault></soapenv:Body></soapenv:Envelope>",
        SOAP_ENV_NAMESPACE, reason
    )
}
