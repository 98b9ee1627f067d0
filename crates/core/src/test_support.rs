use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: String,
}

pub(crate) struct Upstream {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl Upstream {
    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// In-process HTTP upstream that answers every request with `status` and
/// `body` and records what it received.
pub(crate) async fn spawn_upstream(status: StatusCode, body: impl Into<String>) -> Upstream {
    let body = body.into();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, req_body: String| {
        let seen = seen.clone();
        let body = body.clone();
        async move {
            seen.lock().unwrap().push(CapturedRequest {
                path_and_query: uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_default(),
                headers,
                body: req_body,
            });
            (
                status,
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                body,
            )
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Upstream {
        base_url: format!("http://{addr}"),
        requests,
    }
}
