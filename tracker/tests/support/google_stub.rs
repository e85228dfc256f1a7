//! Stub Google endpoints served by Actix on an ephemeral loopback port.
//!
//! One server answers every path. Requests are recorded verbatim and answered
//! from per-endpoint reply scripts; the last reply in a script repeats.

use std::collections::VecDeque;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};

pub const UPLOAD_PATH: &str = "/upload/drive/v3/files";
pub const TOKEN_PATH: &str = "/token";
pub const AUTH_PATH: &str = "/o/oauth2/v2/auth";

/// Canned HTTP answer.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn uploaded(id: &str) -> Self {
        Self::json(200, serde_json::json!({ "id": id, "name": "food.jpg" }))
    }

    pub fn appended(range: &str) -> Self {
        Self::json(
            200,
            serde_json::json!({
                "spreadsheetId": "sheet-7",
                "updates": { "updatedRange": range, "updatedRows": 1 }
            }),
        )
    }

    pub fn token(access_token: &str) -> Self {
        Self::json(
            200,
            serde_json::json!({
                "access_token": access_token,
                "expires_in": 3599,
                "scope": "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.file",
                "token_type": "Bearer"
            }),
        )
    }

    pub fn google_error(status: u16, message: &str) -> Self {
        Self::json(
            status,
            serde_json::json!({ "error": { "code": status, "message": message } }),
        )
    }
}

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub content_type: String,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Default)]
struct Script(Mutex<VecDeque<Reply>>);

impl Script {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self(Mutex::new(replies.into_iter().collect()))
    }

    fn next(&self) -> Reply {
        let mut replies = self.0.lock().expect("script lock");
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        reply.unwrap_or_else(|| Reply::google_error(404, "no reply scripted"))
    }
}

#[derive(Default)]
struct StubState {
    upload: Script,
    append: Script,
    token: Script,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Reply scripts per endpoint.
#[derive(Default)]
pub struct StubReplies {
    pub upload: Vec<Reply>,
    pub append: Vec<Reply>,
    pub token: Vec<Reply>,
}

/// Running stub server.
pub struct GoogleStub {
    pub base_url: String,
    state: Arc<StubState>,
    handle: ServerHandle,
}

impl GoogleStub {
    pub async fn start(replies: StubReplies) -> Self {
        let state = Arc::new(StubState {
            upload: Script::new(replies.upload),
            append: Script::new(replies.append),
            token: Script::new(replies.token),
            requests: Mutex::default(),
        });
        let listener = TcpListener::bind("127.0.0.1:0").expect("stub listener binds");
        let addr = listener.local_addr().expect("stub address");
        let data = web::Data::from(state.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(answer))
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("stub server listens")
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> reqwest::Url {
        reqwest::Url::parse(&format!("{}{path}", self.base_url)).expect("stub url")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn requests_to(&self, predicate: impl Fn(&str) -> bool) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| predicate(&request.path))
            .collect()
    }

    pub fn uploads(&self) -> Vec<RecordedRequest> {
        self.requests_to(|path| path == UPLOAD_PATH)
    }

    pub fn appends(&self) -> Vec<RecordedRequest> {
        self.requests_to(|path| path.ends_with(":append"))
    }

    pub fn token_exchanges(&self) -> Vec<RecordedRequest> {
        self.requests_to(|path| path == TOKEN_PATH)
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

async fn answer(
    request: HttpRequest,
    body: web::Bytes,
    state: web::Data<StubState>,
) -> HttpResponse {
    let path = request.path().to_owned();
    let header = |name: actix_web::http::header::HeaderName| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: path.clone(),
        query: request.query_string().to_owned(),
        content_type: header(actix_web::http::header::CONTENT_TYPE).unwrap_or_default(),
        authorization: header(actix_web::http::header::AUTHORIZATION),
        body: body.to_vec(),
    };
    state.requests.lock().expect("requests lock").push(recorded);

    let reply = if path == UPLOAD_PATH {
        state.upload.next()
    } else if path.ends_with(":append") {
        state.append.next()
    } else if path == TOKEN_PATH {
        state.token.next()
    } else {
        Reply::google_error(404, "unknown stub path")
    };
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .content_type("application/json")
        .body(reply.body)
}
