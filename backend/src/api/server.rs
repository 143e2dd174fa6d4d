//! HTTP server for tabload sessions.
//!
//! Each session is driven by a review client through the endpoints below.
//! Sessions live in memory and are dropped when cancelled.
//!
//! # API Endpoints
//!
//! | Method | Path                            | Description                    |
//! |--------|---------------------------------|--------------------------------|
//! | GET    | `/health`                       | Health check                   |
//! | POST   | `/api/sessions`                 | Open a session from a definition |
//! | GET    | `/api/sessions/{id}`            | Session view                   |
//! | DELETE | `/api/sessions/{id}`            | Cancel and drop a session      |
//! | POST   | `/api/sessions/{id}/upload`     | Multipart `file` upload        |
//! | PUT    | `/api/sessions/{id}/mapping`    | Map one field to a column      |
//! | POST   | `/api/sessions/{id}/proceed`    | Map → preview                  |
//! | POST   | `/api/sessions/{id}/edit`       | Grid event                     |
//! | POST   | `/api/sessions/{id}/finalize`   | Commit through the sink        |
//! | POST   | `/api/sessions/{id}/reset`      | Back to upload                 |
//! | GET    | `/api/logs`                     | SSE stream for real-time logs  |
//!
//! The session lock is never held across decoding or a commit; the
//! session's own guards reject overlapping requests instead. Both run in
//! detached tasks that always report back to the session, so a dropped
//! request never leaves it busy.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post, put},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{collections::HashMap, convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{error_response, FinalizeResponse, MappingRequest, SessionView};
use crate::commit::{CommitSink, DirectorySink, HttpCommitSink};
use crate::config::AppConfig;
use crate::error::{CommitError, CommitResult, DecodeError, ServerError, ServerResult, SessionError};
use crate::models::ImportDefinition;
use crate::parser::decode;
use crate::review::GridEvent;
use crate::session::ImportSession;

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<Mutex<HashMap<Uuid, ImportSession>>>,
    sink: Arc<dyn CommitSink>,
}

impl AppState {
    pub fn new(sink: Arc<dyn CommitSink>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            sink,
        }
    }

    /// Run `f` against one session under the lock.
    async fn with_session<T, F>(&self, id: Uuid, f: F) -> ServerResult<T>
    where
        F: FnOnce(&mut ImportSession) -> ServerResult<T>,
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| ServerError::NotFound(id.to_string()))?;
        f(session)
    }

    /// Hand a commit outcome back to its session.
    ///
    /// A session cancelled mid-commit is gone; the sink's outcome is
    /// reported as is.
    async fn finish_commit(&self, id: Uuid, result: CommitResult<()>) -> ServerResult<()> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(&id) {
            Some(session) => Ok(session.finish_finalize(result)?),
            None => Ok(result.map_err(SessionError::from)?),
        }
    }
}

/// Sink for server commits: the remote store when configured, else files.
pub fn sink_from_config(config: &AppConfig) -> Arc<dyn CommitSink> {
    match &config.commit_url {
        Some(url) => {
            let mut sink = HttpCommitSink::new(url);
            if let Some(token) = &config.commit_token {
                sink = sink.with_token(token);
            }
            if let Some(key) = &config.placeholder_key {
                sink = sink.with_placeholder_key(key);
            }
            Arc::new(sink)
        }
        None => {
            let mut sink = DirectorySink::new(&config.output_dir);
            if let Some(key) = &config.placeholder_key {
                sink = sink.with_placeholder_key(key);
            }
            Arc::new(sink)
        }
    }
}

/// Build the application router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/upload", post(upload_file))
        .route("/api/sessions/{id}/mapping", put(set_mapping))
        .route("/api/sessions/{id}/proceed", post(proceed))
        .route("/api/sessions/{id}/edit", post(edit))
        .route("/api/sessions/{id}/finalize", post(finalize))
        .route("/api/sessions/{id}/reset", post(reset))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let sink = sink_from_config(&config);
    match &config.commit_url {
        Some(url) => tracing::info!("Commits go to {}", url),
        None => tracing::info!("Commits go to {}", config.output_dir.display()),
    }

    let app = router(AppState::new(sink), config.max_upload_bytes());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 Tabload server running on http://localhost:{}", config.port);
    println!("   POST /api/sessions          - Open an import");
    println!("   POST /api/sessions/{{id}}/... - Drive an import");
    println!("   GET  /api/logs              - SSE log stream");
    println!("   GET  /health                - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "tabload",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        // Lagged receivers skip what they missed
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ServerResult<(StatusCode, Json<SessionView>)> {
    let definition = ImportDefinition::from_value(body)?;
    let session = ImportSession::from_definition(definition);
    let view = SessionView::from(&session);

    state.sessions.lock().await.insert(session.id(), session);
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<SessionView>> {
    state
        .with_session(id, |s| Ok(SessionView::from(&*s)))
        .await
        .map(Json)
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<SessionView>> {
    let mut session = state
        .sessions
        .lock()
        .await
        .remove(&id)
        .ok_or_else(|| ServerError::NotFound(id.to_string()))?;
    session.cancel();
    Ok(Json(SessionView::from(&session)))
}

async fn upload_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ServerResult<Json<SessionView>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(String::from);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".into()))?;

    log_info(format!(
        "📄 Upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    state.with_session(id, |s| Ok(s.begin_decode()?)).await?;

    // Detached so the decode is finished even if the client goes away.
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let name = file_name.clone();
        let result = match tokio::task::spawn_blocking(move || decode(&bytes, name.as_deref())).await {
            Ok(result) => result,
            Err(e) => Err(DecodeError::Malformed(format!("decoder stopped: {}", e))),
        };

        task_state
            .with_session(id, |s| {
                s.finish_decode(file_name.as_deref(), result)?;
                Ok(SessionView::from(&*s))
            })
            .await
    });

    task.await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map(Json)
}

async fn set_mapping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MappingRequest>,
) -> ServerResult<Json<SessionView>> {
    state
        .with_session(id, |s| {
            s.set_mapping(&req.key, req.column.as_deref())?;
            Ok(SessionView::from(&*s))
        })
        .await
        .map(Json)
}

async fn proceed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<SessionView>> {
    state
        .with_session(id, |s| {
            s.proceed()?;
            Ok(SessionView::from(&*s))
        })
        .await
        .map(Json)
}

async fn edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<GridEvent>,
) -> ServerResult<Json<SessionView>> {
    state
        .with_session(id, |s| {
            s.edit(event)?;
            Ok(SessionView::from(&*s))
        })
        .await
        .map(Json)
}

async fn finalize(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<FinalizeResponse>> {
    let records = state.with_session(id, |s| Ok(s.begin_finalize()?)).await?;
    let committed = records.len();

    // Detached so `busy` is always cleared, even if the client goes away.
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let sink = Arc::clone(&task_state.sink);
        let result = match tokio::spawn(async move { sink.commit(records).await }).await {
            Ok(result) => result,
            Err(e) => Err(CommitError::Aborted(e.to_string())),
        };
        task_state.finish_commit(id, result).await
    });

    task.await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    Ok(Json(FinalizeResponse {
        session_id: id,
        committed,
    }))
}

async fn reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<SessionView>> {
    state
        .with_session(id, |s| {
            s.reset()?;
            Ok(SessionView::from(&*s))
        })
        .await
        .map(Json)
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) | ServerError::Schema(_) => StatusCode::BAD_REQUEST,
            ServerError::Session(e) => match e {
                SessionError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SessionError::Commit(_) => StatusCode::BAD_GATEWAY,
                SessionError::Grid(_)
                | SessionError::UnknownField(_)
                | SessionError::UnknownColumn(_) => StatusCode::BAD_REQUEST,
                SessionError::WrongPhase { .. }
                | SessionError::Busy
                | SessionError::MappingIncomplete { .. } => StatusCode::CONFLICT,
            },
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GridError, SchemaError};
    use crate::models::PlainRecord;
    use crate::session::Phase;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (ServerError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServerError::Schema(SchemaError::DuplicateKey("code".into())), StatusCode::BAD_REQUEST),
            (SessionError::Busy.into(), StatusCode::CONFLICT),
            (
                SessionError::WrongPhase { expected: Phase::Map, actual: Phase::Upload }.into(),
                StatusCode::CONFLICT,
            ),
            (
                SessionError::MappingIncomplete { missing: vec!["code".into()] }.into(),
                StatusCode::CONFLICT,
            ),
            (SessionError::Decode(DecodeError::EmptyFile).into(), StatusCode::UNPROCESSABLE_ENTITY),
            (SessionError::Grid(GridError::NoActiveEdit).into(), StatusCode::BAD_REQUEST),
            (
                SessionError::Commit(CommitError::Http("refused".into())).into(),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.status(), status, "{}", error);
        }
    }

    #[test]
    fn test_error_into_response() {
        let response = ServerError::NotFound("abc".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_sink_from_config() {
        let config = AppConfig {
            commit_url: Some("http://localhost:9/rows".into()),
            ..AppConfig::default()
        };
        // construction only; nothing is sent
        let _ = sink_from_config(&config);
        let _ = sink_from_config(&AppConfig::default());
    }

    #[tokio::test]
    async fn test_with_session_unknown_id() {
        let state = AppState::new(sink_from_config(&AppConfig::default()));
        let err = state.with_session(Uuid::new_v4(), |_| Ok(())).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    const BOUNDARY: &str = "tabload-test-boundary";

    /// Commits once released; optionally rejects.
    #[derive(Default)]
    struct GatedSink {
        release: Notify,
        reject: AtomicBool,
        commits: std::sync::Mutex<Vec<Vec<PlainRecord>>>,
    }

    #[async_trait]
    impl CommitSink for GatedSink {
        async fn commit(&self, records: Vec<PlainRecord>) -> CommitResult<()> {
            self.release.notified().await;
            self.commits.lock().unwrap().push(records);
            if self.reject.load(Ordering::SeqCst) {
                return Err(CommitError::Rejected {
                    status: 503,
                    body: "store unavailable".into(),
                });
            }
            Ok(())
        }
    }

    struct PanickingSink;

    #[async_trait]
    impl CommitSink for PanickingSink {
        async fn commit(&self, _records: Vec<PlainRecord>) -> CommitResult<()> {
            panic!("sink crashed");
        }
    }

    fn gated_state() -> (AppState, Arc<GatedSink>) {
        let sink = Arc::new(GatedSink::default());
        (AppState::new(sink.clone()), sink)
    }

    async fn open_session(state: &AppState) -> Uuid {
        let definition = json!({
            "title": "Subjects",
            "fields": [
                { "key": "code", "label": "Code", "required": true },
                { "key": "name", "label": "Name", "required": true }
            ]
        });
        let (status, Json(view)) = create_session(State(state.clone()), Json(definition))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        view.id
    }

    async fn csv_upload(file_name: &str, content: &str) -> Multipart {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
             Content-Type: text/csv\r\n\r\n{content}\r\n--{b}--\r\n",
            b = BOUNDARY,
            name = file_name,
            content = content,
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    async fn preview_session(state: &AppState, content: &str) -> Uuid {
        let id = open_session(state).await;
        upload_file(State(state.clone()), Path(id), csv_upload("subjects.csv", content).await)
            .await
            .unwrap();
        proceed(State(state.clone()), Path(id)).await.unwrap();
        id
    }

    async fn is_busy(state: &AppState, id: Uuid) -> bool {
        state.with_session(id, |s| Ok(s.is_busy())).await.unwrap()
    }

    #[tokio::test]
    async fn test_import_flow_over_handlers() {
        let (state, sink) = gated_state();
        let id = open_session(&state).await;

        let Json(view) = upload_file(
            State(state.clone()),
            Path(id),
            csv_upload("subjects.csv", "code,name\nM101,Math\n,Bio").await,
        )
        .await
        .unwrap();
        assert_eq!(view.phase, Phase::Map);
        assert!(view.can_proceed);

        let unmap = MappingRequest { key: "name".into(), column: None };
        let Json(view) = set_mapping(State(state.clone()), Path(id), Json(unmap)).await.unwrap();
        assert!(!view.can_proceed);

        let err = proceed(State(state.clone()), Path(id)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let remap = MappingRequest { key: "name".into(), column: Some("name".into()) };
        set_mapping(State(state.clone()), Path(id), Json(remap)).await.unwrap();
        let Json(view) = proceed(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(view.phase, Phase::Preview);
        assert_eq!(view.summary.unwrap().error_rows, 1);

        for event in [
            GridEvent::Focus { row: 1, key: "code".into() },
            GridEvent::Input { text: "B101".into() },
            GridEvent::Confirm,
        ] {
            edit(State(state.clone()), Path(id), Json(event)).await.unwrap();
        }
        let Json(view) = get_session(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(view.summary.unwrap().error_rows, 0);

        sink.release.notify_one();
        let Json(response) = finalize(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(response.committed, 2);
        assert_eq!(sink.commits.lock().unwrap()[0][1]["code"], "B101");

        let Json(view) = get_session(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(view.phase, Phase::Closed);

        let err = edit(State(state.clone()), Path(id), Json(GridEvent::Blur)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_bad_upload_keeps_session_in_upload() {
        let (state, _sink) = gated_state();
        let id = open_session(&state).await;

        let err = upload_file(State(state.clone()), Path(id), csv_upload("empty.csv", "code,name").await)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let Json(view) = get_session(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(view.phase, Phase::Upload);
        assert!(!view.decoding);
        assert!(view.last_error.is_some());

        let Json(view) = upload_file(
            State(state.clone()),
            Path(id),
            csv_upload("subjects.csv", "code,name\nM101,Math").await,
        )
        .await
        .unwrap();
        assert_eq!(view.phase, Phase::Map);
    }

    #[tokio::test]
    async fn test_dropped_finalize_request_still_clears_busy() {
        let (state, sink) = gated_state();
        let id = preview_session(&state, "code,name\nM101,Math").await;
        sink.reject.store(true, Ordering::SeqCst);

        let mut request = Box::pin(finalize(State(state.clone()), Path(id)));
        assert!(futures::poll!(request.as_mut()).is_pending());
        drop(request);
        assert!(is_busy(&state, id).await);

        sink.release.notify_one();
        for _ in 0..100 {
            if !is_busy(&state, id).await {
                break;
            }
            tokio::task::yield_now().await;
        }

        let Json(view) = get_session(State(state.clone()), Path(id)).await.unwrap();
        assert!(!view.busy);
        assert_eq!(view.phase, Phase::Preview);
        assert!(view.last_error.unwrap().contains("503"));

        // retry and reset are accepted again
        sink.reject.store(false, Ordering::SeqCst);
        sink.release.notify_one();
        let Json(response) = finalize(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(response.committed, 1);
        assert_eq!(sink.commits.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_commit_allows_reset() {
        let (state, sink) = gated_state();
        let id = preview_session(&state, "code,name\nM101,Math").await;
        sink.reject.store(true, Ordering::SeqCst);
        sink.release.notify_one();

        let err = finalize(State(state.clone()), Path(id)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let Json(view) = reset(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(view.phase, Phase::Upload);
    }

    #[tokio::test]
    async fn test_delete_during_commit_reports_sink_outcome() {
        let (state, sink) = gated_state();
        let id = preview_session(&state, "code,name\nM101,Math").await;

        let request = tokio::spawn(finalize(State(state.clone()), Path(id)));
        for _ in 0..100 {
            if is_busy(&state, id).await {
                break;
            }
            tokio::task::yield_now().await;
        }

        let Json(view) = delete_session(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(view.phase, Phase::Closed);

        sink.release.notify_one();
        let Json(response) = request.await.unwrap().unwrap();
        assert_eq!(response.committed, 1);
        assert_eq!(sink.commits.lock().unwrap().len(), 1);

        let err = get_session(State(state.clone()), Path(id)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sink_panic_leaves_session_retryable() {
        let state = AppState::new(Arc::new(PanickingSink));
        let id = preview_session(&state, "code,name\nM101,Math").await;

        let err = finalize(State(state.clone()), Path(id)).await.unwrap_err();
        assert!(matches!(err, ServerError::Session(SessionError::Commit(CommitError::Aborted(_)))));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let Json(view) = get_session(State(state.clone()), Path(id)).await.unwrap();
        assert!(!view.busy);
        assert_eq!(view.phase, Phase::Preview);
    }

    #[tokio::test]
    async fn test_reset_in_upload_is_conflict() {
        let (state, _sink) = gated_state();
        let id = open_session(&state).await;
        let err = reset(State(state.clone()), Path(id)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_definition_rejected() {
        let (state, _sink) = gated_state();
        let err = create_session(State(state.clone()), Json(json!({ "title": "No fields" })))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
