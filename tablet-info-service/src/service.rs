use axum::{
    Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tablet_flow::{InMemorySessionStorage, Session, SessionStorage};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    models::{AnalysisReport, SessionResponse, TabletImage, UserType},
    tts::TtsRequest,
    upload::UploadError,
    who::DEFAULT_TABLET_NAME,
    workflow::{Services, run_analysis},
};

const INDEX_HTML: &str = include_str!("../static/index.html");

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn warning(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "warning": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn processing_failure(status: StatusCode, body_text: String) -> ApiError {
    warn!("Failed to read upload ({}): {}", status, body_text);
    (
        status,
        Json(json!({
            "error": format!("Error processing the tablet info: {}", body_text)
        })),
    )
}

fn processing_error(e: MultipartError) -> ApiError {
    processing_failure(e.status(), e.body_text())
}

fn rejection_error(e: MultipartRejection) -> ApiError {
    processing_failure(e.status(), e.body_text())
}

#[derive(Clone)]
pub struct AppState {
    pub session_storage: Arc<dyn SessionStorage>,
    pub services: Services,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            session_storage: Arc::new(InMemorySessionStorage::new()),
            services: Services::from_config(config)?,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

pub fn create_app(config: &Config) -> anyhow::Result<Router> {
    let app_state = AppState::from_config(config)?;
    Ok(build_router(app_state))
}

pub fn build_router(app_state: AppState) -> Router {
    let body_limit = app_state.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/api", get(api_description))
        .route("/health", get(health_check))
        .route("/tablet/analyze", post(analyze_tablet))
        .route("/tablet/{session_id}", get(get_session_status))
        .route("/tablet/{session_id}/speech", post(speak_summary))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn api_description() -> Json<Value> {
    Json(json!({
        "service": "Tablet Info Summarizer",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Upload a tablet image and get detailed information",
        "endpoints": {
            "GET /": "Interactive page",
            "POST /tablet/analyze": "Analyze a tablet image (multipart: image, note, user_type, session_id)",
            "GET /tablet/{session_id}": "Latest summary for a session",
            "POST /tablet/{session_id}/speech": "Read the latest summary aloud (audio/mpeg)",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Form fields of one "Analyze Tablet Info" submission.
#[derive(Debug, Default)]
struct AnalyzeForm {
    image: Option<Vec<u8>>,
    note: String,
    user_type: String,
    session_id: Option<String>,
}

async fn read_analyze_form(mut multipart: Multipart) -> Result<AnalyzeForm, ApiError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(processing_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let data = field.bytes().await.map_err(processing_error)?;
                if !data.is_empty() {
                    form.image = Some(data.to_vec());
                }
            }
            "note" => form.note = field.text().await.map_err(processing_error)?,
            "user_type" => form.user_type = field.text().await.map_err(processing_error)?,
            "session_id" => {
                let id = field.text().await.map_err(processing_error)?;
                if !id.trim().is_empty() {
                    form.session_id = Some(id.trim().to_string());
                }
            }
            other => warn!("Ignoring unexpected form field '{}'", other),
        }
    }

    Ok(form)
}

async fn analyze_tablet(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<AnalysisReport> {
    let form = read_analyze_form(multipart.map_err(rejection_error)?).await?;

    let image = TabletImage::from_upload(form.image.unwrap_or_default()).map_err(|e| match e {
        UploadError::Missing => warning(&e.to_string()),
        UploadError::UnsupportedFormat(_) => bad_request_error(&e.to_string()),
    })?;

    let user_type: UserType = form.user_type.parse().unwrap_or_else(|e: String| {
        warn!("{}, using {}", e, UserType::default());
        UserType::default()
    });

    let mut session = load_or_create_session(&state, form.session_id).await?;

    info!(
        session_id = %session.id,
        user_type = %user_type,
        image_bytes = image.data.len(),
        "Starting tablet analysis"
    );

    let analysis = run_analysis(&state.services, image, form.note, user_type)
        .await
        .map_err(|e| {
            error!("Tablet analysis failed for session {}: {}", session.id, e);
            internal_error("Error processing the tablet info", &e.to_string())
        })?;

    // Overlapping analyses on one session: the last one to finish is kept.
    let summary = analysis.summary.unwrap_or_default();
    session.store_summary(summary.clone());
    let session_id = session.id.clone();
    save_session(&state, session).await?;

    Ok(Json(AnalysisReport {
        session_id,
        tablet_name: analysis
            .tablet_name
            .unwrap_or_else(|| DEFAULT_TABLET_NAME.to_string()),
        user_type,
        summary,
        who_info: analysis.who_info.unwrap_or_default(),
        rxnorm_info: analysis.rxnorm_info.unwrap_or_default(),
    }))
}

async fn load_or_create_session(
    state: &AppState,
    session_id: Option<String>,
) -> Result<Session, ApiError> {
    let Some(session_id) = session_id else {
        let session = Session::new(Uuid::new_v4().to_string());
        info!("Creating new session {}", session.id);
        return Ok(session);
    };

    find_session(state, &session_id).await
}

async fn find_session(state: &AppState, session_id: &str) -> Result<Session, ApiError> {
    match state.session_storage.get(session_id).await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(not_found_error("Session not found", session_id)),
        Err(e) => {
            error!("Failed to load session {}: {}", session_id, e);
            Err(internal_error("Failed to load session", &e.to_string()))
        }
    }
}

async fn save_session(state: &AppState, session: Session) -> Result<(), ApiError> {
    state.session_storage.save(session).await.map_err(|e| {
        error!("Failed to save session: {}", e);
        internal_error("Failed to save session", &e.to_string())
    })
}

async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    let session = find_session(&state, &session_id).await?;

    Ok(Json(SessionResponse {
        session_id: session.id,
        summary: session.summary,
        updated_at: session.updated_at,
    }))
}

async fn speak_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, &session_id).await?;

    let Some(summary) = session.summary.filter(|s| !s.trim().is_empty()) else {
        return Err(bad_request_error(
            "No summary available yet; analyze a tablet first",
        ));
    };

    let request = TtsRequest::new(summary, state.services.tts_lang.clone());
    let format = request.format.clone();

    let audio = state.services.tts.synthesize(request).await.map_err(|e| {
        error!("Speech synthesis failed for session {}: {:#}", session_id, e);
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "error": "Speech synthesis failed",
                "details": format!("{:#}", e)
            })),
        )
    })?;

    info!("Synthesized {} bytes of speech for {}", audio.len(), session_id);

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"summary.{}\"", format.extension()),
            ),
        ],
        audio,
    )
        .into_response())
}
