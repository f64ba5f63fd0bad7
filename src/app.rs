use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderName, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::ViewerConfig;
use crate::downloader;
use crate::error::ViewerError;
use crate::filter::TextFilters;
use crate::graph::{self, ChartKind, ChartOptions};
use crate::html;
use crate::loader;
use crate::pipeline::{self, PipelineClient, PipelineOutcome};
use crate::viewer::{ViewState, Viewer};

/// Largest accepted upload.
const UPLOAD_LIMIT: usize = 64 * 1024 * 1024;

pub struct AppState {
    viewer: Mutex<Viewer>,
    config: ViewerConfig,
    pipeline: PipelineClient,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> crate::error::Result<Self> {
        let viewer = Viewer::new(config.render_settings());
        Self::with_viewer(config, viewer)
    }

    /// State around an already prepared viewer, e.g. one with a preloaded
    /// dataset.
    pub fn with_viewer(config: ViewerConfig, viewer: Viewer) -> crate::error::Result<Self> {
        let pipeline = PipelineClient::new(config.pipeline_endpoint.clone())?;
        Ok(AppState {
            viewer: Mutex::new(viewer),
            config,
            pipeline,
        })
    }

    // Every handler leaves the viewer consistent before releasing the lock,
    // so a poisoned lock still guards valid state.
    fn viewer(&self) -> MutexGuard<'_, Viewer> {
        self.viewer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error body returned by every API route.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ViewerError> for ApiError {
    fn from(err: ViewerError) -> Self {
        let status = match &err {
            ViewerError::Workbook(_)
            | ViewerError::Csv(_)
            | ViewerError::EmptyWorkbook
            | ViewerError::UnsupportedFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ViewerError::NoDataset => StatusCode::CONFLICT,
            ViewerError::NothingDisplayed
            | ViewerError::InvalidLevel(_)
            | ViewerError::SelectorDisabled { .. }
            | ViewerError::UnknownOption { .. }
            | ViewerError::InvalidColumn(_) => StatusCode::BAD_REQUEST,
            ViewerError::Pipeline(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", err);
        }
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: "error",
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Controls plus the rendered table, returned by every state-changing route.
#[derive(Serialize)]
pub struct ViewResponse {
    pub state: ViewState,
    pub table: String,
}

fn view(viewer: &Viewer) -> ApiResult<Json<ViewResponse>> {
    let table = html::table_html(&viewer.table())?;
    Ok(Json(ViewResponse {
        state: viewer.state(),
        table,
    }))
}

#[derive(Deserialize)]
struct SelectorChange {
    level: usize,
    value: String,
}

#[derive(Deserialize)]
struct ColumnToggle {
    index: usize,
    visible: bool,
}

#[derive(Serialize)]
struct RefreshResponse {
    #[serde(flatten)]
    outcome: PipelineOutcome,
    message: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/", get(serve_viewer))
        .route("/api/state", get(get_state))
        .route("/api/upload", post(upload))
        .route("/api/selector", post(change_selector))
        .route("/api/filters", post(change_filters))
        .route("/api/apply", post(apply_filters))
        .route("/api/reset", post(reset_filters))
        .route("/api/defects-only", post(defects_only))
        .route("/api/requirements-only", post(requirements_only))
        .route("/api/columns", post(toggle_column))
        .route("/api/summary", get(get_summary))
        .route("/api/charts/:kind", get(get_chart))
        .route("/api/export/pdf", get(export_pdf))
        .route("/api/export/xlsx", get(export_xlsx))
        .route("/api/refresh", post(refresh));

    if state.config.pipeline_command.is_some() {
        app = app.route("/run-pipeline", post(run_pipeline));
    }

    app.layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: ViewerConfig, viewer: Viewer) -> Result<(), Box<dyn std::error::Error>> {
    let bind = config.bind.clone();
    let app_state = Arc::new(AppState::with_viewer(config, viewer)?);

    let listener = TcpListener::bind(&bind).await?;
    info!("CRR viewer listening on http://{}", bind);
    axum::serve(listener, router(app_state)).await?;

    Ok(())
}

async fn serve_viewer() -> Html<&'static str> {
    Html(include_str!("./static/viewer.html"))
}

async fn get_state(State(state): State<Arc<AppState>>) -> ApiResult<Json<ViewResponse>> {
    view(&state.viewer())
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<ViewResponse>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.to_string()))?;
            upload = Some((file_name, bytes.to_vec()));
        }
    }

    let Some((file_name, bytes)) = upload.filter(|(_, bytes)| !bytes.is_empty()) else {
        return Err(ApiError::bad_request("No file data received"));
    };

    match loader::from_bytes(&file_name, bytes) {
        Ok(records) => {
            let mut viewer = state.viewer();
            viewer.load(records);
            view(&viewer)
        }
        Err(e) => {
            warn!("rejected upload {:?}: {}", file_name, e);
            state.viewer().unload();
            let mut err = ApiError::from(e);
            err.message = format!("There was an error processing your Excel file: {}", err.message);
            Err(err)
        }
    }
}

async fn change_selector(
    State(state): State<Arc<AppState>>,
    Json(change): Json<SelectorChange>,
) -> ApiResult<Json<ViewResponse>> {
    let mut viewer = state.viewer();
    viewer.select(change.level, &change.value)?;
    view(&viewer)
}

async fn change_filters(
    State(state): State<Arc<AppState>>,
    Json(text): Json<TextFilters>,
) -> ApiResult<Json<ViewResponse>> {
    let mut viewer = state.viewer();
    viewer.set_text_filters(text)?;
    view(&viewer)
}

async fn apply_filters(State(state): State<Arc<AppState>>) -> ApiResult<Json<ViewResponse>> {
    let mut viewer = state.viewer();
    if !viewer.is_loaded() {
        return Err(ViewerError::NoDataset.into());
    }
    viewer.apply();
    view(&viewer)
}

async fn reset_filters(State(state): State<Arc<AppState>>) -> ApiResult<Json<ViewResponse>> {
    let mut viewer = state.viewer();
    viewer.reset()?;
    view(&viewer)
}

async fn defects_only(State(state): State<Arc<AppState>>) -> ApiResult<Json<ViewResponse>> {
    let mut viewer = state.viewer();
    viewer.show_defects_only()?;
    view(&viewer)
}

async fn requirements_only(State(state): State<Arc<AppState>>) -> ApiResult<Json<ViewResponse>> {
    let mut viewer = state.viewer();
    viewer.show_requirements_only()?;
    view(&viewer)
}

async fn toggle_column(
    State(state): State<Arc<AppState>>,
    Json(toggle): Json<ColumnToggle>,
) -> ApiResult<Json<ViewResponse>> {
    let mut viewer = state.viewer();
    viewer.set_column_visible(toggle.index, toggle.visible)?;
    view(&viewer)
}

async fn get_summary(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let summary = state.viewer().summary()?;
    Ok(Json(summary))
}

async fn get_chart(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let kind = ChartKind::from_name(&kind).ok_or_else(|| ApiError {
        status: StatusCode::NOT_FOUND,
        message: format!("unknown chart '{}'", kind),
    })?;
    let summary = state.viewer().summary()?;
    let svg = graph::create_chart(kind, &summary, &ChartOptions::default())?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

fn attachment(content_type: &str, file_name: &str, bytes: Vec<u8>) -> Response {
    let headers: [(HeaderName, String); 2] = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    (headers, bytes).into_response()
}

async fn export_pdf(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let table = state.viewer().table();
    let bytes = downloader::to_pdf(&table)?;
    Ok(attachment("application/pdf", downloader::PDF_FILE_NAME, bytes))
}

async fn export_xlsx(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let bytes = {
        let viewer = state.viewer();
        downloader::to_xlsx(viewer.records(), &viewer.table(), viewer.columns())?
    };
    Ok(attachment(
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        downloader::XLSX_FILE_NAME,
        bytes,
    ))
}

/// Asks the pipeline server to regenerate the report. The viewer is not
/// locked while the request runs.
async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let outcome = state.pipeline.trigger().await;
    let message = outcome.status_message();
    Json(RefreshResponse { outcome, message })
}

async fn run_pipeline(State(state): State<Arc<AppState>>) -> Response {
    let Some(command) = &state.config.pipeline_command else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let result = pipeline::run_command(command).await;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(result.reply)).into_response()
}
