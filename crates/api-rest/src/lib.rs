//! # API REST
//!
//! REST API implementation for Wardview.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for the health payload and session headers.

#![warn(rust_2018_idioms)]

use axum::{
    body::Bytes,
    extract::{Path as AxumPath, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{session_from_headers, HealthRes, HealthService, SessionHeaderError};
use wardview_core::{
    compose_page, config::seed_flag_from_env_value, constants::DEFAULT_DATA_DIR, CoreConfig,
    CoreError, DashboardData, FileStore, FilesService, KeyValueStore, PageViewModel,
    RecordActions, RecordStore, SeedData,
};

/// Record store shared by all handlers. Requests are serialised on the lock.
pub type SharedStore = Arc<Mutex<RecordStore<Box<dyn KeyValueStore + Send>>>>;

/// Application state for the REST API server
#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    files: Arc<FilesService>,
}

impl AppState {
    pub fn new(store: RecordStore<Box<dyn KeyValueStore + Send>>, files: FilesService) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            files: Arc::new(files),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, RecordStore<Box<dyn KeyValueStore + Send>>>, ApiError> {
        self.store.lock().map_err(|_| ApiError::StoreLock)
    }
}

/// Resolve the core configuration from environment values.
///
/// # Environment Variables
/// - `WARDVIEW_DATA_DIR`: collection directory (default: `ward_data`)
/// - `WARDVIEW_BLOB_DIR`: attachment directory (default: `<data dir>/files`)
/// - `WARDVIEW_SEED_DEMO`: seed never-initialised collections with demo data (default: true)
pub fn config_from_env() -> anyhow::Result<CoreConfig> {
    let data_dir = std::env::var("WARDVIEW_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let blob_dir = std::env::var("WARDVIEW_BLOB_DIR").ok().map(PathBuf::from);
    let seed = seed_flag_from_env_value(std::env::var("WARDVIEW_SEED_DEMO").ok())?;

    Ok(CoreConfig::new(PathBuf::from(data_dir), blob_dir, seed)?)
}

/// Open the file-backed store and attachment service described by `cfg`.
pub fn state_from_config(cfg: &CoreConfig) -> anyhow::Result<AppState> {
    cfg.ensure_dirs()?;

    let substrate: Box<dyn KeyValueStore + Send> = Box::new(FileStore::new(cfg.data_dir()));
    let mut store = RecordStore::new(substrate);
    if cfg.seed_demo_data() {
        let seeded = store.seed_all(&SeedData::demo())?;
        if !seeded.is_empty() {
            tracing::info!("seeded demo data into: {}", seeded.join(", "));
        }
    }

    let files = FilesService::new(cfg.files_dir())?;
    Ok(AppState::new(store, files))
}

#[derive(OpenApi)]
#[openapi(
    paths(health, menu, page, insert_record, update_record, delete_record, attach_file),
    components(schemas(HealthRes, MenuRes, MenuEntryRes, AttachRes, ErrorRes))
)]
pub struct ApiDoc;

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/menu", get(menu))
        .route("/pages/:id", get(page))
        .route("/records/:collection", post(insert_record))
        .route(
            "/records/:collection/:id",
            put(update_record).delete(delete_record),
        )
        .route("/records/:collection/:id/attachment", post(attach_file))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// PAYLOADS
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuEntryRes {
    pub id: String,
    pub label: String,
    pub icon_ref: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuRes {
    pub role: String,
    pub entries: Vec<MenuEntryRes>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttachRes {
    pub hash: String,
    pub size_bytes: u64,
    pub media_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttachQuery {
    /// Original file name of the upload
    pub filename: String,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
enum ApiError {
    Session(SessionHeaderError),
    Core(CoreError),
    StoreLock,
}

impl From<SessionHeaderError> for ApiError {
    fn from(e: SessionHeaderError) -> Self {
        ApiError::Session(e)
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Session(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            ApiError::Core(e @ CoreError::NotPermitted { .. }) => (StatusCode::FORBIDDEN, e.to_string()),
            ApiError::Core(e @ CoreError::RecordNotFound { .. }) => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Core(e @ CoreError::MalformedCollection { .. }) => {
                tracing::error!("refusing mutation: {}", e);
                (StatusCode::CONFLICT, e.to_string())
            }
            ApiError::Core(e @ (CoreError::InvalidInput(_) | CoreError::Text(_))) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Core(e) => {
                tracing::error!("request failed: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_owned())
            }
            ApiError::StoreLock => {
                tracing::error!("record store lock poisoned");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_owned())
            }
        };
        (status, Json(ErrorRes { error: message })).into_response()
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/menu",
    responses(
        (status = 200, description = "Navigation menu of the session role", body = MenuRes),
        (status = 401, description = "Missing session headers", body = ErrorRes)
    )
)]
/// Navigation menu for the session's role
///
/// An unrecognised role gets an empty menu.
async fn menu(headers: HeaderMap) -> Result<Json<MenuRes>, ApiError> {
    let user = session_from_headers(&headers)?;
    let entries = user
        .profile()
        .menu()
        .iter()
        .map(|e| MenuEntryRes {
            id: e.id.to_owned(),
            label: e.label.to_owned(),
            icon_ref: e.icon_ref.to_owned(),
        })
        .collect();

    Ok(Json(MenuRes {
        role: user.role_label().to_owned(),
        entries,
    }))
}

#[utoipa::path(
    get,
    path = "/pages/{id}",
    params(("id" = String, Path, description = "Page id, e.g. `all-patients`")),
    responses(
        (status = 200, description = "Composed page view model"),
        (status = 401, description = "Missing session headers", body = ErrorRes),
        (status = 500, description = "Storage failure", body = ErrorRes)
    )
)]
/// Compose one dashboard page for the session
///
/// Collections are read fresh for every request. Unknown pages and pages the
/// role cannot view still return 200 with a placeholder or restricted view.
async fn page(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    headers: HeaderMap,
) -> Result<Json<PageViewModel>, ApiError> {
    let user = session_from_headers(&headers)?;
    let data = DashboardData::load(&*state.store()?)?;
    Ok(Json(compose_page(&user, &id, &data)))
}

#[utoipa::path(
    post,
    path = "/records/{collection}",
    params(("collection" = String, Path, description = "Collection key, e.g. `vitals`")),
    request_body(
        content = serde_json::Value,
        content_type = "application/json",
        description = "Record fields in camelCase. The id is assigned by the server."
    ),
    responses(
        (status = 201, description = "Record stored; body is the stored record"),
        (status = 400, description = "Unknown collection or invalid record", body = ErrorRes),
        (status = 403, description = "Role may not insert these records", body = ErrorRes),
        (status = 409, description = "Stored collection is malformed", body = ErrorRes)
    )
)]
/// Insert one record on behalf of the session
async fn insert_record(
    State(state): State<AppState>,
    AxumPath(collection): AxumPath<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let user = session_from_headers(&headers)?;
    let mut store = state.store()?;
    let stored = RecordActions::new(&mut *store, &user).insert_in(&collection, body)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[utoipa::path(
    put,
    path = "/records/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "Collection key, e.g. `patients`"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body(
        content = serde_json::Value,
        content_type = "application/json",
        description = "Full record in camelCase. The id is taken from the path."
    ),
    responses(
        (status = 200, description = "Record replaced; body is the stored record"),
        (status = 400, description = "Unknown collection or invalid record", body = ErrorRes),
        (status = 403, description = "Role may not update these records", body = ErrorRes),
        (status = 404, description = "No such record", body = ErrorRes),
        (status = 409, description = "Stored collection is malformed", body = ErrorRes)
    )
)]
/// Replace one record on behalf of the session
async fn update_record(
    State(state): State<AppState>,
    AxumPath((collection, id)): AxumPath<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = session_from_headers(&headers)?;
    let mut store = state.store()?;
    let stored = RecordActions::new(&mut *store, &user).update_in(&collection, &id, body)?;
    Ok(Json(stored))
}

#[utoipa::path(
    delete,
    path = "/records/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "Collection key, e.g. `patients`"),
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 400, description = "Unknown collection", body = ErrorRes),
        (status = 403, description = "Role may not delete these records", body = ErrorRes),
        (status = 404, description = "No such record", body = ErrorRes)
    )
)]
/// Delete one record on behalf of the session
async fn delete_record(
    State(state): State<AppState>,
    AxumPath((collection, id)): AxumPath<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let user = session_from_headers(&headers)?;
    let mut store = state.store()?;
    RecordActions::new(&mut *store, &user).delete_in(&collection, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/records/{collection}/{id}/attachment",
    params(
        ("collection" = String, Path, description = "`patients`, `labResults` or `imagingResults`"),
        ("id" = String, Path, description = "Record id"),
        AttachQuery
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Attachment stored", body = AttachRes),
        (status = 400, description = "Collection takes no attachments", body = ErrorRes),
        (status = 403, description = "Role may not update these records", body = ErrorRes),
        (status = 404, description = "No such record", body = ErrorRes)
    )
)]
/// Store the request body as the attachment of a record
async fn attach_file(
    State(state): State<AppState>,
    AxumPath((collection, id)): AxumPath<(String, String)>,
    Query(query): Query<AttachQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<AttachRes>), ApiError> {
    let user = session_from_headers(&headers)?;
    let mut store = state.store()?;
    let handle = RecordActions::new(&mut *store, &user).attach_in(
        state.files.as_ref(),
        &collection,
        &id,
        &query.filename,
        &body,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AttachRes {
            hash: handle.hash.to_string(),
            size_bytes: handle.size_bytes,
            media_type: handle.media_type.map(|m| m.to_string()),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wardview_core::MemoryStore;

    fn app(temp: &TempDir) -> Router {
        let substrate: Box<dyn KeyValueStore + Send> = Box::new(MemoryStore::default());
        let mut store = RecordStore::new(substrate);
        store.seed_all(&SeedData::demo()).unwrap();
        let files = FilesService::new(temp.path()).unwrap();
        router(AppState::new(store, files))
    }

    fn request(method: &str, uri: &str, role: &str, patient_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-session-name", "Test User")
            .header("x-session-role", role);
        if let Some(id) = patient_id {
            builder = builder.header("x-session-patient-id", id);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_open() {
        let temp = TempDir::new().unwrap();
        let response = app(&temp)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["ok"], true);
    }

    #[tokio::test]
    async fn menu_follows_role() {
        let temp = TempDir::new().unwrap();
        let response = app(&temp)
            .oneshot(request("GET", "/menu", "Lab Tech", None))
            .await
            .unwrap();
        let body = json(response).await;

        assert_eq!(body["role"], "LabTech");
        assert_eq!(body["entries"][0]["id"], "overview");
        assert_eq!(body["entries"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn missing_session_is_unauthorised() {
        let temp = TempDir::new().unwrap();
        let response = app(&temp)
            .oneshot(Request::get("/menu").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn patient_page_has_one_row() {
        let temp = TempDir::new().unwrap();
        let response = app(&temp)
            .oneshot(request("GET", "/pages/all-patients", "Patient", Some("P002")))
            .await
            .unwrap();
        let body = json(response).await;

        let rows = body["summary_rows"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["key"], "P002");
    }

    #[tokio::test]
    async fn unknown_page_is_a_placeholder_not_an_error() {
        let temp = TempDir::new().unwrap();
        let response = app(&temp)
            .oneshot(request("GET", "/pages/billing", "Nurse", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["status"], "not_implemented");
    }

    #[tokio::test]
    async fn delete_is_gated_by_role() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);

        let refused = app
            .clone()
            .oneshot(request("DELETE", "/records/patients/P001", "Physician", None))
            .await
            .unwrap();
        assert_eq!(refused.status(), StatusCode::FORBIDDEN);

        let deleted = app
            .clone()
            .oneshot(request("DELETE", "/records/patients/P001", "Admin", None))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let missing = app
            .oneshot(request("DELETE", "/records/patients/P001", "Admin", None))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    fn json_request(method: &str, uri: &str, role: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-session-name", "Test User")
            .header("x-session-role", role)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn insert_then_update_a_record() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);

        let created = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/records/patients",
                "Admin",
                serde_json::json!({"fullName": "Nia Mensah", "age": 27, "status": "Active"}),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = json(created).await;
        let id = created["id"].as_str().unwrap().to_owned();
        assert_eq!(id, "P006");

        let updated = app
            .oneshot(json_request(
                "PUT",
                &format!("/records/patients/{id}"),
                "Admin",
                serde_json::json!({"fullName": "Nia Mensah", "age": 28, "status": "Admitted"}),
            ))
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);
        assert_eq!(json(updated).await["age"], 28);
    }

    #[tokio::test]
    async fn insert_is_gated_by_role() {
        let temp = TempDir::new().unwrap();
        let response = app(&temp)
            .oneshot(json_request(
                "POST",
                "/records/patients",
                "Nurse",
                serde_json::json!({"fullName": "Nia Mensah", "age": 27, "status": "Active"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn invalid_record_body_is_a_bad_request() {
        let temp = TempDir::new().unwrap();
        let response = app(&temp)
            .oneshot(json_request(
                "POST",
                "/records/patients",
                "Admin",
                serde_json::json!({"fullName": "", "age": 27, "status": "Active"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn attachment_upload_stores_bytes() {
        let temp = TempDir::new().unwrap();
        let request = Request::post("/records/labResults/LAB-0003/attachment?filename=crp.pdf")
            .header("x-session-name", "Ingrid")
            .header("x-session-role", "LabTech")
            .body(Body::from("%PDF-1.4 crp"))
            .unwrap();

        let response = app(&temp).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json(response).await["size_bytes"], 12);
    }
}
