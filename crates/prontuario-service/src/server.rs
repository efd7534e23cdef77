//! HTTP routes for note compilation and the medication directory.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use prontuario_compiler::{MedicationRegistry, NoteCompiler};
use prontuario_types::well_known::{MEDICATIONS_PATH, MEDICATION_SEARCH_PATH};
use prontuario_types::{MedicalRecord, MedicationEntry, NewMedication};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::directory::SharedDirectory;
use crate::error::ApiError;

/// Compiler resolving medications through any registry.
pub type SharedCompiler = NoteCompiler<Arc<dyn MedicationRegistry>>;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    compiler: Arc<SharedCompiler>,
    directory: SharedDirectory,
}

impl AppState {
    /// Creates state that serves `directory` and compiles notes against
    /// `registry`.
    pub fn new(directory: SharedDirectory, registry: Arc<dyn MedicationRegistry>) -> Self {
        Self {
            compiler: Arc::new(NoteCompiler::new(registry)),
            directory,
        }
    }

    /// Creates state that compiles notes against the served directory.
    pub fn local(directory: SharedDirectory) -> Self {
        let registry: Arc<dyn MedicationRegistry> = Arc::new(directory.clone());
        Self::new(directory, registry)
    }
}

/// Body of `POST /process`.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    /// The medical note.
    pub text: String,
}

/// Builds the CORS layer for the configured origins.
///
/// Origins that are not valid header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Builds the service router.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/process", post(process_note))
        .route(
            MEDICATIONS_PATH,
            get(list_medications).post(create_medication),
        )
        .route(
            &format!("{MEDICATION_SEARCH_PATH}/:name"),
            get(search_medication),
        )
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until the listener fails.
pub async fn serve(config: &ServiceConfig, state: AppState) -> std::io::Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state, &config.cors_origins)).await
}

/// `POST /process`: compiles one note into a record.
async fn process_note(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<MedicalRecord>, ApiError> {
    let compiler = Arc::clone(&state.compiler);

    // Registry lookups block; keep them off the async workers.
    let compilation = tokio::task::spawn_blocking(move || compiler.compile(&request.text))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|err| {
            tracing::info!(error = %err, "Rejected note");
            ApiError::from(err)
        })?;

    Ok(Json(compilation.record))
}

/// `POST /medications`: stores a new directory entry.
async fn create_medication(
    State(state): State<AppState>,
    Json(medication): Json<NewMedication>,
) -> Result<(StatusCode, Json<MedicationEntry>), ApiError> {
    let entry = state.directory.insert(medication)?;
    tracing::debug!(id = entry.id, name = %entry.name, "Created medication");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /medications`: lists directory entries in insertion order.
async fn list_medications(
    State(state): State<AppState>,
) -> Result<Json<Vec<MedicationEntry>>, ApiError> {
    Ok(Json(state.directory.list()?))
}

/// `GET /medications/search/:name`: finds an entry by name, ignoring case.
async fn search_medication(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MedicationEntry>, ApiError> {
    state
        .directory
        .find_by_name(&name)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("medication not found".to_string()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::directory::MedicationDirectory;

    const NOTE: &str = r#"PACIENTE "Maria Silva" CPF:"123.456.789-00" CONSULTA DATA:"10/05/2024" CID:"A12" MEDICAMENTO "Paracetamol" DOSAGEM:"500mg""#;

    fn paracetamol() -> NewMedication {
        NewMedication {
            name: "Paracetamol".to_string(),
            dosage: "750mg".to_string(),
            form: "comprimido".to_string(),
            manufacturer: "AcmeLabs".to_string(),
        }
    }

    fn app() -> Router {
        let mut directory = MedicationDirectory::new();
        directory.insert(paracetamol());
        let state = AppState::local(SharedDirectory::new(directory));
        router(state, &["http://localhost:3000".to_string()])
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_process_success() {
        let response = app()
            .oneshot(json_request(Method::POST, "/process", json!({ "text": NOTE })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["patient"], "Maria Silva");
        assert_eq!(body["consultation_date"], "10/05/2024");
        assert_eq!(body["medication"]["dosage"], "500mg");
        assert_eq!(body["medication"]["manufacturer"], "AcmeLabs");
    }

    #[tokio::test]
    async fn test_process_unknown_medication() {
        let text = NOTE.replace("Paracetamol", "Xyzol");
        let response = app()
            .oneshot(json_request(Method::POST, "/process", json!({ "text": text })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("Xyzol"));
    }

    #[tokio::test]
    async fn test_process_dosage_out_of_range() {
        let text = NOTE.replace("500mg", "1200mg");
        let response = app()
            .oneshot(json_request(Method::POST, "/process", json!({ "text": text })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .contains("above permitted maximum"));
    }

    #[tokio::test]
    async fn test_create_then_search() {
        let app = app();

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/medications",
                json!({
                    "name": "Dipirona",
                    "dosage": "500mg",
                    "form": "gotas",
                    "manufacturer": "Medley"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["id"], 2);

        let response = app
            .clone()
            .oneshot(get_request("/medications/search/dipirona"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["form"], "gotas");

        let response = app.oneshot(get_request("/medications")).await.unwrap();
        let body = body_json(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Paracetamol", "Dipirona"]);
    }

    #[tokio::test]
    async fn test_search_miss() {
        let response = app()
            .oneshot(get_request("/medications/search/Xyzol"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "medication not found" })
        );
    }

    #[tokio::test]
    async fn test_search_percent_encoded_name() {
        let mut directory = MedicationDirectory::new();
        directory.insert(NewMedication {
            name: "Ácido Fólico".to_string(),
            ..paracetamol()
        });
        let app = router(AppState::local(SharedDirectory::new(directory)), &[]);

        let response = app
            .oneshot(get_request("/medications/search/%C3%81cido%20F%C3%B3lico"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/process")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Builds without panicking on a value that is not a header.
        let _ = cors_layer(&["http://ok.example".to_string(), "bad\norigin".to_string()]);
    }
}
