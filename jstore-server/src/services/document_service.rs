use std::sync::Arc;

use actix_web::http::{header, Method};
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, HttpRequest, HttpResponse};
use blob_store::BlobStore;
use futures_util::StreamExt;

use crate::config::ServerConfig;
use crate::errors::{JStoreErr, JStoreResult};
use crate::id_generator::IdGenerator;
use crate::identifier::extract_identifier;

pub const APP_TYPE_JSON: &str = "application/json";

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, HEAD, POST, PUT, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Accept, Content-Type, Content-Length, Accept-Encoding, Authorization";

/// Shared by every worker. Holds no per-request state, every read goes back
/// to the store.
pub struct AppState {
    pub(crate) store: Arc<dyn BlobStore>,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) config: ServerConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn BlobStore>, ids: Arc<dyn IdGenerator>, config: ServerConfig) -> Self {
        Self { store, ids, config }
    }
}

/// Headers attached to every response, errors included.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, CORS_ALLOW_ORIGIN))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, CORS_ALLOW_METHODS))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, CORS_ALLOW_HEADERS))
}

/// Routes every path to `dispatch`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.default_service(web::to(dispatch));
}

/// Picks the operation for a request purely from its method.
pub async fn dispatch(
    req: HttpRequest,
    payload: web::Payload,
    shared_state: web::Data<AppState>,
) -> JStoreResult<HttpResponse> {
    match *req.method() {
        Method::GET => read_document(&req, &shared_state).await,
        Method::POST => create_document(payload, &shared_state).await,
        Method::PUT => update_document(&req, payload, &shared_state).await,
        Method::OPTIONS => Ok(HttpResponse::NoContent().finish()),
        _ => {
            tracing::debug!("unsupported method {} on {}", req.method(), req.path());
            Err(JStoreErr::MethodNotSupported)
        }
    }
}

async fn read_document(req: &HttpRequest, shared_state: &AppState) -> JStoreResult<HttpResponse> {
    let id = extract_identifier(req.match_info().as_str())?;
    let body = shared_state.store.load(id).await.map_err(|e| {
        tracing::info!("Cannot find document {}: {}", id, e);
        JStoreErr::DocumentNotFound(e)
    })?;

    Ok(HttpResponse::Ok().content_type(APP_TYPE_JSON).body(body))
}

async fn create_document(payload: web::Payload, shared_state: &AppState) -> JStoreResult<HttpResponse> {
    let body = read_body(payload, shared_state.config.max_body_bytes).await?;
    let id = shared_state.ids.generate().inspect_err(|e| {
        tracing::error!("Problems while generating a new id: {}", e);
    })?;

    save_document(shared_state, &id, &body).await?;
    tracing::info!("created document {} ({} bytes)", id, body.len());

    let location = shared_state.config.document_url(&id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location.clone()))
        .body(location))
}

async fn update_document(
    req: &HttpRequest,
    payload: web::Payload,
    shared_state: &AppState,
) -> JStoreResult<HttpResponse> {
    let id = extract_identifier(req.match_info().as_str())?;
    let body = read_body(payload, shared_state.config.max_body_bytes).await?;

    // Updates never create: the document has to be there already.
    shared_state.store.load(id).await.map_err(|e| {
        tracing::info!("Refusing to update missing document {}: {}", id, e);
        JStoreErr::DocumentNotFound(e)
    })?;

    save_document(shared_state, id, &body).await?;
    tracing::info!("updated document {} ({} bytes)", id, body.len());

    // 201 here as well, same as create.
    Ok(HttpResponse::Created().body(shared_state.config.document_url(id)))
}

async fn save_document(shared_state: &AppState, id: &str, body: &[u8]) -> JStoreResult<()> {
    shared_state.store.save(id, body).await.map_err(|e| {
        tracing::error!("Cannot save document {}: {:?}", id, e);
        JStoreErr::Persistence(e)
    })
}

/// Drains the whole request body, refusing anything over `limit` bytes.
async fn read_body(mut payload: web::Payload, limit: usize) -> JStoreResult<web::BytesMut> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::warn!("Cannot read request's body: {}", e);
            JStoreErr::RequestRead(e.to_string())
        })?;
        if body.len() + chunk.len() > limit {
            tracing::warn!("Cannot read request's body: larger than {} bytes", limit);
            return Err(JStoreErr::RequestRead(format!("body exceeds {limit} bytes")));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
