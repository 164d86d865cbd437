use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::middleware::Next;
use actix_web::web::{Data, Json};
use actix_web::HttpResponse;
use serde_json::json;

use crate::config::Config;
use crate::consts;
use crate::errors::GatewayError;
use crate::models::model_list;
use crate::models::request::{ChatCompletionCreate, CompletionCreate};
use crate::service::GatewayService;
use crate::translate::response::unix_timestamp;

/// Checks the client's bearer key when `require_client_auth` is on.
pub(crate) fn authorize(headers: &HeaderMap, config: &Config) -> Result<(), GatewayError> {
    if !config.require_client_auth {
        return Ok(());
    }

    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| GatewayError::Unauthorized("Authorization header required".to_string()))?;
    let api_key = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| GatewayError::Unauthorized("Invalid authorization format".to_string()))?;

    match config.client_api_key.as_deref() {
        Some(expected) if expected == api_key.trim() => Ok(()),
        _ => Err(GatewayError::Unauthorized("Invalid API key".to_string())),
    }
}

pub async fn client_auth<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error> {
    let Some(config) = req.app_data::<Data<Config>>().cloned() else {
        log::error!("client auth: no configuration registered for {}", req.path());
        let e = GatewayError::ConfigError("gateway configuration unavailable".to_string());
        return Ok(req.error_response(e).map_into_right_body());
    };
    if let Err(e) = authorize(req.headers(), &config) {
        log::info!("rejected client request to {}: {}", req.path(), e);
        return Ok(req.error_response(e).map_into_right_body());
    }
    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

pub async fn models(config: Data<Config>) -> HttpResponse {
    let data = config
        .models
        .iter()
        .map(|model_name| model_list::Model {
            id: model_name.to_string(),
            object: model_list::ObjectType::Model,
            created: consts::MODEL_CREATED_TIMESTAMP,
            owned_by: config.model_owner.clone(),
        })
        .collect();

    HttpResponse::Ok().json(model_list::ModelList {
        object: model_list::ObjectType::List,
        data,
    })
}

pub async fn chat_completion(
    service: Data<GatewayService>,
    request: Json<ChatCompletionCreate>,
) -> Result<HttpResponse, GatewayError> {
    log::debug!("chat request: model {:?}, {} messages", request.model, request.messages.len());

    match service.create_chat_completion(request.into_inner()).await {
        Ok(chat_completion) => Ok(HttpResponse::Ok().json(chat_completion)),
        Err(e) => {
            log::error!("create_chat_completion error: {}", e);
            Err(e)
        }
    }
}

pub async fn completion(
    service: Data<GatewayService>,
    request: Json<CompletionCreate>,
) -> Result<HttpResponse, GatewayError> {
    log::debug!("completion request: model {:?}", request.model);

    match service.create_completion(request.into_inner()).await {
        Ok(completion) => Ok(HttpResponse::Ok().json(completion)),
        Err(e) => {
            log::error!("create_completion error: {}", e);
            Err(e)
        }
    }
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": unix_timestamp(),
    }))
}

pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": consts::SERVICE_NAME,
        "version": consts::SERVICE_VERSION,
        "endpoints": {
            "models": "/v1/models",
            "chat_completions": "/v1/chat/completions",
            "completions": "/v1/completions",
            "health": "/health",
        },
    }))
}
