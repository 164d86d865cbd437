use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{Logger, from_fn};
use actix_web::web::Data;
use actix_web::{App, Error, web};

use crate::errors::GatewayError;
use crate::{config, handlers, service};

pub fn create_app(
    gateway_service: Arc<service::GatewayService>,
    config: Arc<config::Config>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| GatewayError::ValidationError(err.to_string()).into());

    App::new()
        .wrap(Logger::default())
        .app_data(Data::from(gateway_service))
        .app_data(Data::from(config))
        .app_data(json_config)
        .route("/", web::get().to(handlers::root))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/v1")
                .wrap(from_fn(handlers::client_auth))
                .route("/models", web::get().to(handlers::models))
                .route(
                    "/chat/completions",
                    web::post().to(handlers::chat_completion),
                )
                .route("/completions", web::post().to(handlers::completion)),
        )
}
