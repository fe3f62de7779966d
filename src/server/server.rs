//! HTTP server core implementation

use crate::Warden;
use crate::server::middleware::AuthzMiddleware;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{Result, WardenError};
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use std::sync::Arc;
use tracing::info;

pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    pub fn new(warden: Arc<Warden>) -> Self {
        Self {
            state: AppState::new(warden),
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                WardenError::validation(err.to_string()).into()
            }))
            .wrap(AuthzMiddleware)
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("Server", "warden")))
            .configure(routes::configure_routes)
    }

    /// Bind and serve until shutdown
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.state.config.server.address();
        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .bind(&bind_addr)
            .map_err(|e| WardenError::config(format!("cannot bind {}: {}", bind_addr, e)))?
            .run();

        info!("HTTP server listening on {}", bind_addr);
        server.await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
