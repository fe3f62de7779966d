//! Authorization middleware
//!
//! Public routes pass straight through. Authenticated-only routes need a
//! valid token for an available user. Everything else runs the full
//! authorization pipeline. An admitted request carries the caller's
//! [`Identity`](crate::core::models::Identity) in its extensions.

use crate::core::authz::{DenyReason, Verdict};
use crate::server::AppState;
use crate::utils::error::WardenError;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpMessage, web};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use tracing::debug;

/// Authorization middleware for Actix-web
pub struct AuthzMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthzMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthzMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthzMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthzMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthzMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            return Box::pin(async {
                Err(WardenError::internal("application state missing").into())
            });
        };

        if state.config.auth.is_public_route(req.path()) {
            return Box::pin(service.call(req));
        }

        let path = req.path().to_string();
        let method = req.method().as_str().to_string();
        let authorization = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        if state.config.auth.is_authenticated_route(&path) {
            return Box::pin(async move {
                let authenticated = state
                    .pipeline
                    .authenticate_request(state.jwt.as_ref(), authorization.as_deref())
                    .await;
                match authenticated {
                    Ok(identity) => {
                        debug!("{} {} admitted for {}", method, path, identity.user_name);
                        req.extensions_mut().insert(identity);
                        service.call(req).await
                    }
                    Err(reason) => Err(denial(reason).into()),
                }
            });
        }

        Box::pin(async move {
            let (identity, verdict) = state
                .pipeline
                .authorize_request(
                    state.jwt.as_ref(),
                    authorization.as_deref(),
                    &path,
                    &method,
                )
                .await;

            match (identity, verdict) {
                (Some(identity), Verdict::Allow { role }) => {
                    debug!("{} {} allowed for {} by {}", method, path, identity.user_name, role);
                    req.extensions_mut().insert(identity);
                    service.call(req).await
                }
                (_, Verdict::Deny(reason)) => Err(denial(reason).into()),
                (None, Verdict::Allow { .. }) => Err(denial(DenyReason::Unauthenticated).into()),
            }
        })
    }
}

/// Generic error for a denied request
fn denial(reason: DenyReason) -> WardenError {
    if Verdict::Deny(reason).status_code() == 401 {
        WardenError::unauthorized("authentication required")
    } else {
        WardenError::forbidden("permission denied")
    }
}
