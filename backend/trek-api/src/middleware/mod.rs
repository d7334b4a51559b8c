/// HTTP middleware for the trek API.
///
/// Authentication follows the client's cookie-session model: login stores an
/// opaque token in the session store and sets an http-only cookie; this
/// middleware resolves the cookie back to a `UserId` request extension, so
/// handlers take the caller's identity as an explicit extractor argument.
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::{SessionStore, SESSION_COOKIE};

/// Authenticated user id stored in request extensions after session lookup.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

/// Actix middleware that resolves the session cookie via the shared
/// `SessionStore`.
pub struct SessionAuth;

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let store = match req.app_data::<web::Data<Arc<dyn SessionStore>>>().cloned() {
                Some(store) => store,
                None => {
                    return Ok(reject(
                        req,
                        Error::from(AppError::Internal("session store not configured".into())),
                    ))
                }
            };

            let token = match req.cookie(SESSION_COOKIE) {
                Some(cookie) => cookie.value().to_string(),
                None => return Ok(reject(req, unauthorized())),
            };

            let user_id = match store.fetch(&token).await {
                Ok(Some(user_id)) => user_id,
                Ok(None) => return Ok(reject(req, unauthorized())),
                Err(err) => return Ok(reject(req, Error::from(err))),
            };

            req.extensions_mut().insert(UserId(user_id));

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Render an auth failure as its HTTP response without invoking the inner
/// service, so the error surface matches what the dispatcher would emit.
fn reject<B>(req: ServiceRequest, err: Error) -> ServiceResponse<EitherBody<B>> {
    let (req, _) = req.into_parts();
    let res = HttpResponse::from_error(err).map_into_right_body();
    ServiceResponse::new(req, res)
}

fn unauthorized() -> Error {
    AppError::Unauthorized("Not logged in".to_string()).into()
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .copied()
                .ok_or_else(unauthorized),
        )
    }
}
