//! HTTP middleware for blog-service.
//!
//! Bearer-token authentication that populates a `UserId` request extension,
//! plus lightweight request timing. Read endpoints stay public: a request
//! without an `Authorization` header passes through unauthenticated, and
//! handlers opt into authentication by extracting `UserId`. A header that is
//! present but invalid always fails the request.

pub mod permissions;

pub use permissions::*;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

use crate::security::jwt;

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone)]
pub struct UserId(pub Uuid);

/// Actix middleware that validates a Bearer access token when one is sent.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .map(str::to_owned);

            if let Some(header) = auth_header {
                let token = header
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| ErrorUnauthorized("Invalid Authorization scheme"))?;

                let claims = jwt::validate_token(token)
                    .map_err(|_| ErrorUnauthorized("Invalid or expired token"))?;

                if claims.claims.token_type != "access" {
                    return Err(ErrorUnauthorized("Not an access token"));
                }

                let user_id = Uuid::parse_str(&claims.claims.sub)
                    .map_err(|_| ErrorUnauthorized("Invalid user ID"))?;

                req.extensions_mut().insert(UserId(user_id));
            }

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Authentication required")),
        )
    }
}

/// Logs method, path, and elapsed time for every request.
pub struct RequestTimingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestTimingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimingMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimingMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestTimingMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestTimingMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let path = req.path().to_string();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed().as_millis();
            tracing::debug!(%method, %path, %elapsed, "request completed");
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::jwt::test_support;
    use actix_web::{test, web, App, HttpResponse};

    async fn whoami(user_id: UserId) -> HttpResponse {
        HttpResponse::Ok().body(user_id.0.to_string())
    }

    async fn public() -> HttpResponse {
        HttpResponse::Ok().body("public")
    }

    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(JwtAuthMiddleware)
                    .route("/whoami", web::get().to(whoami))
                    .route("/public", web::get().to(public)),
            )
        };
    }

    // Extractor failures surface as error responses while middleware
    // failures surface as service errors; normalize both to a status code.
    macro_rules! request_status {
        ($app:expr, $req:expr) => {
            match test::try_call_service(&$app, $req).await {
                Ok(resp) => resp.status(),
                Err(err) => err.as_response_error().status_code(),
            }
        };
    }

    #[actix_web::test]
    async fn test_missing_header_passes_public_route() {
        test_support::init_test_keys();
        let app = test_app!().await;

        let req = test::TestRequest::get().uri("/public").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_missing_header_rejected_on_protected_route() {
        test_support::init_test_keys();
        let app = test_app!().await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        assert_eq!(
            request_status!(app, req),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_valid_token_extracts_user_id() {
        test_support::init_test_keys();
        let app = test_app!().await;

        let user_id = Uuid::new_v4();
        let token = jwt::generate_access_token(user_id, "a@example.com", "alice")
            .expect("token should generate");

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        assert_eq!(&body[..], user_id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn test_garbage_token_rejected_even_on_public_route() {
        test_support::init_test_keys();
        let app = test_app!().await;

        let req = test::TestRequest::get()
            .uri("/public")
            .insert_header(("Authorization", "Bearer garbage"))
            .to_request();
        assert_eq!(
            request_status!(app, req),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_refresh_token_rejected_as_access_credential() {
        test_support::init_test_keys();
        let app = test_app!().await;

        let token = jwt::generate_refresh_token(Uuid::new_v4(), "b@example.com", "bob")
            .expect("token should generate");

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(
            request_status!(app, req),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_non_bearer_scheme_rejected() {
        test_support::init_test_keys();
        let app = test_app!().await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_request();
        assert_eq!(
            request_status!(app, req),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
    }
}
