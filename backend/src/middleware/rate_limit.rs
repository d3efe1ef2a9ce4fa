//! Per-client request rate limits.
//!
//! Each [`RateLimitRule`] counts requests per peer IP in a fixed window. A
//! request over the limit is answered with `429` and the error envelope
//! without reaching the handler.

use std::net::IpAddr;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::Error;
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use pingora_limits::rate::Rate;
use tracing::warn;

use crate::domain::Error as DomainError;

const CREATE_LIMIT: u32 = 50;
const CREATE_WINDOW: Duration = Duration::from_secs(15 * 60);
const FETCH_LIMIT: u32 = 100;
const FETCH_WINDOW: Duration = Duration::from_secs(10 * 60);
const UPDATE_LIMIT: u32 = 60;
const UPDATE_WINDOW: Duration = Duration::from_secs(15 * 60);

const LIMIT_HEADER: &str = "x-rate-limit-limit";
const REMAINING_HEADER: &str = "x-rate-limit-remaining";

/// Limit for one method and path prefix.
pub struct RateLimitRule {
    method: Method,
    path_prefix: &'static str,
    max_requests: u32,
    message: &'static str,
    rate: Rate,
}

impl RateLimitRule {
    /// Allow `max_requests` per client in each `window`.
    pub fn new(
        method: Method,
        path_prefix: &'static str,
        max_requests: u32,
        window: Duration,
    ) -> Self {
        Self {
            method,
            path_prefix,
            max_requests,
            message: "Too many requests from this IP, please try again later.",
            rate: Rate::new(window),
        }
    }

    /// Message returned with the `429` response.
    #[must_use]
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = message;
        self
    }

    fn applies_to(&self, req: &ServiceRequest) -> bool {
        req.method() == self.method && req.path().starts_with(self.path_prefix)
    }

    /// Count one request from `client`; `false` once the window is spent.
    fn admit(&self, client: &Option<IpAddr>) -> bool {
        let seen = self.rate.observe(client, 1);
        seen <= isize::try_from(self.max_requests).unwrap_or(isize::MAX)
    }

    fn reject(&self, req: ServiceRequest) -> ServiceResponse<BoxBody> {
        let mut response = req.error_response(DomainError::too_many_requests(self.message));
        let headers = response.headers_mut();
        headers.insert(
            HeaderName::from_static(LIMIT_HEADER),
            HeaderValue::from(self.max_requests),
        );
        headers.insert(
            HeaderName::from_static(REMAINING_HEADER),
            HeaderValue::from_static("0"),
        );
        response
    }
}

/// Middleware applying [`RateLimitRule`]s.
///
/// Counters live behind an `Arc`, so build the middleware once and clone it
/// into each worker's `App`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use approvals::RateLimit;
///
/// let limits = RateLimit::request_routes();
/// let app = App::new().wrap(limits.clone());
/// ```
#[derive(Clone)]
pub struct RateLimit {
    rules: Arc<[RateLimitRule]>,
}

impl RateLimit {
    /// Apply `rules`; the first rule matching a request counts it.
    pub fn new(rules: Vec<RateLimitRule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    /// Limits for the `/request` routes: create 50 per 15 minutes, fetch 100
    /// per 10 minutes and status updates 60 per 15 minutes.
    pub fn request_routes() -> Self {
        Self::new(vec![
            RateLimitRule::new(Method::POST, "/request/create", CREATE_LIMIT, CREATE_WINDOW)
                .with_message("Too many create requests from this IP, please try again later."),
            RateLimitRule::new(Method::GET, "/request/fetch", FETCH_LIMIT, FETCH_WINDOW)
                .with_message("Too many fetch requests from this IP, please try again later."),
            RateLimitRule::new(
                Method::PUT,
                "/request/update-status/",
                UPDATE_LIMIT,
                UPDATE_WINDOW,
            )
            .with_message("Too many update requests from this IP, please try again later."),
        ])
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, inner: S) -> Self::Future {
        ready(Ok(RateLimitService {
            inner,
            rules: Arc::clone(&self.rules),
        }))
    }
}

/// Service produced by [`RateLimit`].
pub struct RateLimitService<S> {
    inner: S,
    rules: Arc<[RateLimitRule]>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(rule) = self.rules.iter().find(|rule| rule.applies_to(&req)) {
            let client = req.peer_addr().map(|addr| addr.ip());
            if !rule.admit(&client) {
                warn!(
                    client = ?client,
                    path = %req.path(),
                    limit = rule.max_requests,
                    "rate limit exceeded"
                );
                return Box::pin(ready(Ok(rule.reject(req))));
            }
        }

        let pending = self.inner.call(req);
        Box::pin(async move { pending.await.map(ServiceResponse::map_into_boxed_body) })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::middleware::Trace;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use serde_json::Value;

    fn from(ip: &str) -> std::net::SocketAddr {
        format!("{ip}:40000").parse().expect("socket addr")
    }

    fn get(uri: &str, ip: &str) -> actix_http::Request {
        test::TestRequest::get()
            .uri(uri)
            .peer_addr(from(ip))
            .to_request()
    }

    fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[rstest]
    #[actix_web::test]
    async fn requests_over_the_limit_get_429() {
        let limits = RateLimit::new(vec![
            RateLimitRule::new(Method::GET, "/limited", 2, Duration::from_secs(60))
                .with_message("Slow down"),
        ]);
        let app = test::init_service(
            App::new()
                .wrap(limits)
                .wrap(Trace)
                .route("/limited", web::get().to(|| async { ok() })),
        )
        .await;

        for _ in 0..2 {
            let response = test::call_service(&app, get("/limited", "10.0.0.1")).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = test::call_service(&app, get("/limited", "10.0.0.1")).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get(LIMIT_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some("2")
        );
        let trace_id = response
            .headers()
            .get("trace-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "too_many_requests");
        assert_eq!(body["message"], "Slow down");
        assert_eq!(body["traceId"].as_str(), trace_id.as_deref());
    }

    #[rstest]
    #[actix_web::test]
    async fn clients_are_counted_separately() {
        let limits = RateLimit::new(vec![RateLimitRule::new(
            Method::GET,
            "/limited",
            1,
            Duration::from_secs(60),
        )]);
        let app = test::init_service(
            App::new()
                .wrap(limits)
                .route("/limited", web::get().to(|| async { ok() })),
        )
        .await;

        let first = test::call_service(&app, get("/limited", "10.0.0.1")).await;
        let other = test::call_service(&app, get("/limited", "10.0.0.2")).await;
        let again = test::call_service(&app, get("/limited", "10.0.0.1")).await;

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(other.status(), StatusCode::OK);
        assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[rstest]
    #[actix_web::test]
    async fn unmatched_routes_and_methods_are_not_counted() {
        let limits = RateLimit::new(vec![RateLimitRule::new(
            Method::GET,
            "/limited",
            1,
            Duration::from_secs(60),
        )]);
        let app = test::init_service(
            App::new()
                .wrap(limits)
                .route("/limited", web::post().to(|| async { ok() }))
                .route("/open", web::get().to(|| async { ok() })),
        )
        .await;

        for _ in 0..3 {
            let open = test::call_service(&app, get("/open", "10.0.0.1")).await;
            assert_eq!(open.status(), StatusCode::OK);
            let post = test::TestRequest::post()
                .uri("/limited")
                .peer_addr(from("10.0.0.1"))
                .to_request();
            assert_eq!(test::call_service(&app, post).await.status(), StatusCode::OK);
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn fetch_allows_one_hundred_per_window() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimit::request_routes())
                .route("/request/fetch", web::get().to(|| async { ok() })),
        )
        .await;

        for _ in 0..FETCH_LIMIT {
            let response = test::call_service(&app, get("/request/fetch", "10.0.0.9")).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = test::call_service(&app, get("/request/fetch", "10.0.0.9")).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            body["message"],
            "Too many fetch requests from this IP, please try again later."
        );
    }
}
