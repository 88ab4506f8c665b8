//! Request tracing middleware.
//!
//! [`Trace`] assigns every request a [`TraceId`]. A caller-supplied `trace-id`
//! header is adopted when it parses as a UUID, so a gateway in front of the
//! service can correlate its own logs; any other value is replaced. While the
//! handler runs the identifier sits in task-local storage, where domain errors
//! pick it up, and the response echoes it back in the same header.
//!
//! The `http_request` span records the method and path only. Query strings
//! may carry account identifiers and headers may carry bearer tokens.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, error, info, info_span};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware scoping each request to a [`TraceId`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use forum_backend::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

/// Identifier forwarded by the caller, if it is a well-formed UUID.
fn forwarded_trace_id(headers: &HeaderMap) -> Option<TraceId> {
    headers
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.trim().parse().ok())
}

fn stamp(headers: &mut HeaderMap, trace_id: TraceId) {
    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => {
            error!(%error, %trace_id, "failed to encode trace identifier header");
        }
    }
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = forwarded_trace_id(req.headers()).unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "http_request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path()
        );
        let started = Instant::now();
        let fut = self.service.call(req);

        let handled = async move {
            let mut res = fut.await?;
            info!(
                status = res.status().as_u16(),
                latency = ?started.elapsed(),
                "request completed"
            );
            stamp(res.response_mut().headers_mut(), trace_id);
            Ok(res)
        };
        Box::pin(TraceId::scope(trace_id, handled).instrument(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::IdentityError;
    use crate::domain::{ApiResult, Error as DomainError};
    use actix_web::dev::ServiceResponse;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    const FORWARDED: &str = "6f1c2d3e-4b5a-4c6d-8e7f-901a2b3c4d5e";

    async fn echo_current() -> HttpResponse {
        match TraceId::current() {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    async fn send(forwarded: Option<&str>) -> ServiceResponse {
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(echo_current)))
                .await;
        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = forwarded {
            req = req.insert_header((TRACE_ID_HEADER, value.to_owned()));
        }
        test::call_service(&app, req.to_request()).await
    }

    fn response_trace_id(res: &ServiceResponse) -> String {
        res.headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("header is ascii")
            .to_owned()
    }

    #[actix_web::test]
    async fn handler_sees_the_identifier_echoed_in_the_header() {
        let res = send(None).await;
        let trace_id = response_trace_id(&res);
        assert!(trace_id.parse::<TraceId>().is_ok(), "{trace_id} is a UUID");

        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8 body"), trace_id);
    }

    #[actix_web::test]
    async fn well_formed_forwarded_identifier_is_adopted() {
        let res = send(Some(FORWARDED)).await;
        assert_eq!(response_trace_id(&res), FORWARDED);

        let body = test::read_body(res).await;
        assert_eq!(body.as_ref(), FORWARDED.as_bytes());
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case("6f1c2d3e-4b5a-4c6d-8e7f")]
    #[actix_web::test]
    async fn malformed_forwarded_identifier_is_replaced(#[case] forwarded: &str) {
        let res = send(Some(forwarded)).await;
        let trace_id = response_trace_id(&res);
        assert_ne!(trace_id, forwarded);
        assert!(trace_id.parse::<TraceId>().is_ok());
    }

    #[actix_web::test]
    async fn each_request_gets_its_own_identifier() {
        let first = response_trace_id(&send(None).await);
        let second = response_trace_id(&send(None).await);
        assert_ne!(first, second);
    }

    #[actix_web::test]
    async fn rejected_logins_carry_the_request_trace_id() {
        let app = test::init_service(App::new().wrap(Trace).route(
            "/",
            web::get().to(|| async {
                ApiResult::<HttpResponse>::Err(DomainError::from(IdentityError::InvalidCredentials))
            }),
        ))
        .await;
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((TRACE_ID_HEADER, FORWARDED))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(response_trace_id(&res), FORWARDED);

        let body: DomainError = test::read_body_json(res).await;
        assert_eq!(body.trace_id(), Some(FORWARDED));
    }
}
