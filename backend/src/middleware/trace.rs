//! Request correlation middleware.
//!
//! Every request is handled inside [`TraceId::scope`] with a fresh id and an
//! `info` span named `request`. The id is echoed in the `trace-id` response
//! header and embedded in any [`crate::domain::Error`] built while handling
//! the request, so a client report can be matched to server logs.

use std::rc::Rc;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, debug, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware factory; wrap the whole `App` with it.
///
/// ```
/// use actix_web::App;
/// use recipe_backend::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone, Copy, Debug, Default)]
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
    type Transform = TraceService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceService {
            inner: Rc::new(service),
        }))
    }
}

#[doc(hidden)]
pub struct TraceService<S> {
    inner: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TraceService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(inner);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::generate();
        let span = info_span!(
            "request",
            %trace_id,
            method = %req.method(),
            path = %req.path(),
        );
        let inner = Rc::clone(&self.inner);

        let handled = async move {
            let mut response = TraceId::scope(trace_id, inner.call(req)).await?;
            stamp_header(&mut response, trace_id);
            debug!(status = response.status().as_u16(), "request handled");
            Ok(response)
        };
        Box::pin(handled.instrument(span))
    }
}

fn stamp_header<B>(response: &mut ServiceResponse<B>, trace_id: TraceId) {
    let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) else {
        warn!(%trace_id, "trace id is not a valid header value");
        return;
    };
    response
        .headers_mut()
        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error as DomainError;
    use actix_web::{App, HttpResponse, test, web};

    fn header_of<B>(response: &ServiceResponse<B>) -> String {
        response
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace-id header present")
            .to_str()
            .expect("ascii header")
            .to_owned()
    }

    fn get_root() -> actix_http::Request {
        test::TestRequest::get().uri("/").to_request()
    }

    #[actix_web::test]
    async fn handler_runs_inside_the_advertised_scope() {
        let handler = || async {
            let id = TraceId::current()
                .map(|id| id.to_string())
                .unwrap_or_default();
            HttpResponse::Ok().body(id)
        };
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(handler))).await;

        let response = test::call_service(&app, get_root()).await;
        let header = header_of(&response);
        let body = test::read_body(response).await;

        assert_eq!(&body[..], header.as_bytes());
    }

    #[actix_web::test]
    async fn domain_errors_echo_the_header_id() {
        let handler = || async { Err::<HttpResponse, _>(DomainError::not_found("Not found.")) };
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(handler))).await;

        let response = test::call_service(&app, get_root()).await;
        let header = header_of(&response);
        let body: DomainError = test::read_body_json(response).await;

        assert_eq!(body.trace_id(), Some(header.as_str()));
    }

    #[actix_web::test]
    async fn each_request_gets_its_own_id() {
        let handler = || async { HttpResponse::NoContent().finish() };
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(handler))).await;

        let first = test::call_service(&app, get_root()).await;
        let second = test::call_service(&app, get_root()).await;

        assert_ne!(header_of(&first), header_of(&second));
    }
}
