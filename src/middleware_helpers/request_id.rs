use crate::tracing::{scope_request_id, RequestId};
use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest client supplied id that is propagated as-is
const MAX_INCOMING_LEN: usize = 128;

fn incoming_id(request: &Request) -> Option<RequestId> {
    let raw = request.headers().get(&REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    (!raw.is_empty() && raw.len() <= MAX_INCOMING_LEN).then(|| RequestId::new(raw))
}

/// Reuses the caller's `x-request-id` or mints one, exposes it to the
/// handler (extension and task-local) and echoes it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = incoming_id(&request).unwrap_or_else(RequestId::generate);
    let header = HeaderValue::from_str(id.as_str()).ok();

    if let Some(value) = &header {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, value.clone());
    }
    request.extensions_mut().insert(id.clone());

    let mut response = scope_request_id(id, next.run(request)).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        extract::Extension,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn echo(Extension(id): Extension<RequestId>) -> String {
        let scoped = crate::tracing::current_request_id();
        assert_eq!(scoped.as_ref(), Some(&id));
        id.to_string()
    }

    async fn call(header: Option<&str>) -> (Option<String>, String) {
        let app = Router::new()
            .route("/", get(echo))
            .layer(axum::middleware::from_fn(request_id_middleware));

        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("x-request-id", value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let echoed = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (echoed, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn keeps_the_callers_id() {
        let (echoed, seen) = call(Some("upstream-42")).await;
        assert_eq!(echoed.as_deref(), Some("upstream-42"));
        assert_eq!(seen, "upstream-42");
    }

    #[tokio::test]
    async fn mints_an_id_when_missing_or_blank() {
        for header in [None, Some("   ")] {
            let (echoed, seen) = call(header).await;
            let echoed = echoed.expect("response carries an id");
            assert_eq!(echoed, seen);
            assert!(uuid::Uuid::parse_str(&echoed).is_ok());
        }
    }

    #[tokio::test]
    async fn oversized_ids_are_replaced() {
        let long = "x".repeat(MAX_INCOMING_LEN + 1);
        let (echoed, _) = call(Some(&long)).await;
        assert_ne!(echoed.as_deref(), Some(long.as_str()));
    }
}
