use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub(crate) const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id for one request, echoed in `meta.request_id` and the
/// `x-request-id` response header.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Accepts a caller-supplied id only if it is short visible ASCII; anything
/// else is replaced so it cannot bloat logs or response headers.
fn inbound_request_id(req: &Request) -> Option<String> {
    let raw = req.headers().get(&REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let acceptable = !raw.is_empty()
        && raw.len() <= MAX_REQUEST_ID_LEN
        && raw.bytes().all(|b| b.is_ascii_graphic());
    acceptable.then(|| raw.to_string())
}

/// Attaches a [`RequestId`] extension and mirrors it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = inbound_request_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}
