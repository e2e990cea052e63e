//! Gateway identity extraction.
//!
//! Authentication happens upstream: the API gateway verifies the session
//! and forwards the caller's identity in trusted headers. This middleware
//! only turns those headers into a per-request `Visitor`; requests without
//! them proceed as anonymous and fail the actions' own auth checks.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::common::{MemberId, Visitor, VisitorRole};

pub const MEMBER_ID_HEADER: &str = "x-member-id";
pub const MEMBER_ROLE_HEADER: &str = "x-member-role";

pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let visitor = visitor_from_headers(&request);
    request.extensions_mut().insert(visitor);
    next.run(request).await
}

fn visitor_from_headers(request: &Request) -> Visitor {
    let member_id = request
        .headers()
        .get(MEMBER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| MemberId::parse(v).ok());

    let role = request
        .headers()
        .get(MEMBER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(VisitorRole::parse);

    match (member_id, role) {
        (Some(member_id), Some(role)) => Visitor::authenticated(member_id, role),
        _ => Visitor::anonymous(),
    }
}
