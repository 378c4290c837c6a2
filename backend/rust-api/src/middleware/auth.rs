use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use fieldtrack_core::StaffId;

/// Set by the upstream login collaborator on every authenticated request.
pub const STAFF_ID_HEADER: &str = "x-staff-id";
pub const STAFF_ROLE_HEADER: &str = "x-staff-role";

#[derive(Clone, Debug)]
pub struct AuthStaff {
    pub staff_id: StaffId,
    pub is_admin: bool,
}

impl AuthStaff {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(STAFF_ID_HEADER)?.to_str().ok()?;
        let staff_id = StaffId::parse(raw).ok()?;
        let is_admin = headers
            .get(STAFF_ROLE_HEADER)
            .and_then(|h| h.to_str().ok())
            .map_or(false, |role| role.trim().eq_ignore_ascii_case("admin"));
        Some(Self { staff_id, is_admin })
    }
}

fn declined(status: StatusCode, code: &str, message: &str) -> Response {
    let body = serde_json::json!({ "code": code, "message": message });
    (status, Json(body)).into_response()
}

pub async fn staff_identity(mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if path == "/health" {
        return next.run(req).await;
    }

    let Some(staff) = AuthStaff::from_headers(req.headers()) else {
        return declined(StatusCode::UNAUTHORIZED, "STAFF_ID_REQUIRED", "Missing or blank X-Staff-Id header");
    };

    // Fleet views are admin only.
    if path.starts_with("/api/admin/") && !staff.is_admin {
        tracing::warn!("staff_id={} denied {}", staff.staff_id, path);
        return declined(StatusCode::FORBIDDEN, "ADMIN_REQUIRED", "Insufficient permissions");
    }

    req.extensions_mut().insert(staff);
    next.run(req).await
}
