//! Request spans, HTTP metrics and response hardening headers.

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, field, info, info_span};
use uuid::Uuid;

use crate::api::AppState;

/// GET /admin/metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// Coarse area of the API a path belongs to, used as a low-cardinality label.
#[must_use]
pub fn route_group(path: &str) -> &'static str {
    let Some(rest) = path.strip_prefix("/api/") else {
        return "system";
    };

    match rest.split('/').next() {
        Some("auth") => "auth",
        Some("user") => "user",
        Some("admin") => "admin",
        Some("public") => "public",
        _ => "system",
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let group = route_group(&path);

    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    // `user_id` and `role` are filled in by the auth middleware.
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        group = group,
        route = matched_path.clone(),
        user_id = field::Empty,
        role = field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let status = response.status().as_u16();

        let outcome = match status {
            500.. => "error",
            400..=499 => "client_error",
            _ => "success",
        };

        let route = matched_path.unwrap_or_else(|| "unmatched".to_string());

        let labels = [
            ("method", method),
            ("group", group.to_string()),
            ("path", route),
            ("status", status.to_string()),
        ];

        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        if status == 401 || status == 403 {
            metrics::counter!("http_auth_rejections_total", "group" => group).increment(1);
        }

        info!(
            event = "http_request_finished",
            duration_ms,
            status_code = status,
            outcome,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::route_group;

    #[test]
    fn test_route_group_by_prefix() {
        assert_eq!(route_group("/api/auth/login/user"), "auth");
        assert_eq!(route_group("/api/user/watchlist/550"), "user");
        assert_eq!(route_group("/api/admin/users/3"), "admin");
        assert_eq!(route_group("/api/public/movies/popular"), "public");
        assert_eq!(route_group("/api/health"), "system");
        assert_eq!(route_group("/"), "system");
    }

    #[test]
    fn test_route_group_does_not_match_lookalikes() {
        assert_eq!(route_group("/api/administrator"), "system");
        assert_eq!(route_group("/apiuser/profile"), "system");
        assert_eq!(route_group("/wp-admin/setup.php"), "system");
    }
}
