use axum::{
    body::Body,
    http::{Request, StatusCode, header::ORIGIN},
    middleware::Next,
    response::Response,
};

use crate::errors::HttpError;

/// Browsers attach `Origin` to cross-site requests; only the local dashboard
/// may call the API.
pub async fn require_local_origin(req: Request<Body>, next: Next) -> Result<Response, HttpError> {
    if let Some(origin) = req.headers().get(ORIGIN) {
        let origin = origin.to_str().map_err(|_| {
            HttpError::new(
                StatusCode::BAD_REQUEST,
                "invalid Origin header",
                Some("invalid_origin".to_string()),
            )
        })?;
        if !is_loopback_origin(origin) {
            tracing::warn!(origin, "rejected request from foreign origin");
            return Err(HttpError::new(
                StatusCode::FORBIDDEN,
                "invalid origin",
                Some("invalid_origin".to_string()),
            ));
        }
    }
    Ok(next.run(req).await)
}

fn is_loopback_origin(origin: &str) -> bool {
    ["127.0.0.1", "localhost", "[::1]"].iter().any(|host| {
        ["http", "https"].iter().any(|scheme| {
            let prefix = format!("{scheme}://{host}");
            origin == prefix || origin.starts_with(&format!("{prefix}:"))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::is_loopback_origin;

    #[test]
    fn loopback_origins() {
        assert!(is_loopback_origin("http://localhost:3846"));
        assert!(is_loopback_origin("http://127.0.0.1:5173"));
        assert!(is_loopback_origin("https://[::1]:8443"));
        assert!(is_loopback_origin("http://localhost"));
        assert!(!is_loopback_origin("http://localhost.evil.com"));
        assert!(!is_loopback_origin("https://example.com"));
    }
}
