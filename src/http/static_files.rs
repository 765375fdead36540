//! Static file fallback for paths no route claims.

use std::convert::Infallible;
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::http::response::not_found;

/// Serves files below a root directory; `/` resolves to `index.html`.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    dir: ServeDir,
}

impl StaticFiles {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: ServeDir::new(root).append_index_html_on_directories(true),
        }
    }

    /// Resolve `request` against the root. Missing files yield a plain-text 404.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let result: Result<_, Infallible> = self.dir.clone().oneshot(request).await;
        match result {
            Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(),
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[tokio::test]
    async fn test_serves_index_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>scan</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        let files = StaticFiles::new(dir.path());

        let index = files
            .serve(Request::get("/").body(Body::empty()).unwrap())
            .await;
        assert_eq!(index.status(), StatusCode::OK);
        let content_type = index.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));

        let script = files
            .serve(Request::get("/app.js").body(Body::empty()).unwrap())
            .await;
        assert_eq!(script.status(), StatusCode::OK);
        let body = axum::body::to_bytes(script.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"console.log(1)");
    }

    #[tokio::test]
    async fn test_missing_file_is_plain_404() {
        let dir = tempfile::tempdir().unwrap();
        let files = StaticFiles::new(dir.path());

        let response = files
            .serve(Request::get("/api/nowhere/x?q=1").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"404 Not Found");
    }

    #[tokio::test]
    async fn test_traversal_is_not_served() {
        let dir = tempfile::tempdir().unwrap();
        let files = StaticFiles::new(dir.path());

        let response = files
            .serve(Request::get("/../../etc/passwd").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
