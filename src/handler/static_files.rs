//! Static asset middleware
//!
//! Wraps a downstream hyper service. GET/HEAD requests under the configured
//! prefix are answered from an [`AssetSource`], falling back to the index file
//! of the requested directory; everything else, including misses, goes to the
//! downstream service untouched.

use crate::error::AssetError;
use crate::http::{self, Body};
use crate::logger;
use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::service::Service;
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;

/// Middleware configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticOptions {
    /// Suppress the per-asset log line
    pub skip_logging: bool,
    /// File served when the requested path names a directory
    pub index_file: String,
    /// URL path prefix the assets are mounted under
    pub dir: String,
}

impl Default for StaticOptions {
    fn default() -> Self {
        Self {
            skip_logging: false,
            index_file: "index.html".to_string(),
            dir: String::new(),
        }
    }
}

impl StaticOptions {
    fn init(mut self) -> Self {
        if self.index_file.is_empty() {
            self.index_file = "index.html".to_string();
        }
        self
    }
}

/// Byte retrieval keyed by relative asset path
///
/// Implemented for any `Fn(&str) -> Result<Bytes, AssetError>`, so a closure
/// over a bundle generated at build time is enough.
pub trait AssetSource: Send + Sync {
    fn get(&self, path: &str) -> Result<Bytes, AssetError>;

    /// Modification time of `path`, when the source tracks one
    fn modified(&self, _path: &str) -> Option<SystemTime> {
        None
    }
}

impl<F> AssetSource for F
where
    F: Fn(&str) -> Result<Bytes, AssetError> + Send + Sync,
{
    fn get(&self, path: &str) -> Result<Bytes, AssetError> {
        self(path)
    }
}

struct Inner<A> {
    source: A,
    options: StaticOptions,
    started: SystemTime,
}

/// Static asset middleware factory
///
/// Cheap to clone; every clone shares the source, options and start time.
pub struct StaticFiles<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for StaticFiles<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

enum Lookup {
    Found { path: String, data: Bytes },
    Missing,
}

impl<A: AssetSource> StaticFiles<A> {
    /// Create the middleware; the current time becomes `Last-Modified` for
    /// assets whose source reports no modification time
    pub fn new(source: A, options: StaticOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                options: options.init(),
                started: SystemTime::now(),
            }),
        }
    }

    pub fn options(&self) -> &StaticOptions {
        &self.inner.options
    }

    pub fn started_at(&self) -> SystemTime {
        self.inner.started
    }

    /// Wrap `next`, producing the service to mount
    pub fn wrap<S>(&self, next: S) -> StaticService<A, S> {
        StaticService {
            files: self.clone(),
            next,
        }
    }

    /// Answer the request from the asset source, or `None` to pass it on
    pub fn try_serve(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Option<Response<Body>> {
        if *method != Method::GET && *method != Method::HEAD {
            return None;
        }
        // Asset names are matched unescaped; undecodable paths go downstream
        let Ok(path) = percent_decode_str(path).decode_utf8() else {
            return None;
        };
        let path = path.as_ref();
        let rest = path.strip_prefix(self.inner.options.dir.as_str())?;
        let file = rest.strip_prefix('/').unwrap_or(rest);

        if file.split('/').any(|segment| segment == "..") {
            logger::log_warning(&format!("Path traversal attempt passed through: {path}"));
            return None;
        }

        let (asset_path, data) = match self.lookup(file) {
            Ok(Lookup::Found { path, data }) => (path, data),
            Ok(Lookup::Missing) => return None,
            Err((asset, err)) => {
                logger::log_asset_source_error(&asset, &err);
                return Some(http::build_500_response());
            }
        };

        if !self.inner.options.skip_logging {
            logger::log_static_served(path);
        }

        let modified = self
            .inner
            .source
            .modified(&asset_path)
            .unwrap_or(self.inner.started);
        Some(http::serve_content(method, headers, &asset_path, modified, data))
    }

    /// Primary lookup, then the index file of `file` as a directory
    fn lookup(&self, file: &str) -> Result<Lookup, (String, AssetError)> {
        match self.inner.source.get(file) {
            Ok(data) => {
                return Ok(Lookup::Found {
                    path: file.to_string(),
                    data,
                })
            }
            Err(AssetError::NotFound) => {}
            Err(err) => return Err((file.to_string(), err)),
        }

        let index = join_index(file, &self.inner.options.index_file);
        match self.inner.source.get(&index) {
            Ok(data) => Ok(Lookup::Found { path: index, data }),
            Err(AssetError::NotFound) => Ok(Lookup::Missing),
            Err(err) => Err((index, err)),
        }
    }
}

/// `dir` joined with `index`, ignoring trailing and doubled separators
fn join_index(dir: &str, index: &str) -> String {
    let segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    if segments.is_empty() {
        index.to_string()
    } else {
        format!("{}/{index}", segments.join("/"))
    }
}

/// Service produced by [`StaticFiles::wrap`]
pub struct StaticService<A, S> {
    files: StaticFiles<A>,
    next: S,
}

impl<A, S: Clone> Clone for StaticService<A, S> {
    fn clone(&self) -> Self {
        Self {
            files: self.files.clone(),
            next: self.next.clone(),
        }
    }
}

impl<A, S, B> Service<Request<B>> for StaticService<A, S>
where
    A: AssetSource + 'static,
    S: Service<Request<B>, Response = Response<Body>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        if let Some(resp) = self
            .files
            .try_serve(req.method(), req.uri().path(), req.headers())
        {
            return Box::pin(std::future::ready(Ok(resp)));
        }
        Box::pin(self.next.call(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::date::format_http_date;
    use http_body_util::{BodyExt, Empty, Full};
    use hyper::header::{CONTENT_TYPE, LAST_MODIFIED};
    use hyper::service::service_fn;
    use hyper::StatusCode;
    use std::convert::Infallible;
    use std::sync::Mutex;

    type Calls = Arc<Mutex<Vec<String>>>;

    /// Source holding `app.js`, `my file.css` and `docs/index.html`, recording
    /// every lookup
    fn recording_source(calls: &Calls) -> impl AssetSource + 'static {
        let calls = Arc::clone(calls);
        move |path: &str| {
            calls.lock().unwrap().push(path.to_string());
            match path {
                "app.js" => Ok(Bytes::from_static(b"console.log(1);")),
                "docs/index.html" | "index.html" => Ok(Bytes::from_static(b"<h1>docs</h1>")),
                "my file.css" => Ok(Bytes::from_static(b"a{}")),
                "broken.bin" => Err(AssetError::other("disk on fire")),
                _ => Err(AssetError::NotFound),
            }
        }
    }

    fn downstream(
        req: Request<Empty<Bytes>>,
    ) -> impl Future<Output = Result<Response<Body>, Infallible>> {
        let body = format!("downstream {} {}", req.method(), req.uri().path());
        async move {
            Ok(Response::builder()
                .status(StatusCode::IM_A_TEAPOT)
                .body(Full::new(Bytes::from(body)))
                .unwrap())
        }
    }

    fn request(method: Method, path: &str) -> Request<Empty<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Empty::new())
            .unwrap()
    }

    fn middleware(calls: &Calls) -> StaticFiles<impl AssetSource + 'static> {
        StaticFiles::new(
            recording_source(calls),
            StaticOptions {
                dir: "/static".to_string(),
                skip_logging: true,
                ..StaticOptions::default()
            },
        )
    }

    async fn body_string(resp: Response<Body>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_asset_with_startup_last_modified() {
        let calls = Calls::default();
        let files = middleware(&calls);
        let svc = files.wrap(service_fn(downstream));

        let resp = svc.call(request(Method::GET, "/static/app.js")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[LAST_MODIFIED],
            format_http_date(files.started_at()).as_str()
        );
        assert_eq!(
            resp.headers()[CONTENT_TYPE],
            "text/javascript; charset=utf-8"
        );
        assert_eq!(body_string(resp).await, "console.log(1);");
        assert_eq!(*calls.lock().unwrap(), vec!["app.js"]);
    }

    #[tokio::test]
    async fn test_last_modified_is_stable_across_requests() {
        let calls = Calls::default();
        let files = middleware(&calls);
        let svc = files.wrap(service_fn(downstream));

        let first = svc.call(request(Method::GET, "/static/app.js")).await.unwrap();
        let second = svc.call(request(Method::HEAD, "/static/app.js")).await.unwrap();
        assert_eq!(first.headers()[LAST_MODIFIED], second.headers()[LAST_MODIFIED]);
        assert!(body_string(second).await.is_empty());
    }

    #[tokio::test]
    async fn test_miss_tries_index_then_delegates() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc.call(request(Method::GET, "/static/missing")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(body_string(resp).await, "downstream GET /static/missing");
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["missing", "missing/index.html"]
        );
    }

    #[tokio::test]
    async fn test_directory_falls_back_to_index_file() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc.call(request(Method::GET, "/static/docs/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(body_string(resp).await, "<h1>docs</h1>");
        assert_eq!(*calls.lock().unwrap(), vec!["docs/", "docs/index.html"]);
    }

    #[tokio::test]
    async fn test_prefix_root_serves_root_index() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc.call(request(Method::GET, "/static")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(*calls.lock().unwrap(), vec!["", "index.html"]);
    }

    #[tokio::test]
    async fn test_post_skips_asset_source() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc.call(request(Method::POST, "/static/app.js")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(body_string(resp).await, "downstream POST /static/app.js");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_prefix_delegates() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc.call(request(Method::GET, "/api/app.js")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parent_segments_are_not_looked_up() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc
            .call(request(Method::GET, "/static/../secret.txt"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_escaped_names_are_decoded() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc
            .call(request(Method::GET, "/static/my%20file.css"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "a{}");
        assert_eq!(*calls.lock().unwrap(), vec!["my file.css"]);
    }

    #[tokio::test]
    async fn test_escaped_parent_segments_are_not_looked_up() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc
            .call(request(Method::GET, "/static/%2e%2e/secret.txt"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_delegates() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc.call(request(Method::GET, "/static/%ff.js")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert!(calls.lock().unwrap().is_empty());
    }

    /// Log sink shared between the subscriber and the assertions
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn served_log_lines(skip_logging: bool) -> usize {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let calls = Calls::default();
        let files = StaticFiles::new(
            recording_source(&calls),
            StaticOptions {
                dir: "/static".to_string(),
                skip_logging,
                ..StaticOptions::default()
            },
        );
        tracing::subscriber::with_default(subscriber, || {
            let resp = files.try_serve(&Method::GET, "/static/app.js", &HeaderMap::new());
            assert_eq!(resp.map(|r| r.status()), Some(StatusCode::OK));
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        output.matches("[Static] Serving /static/app.js").count()
    }

    #[test]
    fn test_served_asset_is_logged_once() {
        assert_eq!(served_log_lines(false), 1);
    }

    #[test]
    fn test_skip_logging_suppresses_served_line() {
        assert_eq!(served_log_lines(true), 0);
    }

    #[tokio::test]
    async fn test_source_failure_is_500() {
        let calls = Calls::default();
        let svc = middleware(&calls).wrap(service_fn(downstream));

        let resp = svc.call(request(Method::GET, "/static/broken.bin")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(*calls.lock().unwrap(), vec!["broken.bin"]);
    }

    #[tokio::test]
    async fn test_source_modified_time_wins() {
        struct Dated;
        impl AssetSource for Dated {
            fn get(&self, _path: &str) -> Result<Bytes, AssetError> {
                Ok(Bytes::from_static(b"x"))
            }
            fn modified(&self, _path: &str) -> Option<SystemTime> {
                Some(SystemTime::UNIX_EPOCH)
            }
        }

        let svc = StaticFiles::new(Dated, StaticOptions::default()).wrap(service_fn(downstream));
        let resp = svc.call(request(Method::GET, "/x.txt")).await.unwrap();
        assert_eq!(resp.headers()[LAST_MODIFIED], "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn test_empty_index_file_gets_default() {
        let files = StaticFiles::new(
            |_: &str| -> Result<Bytes, AssetError> { Err(AssetError::NotFound) },
            StaticOptions {
                index_file: String::new(),
                ..StaticOptions::default()
            },
        );
        assert_eq!(files.options().index_file, "index.html");
        assert_eq!(files.options().dir, "");
    }

    #[test]
    fn test_join_index() {
        assert_eq!(join_index("", "index.html"), "index.html");
        assert_eq!(join_index("docs", "index.html"), "docs/index.html");
        assert_eq!(join_index("docs/", "index.html"), "docs/index.html");
        assert_eq!(join_index("a//b/./", "home.htm"), "a/b/home.htm");
    }
}
