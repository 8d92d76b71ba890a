//! Template rendering module
//!
//! Bridges request handlers to minijinja: resolves a logical template name
//! under the configured directory, compiles it (fresh on every call in debug
//! mode, once per path otherwise) and executes it against a string-keyed
//! context.

mod cache;

pub use cache::{CompiledTemplate, TemplateCache};

use crate::error::{RenderError, RenderResult};
use crate::http::{self, response, Body};
use crate::logger;
use hyper::http::request::Parts;
use hyper::{Method, Response};
use serde::Deserialize;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Data passed to a template
pub type Context = serde_json::Map<String, Value>;

/// Renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Directory template names are resolved against
    pub template_dir: PathBuf,
    /// `Content-Type` of rendered responses
    pub content_type: String,
    /// Re-read templates from disk on every render
    pub debug: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("templates"),
            content_type: "text/html; charset=utf-8".to_string(),
            debug: true,
        }
    }
}

/// A named renderer the host can call from any handler
pub trait Render: Send + Sync {
    /// Render template `name` with `data` into `out`
    ///
    /// `request` is the head of the request being answered.
    fn render(
        &self,
        out: &mut dyn Write,
        name: &str,
        data: &Value,
        request: &Parts,
    ) -> RenderResult<()>;
}

/// minijinja-backed renderer
pub struct TemplateRenderer {
    options: RenderOptions,
    cache: TemplateCache,
    compilations: AtomicUsize,
}

impl TemplateRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            cache: TemplateCache::new(),
            compilations: AtomicUsize::new(0),
        }
    }

    pub const fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Number of template compiles performed so far
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    fn compile(&self, name: &str, path: &std::path::Path) -> RenderResult<CompiledTemplate> {
        let compiled = CompiledTemplate::compile(&self.options.template_dir, name, path)?;
        self.compilations.fetch_add(1, Ordering::Relaxed);
        logger::log_template_compiled(path);
        Ok(compiled)
    }

    fn template(&self, name: &str) -> RenderResult<Arc<CompiledTemplate>> {
        let path = self.options.template_dir.join(name);
        if self.options.debug {
            return self.compile(name, &path).map(Arc::new);
        }
        self.cache.get_or_compile(&path, || self.compile(name, &path))
    }

    /// Render into a `200` response carrying the configured content type
    pub fn render_response(
        &self,
        name: &str,
        data: &Value,
        request: &Parts,
    ) -> RenderResult<Response<Body>> {
        let mut buf = Vec::new();
        self.render(&mut buf, name, data, request)?;
        Ok(response::build_rendered_response(
            buf,
            &self.options.content_type,
            request.method == Method::HEAD,
        ))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl Render for TemplateRenderer {
    fn render(
        &self,
        out: &mut dyn Write,
        name: &str,
        data: &Value,
        _request: &Parts,
    ) -> RenderResult<()> {
        let template = self.template(name)?;
        let ctx = as_context(data)?;
        template.execute(ctx, out)
    }
}

/// Require a string-keyed map
fn as_context(data: &Value) -> RenderResult<&Context> {
    data.as_object().ok_or(RenderError::InvalidContext {
        kind: value_kind(data),
    })
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Log a render failure and answer it with a 500
pub fn render_error_response(err: &RenderError) -> Response<Body> {
    logger::log_render_error(err);
    http::build_500_response()
}
