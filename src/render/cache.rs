//! Compiled template cache
//!
//! Maps a full template path to its compiled form. Each key is compiled at
//! most once: the dashmap shard stays write-locked while the entry is built,
//! so concurrent first requests for the same path wait for one compile.

use crate::error::RenderError;
use dashmap::DashMap;
use minijinja::Environment;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A parsed template ready for execution
///
/// Owns its own environment so the compiled form can outlive the request that
/// created it. The environment carries a path loader rooted at the template
/// directory for `extends`/`include`.
pub struct CompiledTemplate {
    env: Environment<'static>,
    name: String,
}

impl CompiledTemplate {
    /// Read `path` and compile it under the logical `name`
    pub fn compile(template_dir: &Path, name: &str, path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(template_dir));
        env.add_template_owned(name.to_string(), source)
            .map_err(|source| RenderError::Template {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            env,
            name: name.to_string(),
        })
    }

    /// Execute against `ctx`, streaming output into `out`
    pub fn execute<S, W>(&self, ctx: S, out: W) -> Result<(), RenderError>
    where
        S: serde::Serialize,
        W: std::io::Write,
    {
        let template = self
            .env
            .get_template(&self.name)
            .map_err(|source| RenderError::Execution {
                name: self.name.clone(),
                source,
            })?;
        template
            .render_to_write(ctx, out)
            .map(|_| ())
            .map_err(|source| RenderError::Execution {
                name: self.name.clone(),
                source,
            })
    }
}

/// Per-renderer cache of compiled templates
#[derive(Default)]
pub struct TemplateCache {
    entries: DashMap<PathBuf, Arc<CompiledTemplate>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached template for `path`, compiling it with `compile` on first use
    ///
    /// A failed compile leaves no entry behind, so the next call retries.
    pub fn get_or_compile<F>(&self, path: &Path, compile: F) -> Result<Arc<CompiledTemplate>, RenderError>
    where
        F: FnOnce() -> Result<CompiledTemplate, RenderError>,
    {
        if let Some(hit) = self.entries.get(path) {
            return Ok(Arc::clone(hit.value()));
        }
        let entry = self
            .entries
            .entry(path.to_path_buf())
            .or_try_insert_with(|| compile().map(Arc::new))?;
        Ok(Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
