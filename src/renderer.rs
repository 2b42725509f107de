//! The render boundary exposed to callers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::eval::{Scope, TemplateEvaluator};
use crate::importer::{ImportCache, Importer};

/// Renders named templates from a views directory.
///
/// The renderer owns the import cache, so parsed templates persist across
/// renders for its whole lifetime.
pub struct Renderer {
    importer: Importer,
}

impl Renderer {
    pub fn new(views: impl Into<PathBuf>) -> Renderer {
        Renderer {
            importer: Importer::new(views, ImportCache::new()),
        }
    }

    /// Renders `name` with `scope` as the outermost scope. The `components`
    /// directory is preloaded first so elements can resolve as components.
    pub async fn render(&self, name: &str, scope: Arc<Scope>) -> Result<String> {
        let components = self.importer.preload("components").await?;

        let tree = self.importer.resolve_and_import(name).await?;

        let evaluator =
            TemplateEvaluator::new(scope, Arc::new(components), self.importer.clone());

        evaluator.evaluate(&tree).await
    }
}
