//! Template source loading and its parse cache.
//!
//! An importer is rooted at a directory and resolves logical template paths
//! (no extension) to `.htmy` source files. Parsed trees go into an
//! [`ImportCache`] that is constructed explicitly and threaded through; the
//! cache is write-once per path and never invalidated, so a source is read
//! and parsed at most once per cache lifetime even under concurrent renders.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::error::{Error, Result};
use crate::lexer::tokenize;
use crate::parser::ast::SyntaxNode;
use crate::parser::parse;

type CacheCell = Arc<OnceCell<Arc<SyntaxNode>>>;

/// Shared parse cache keyed by resolved template path.
///
/// Each path owns a once-cell, so the check-then-populate sequence is atomic
/// per key: two concurrent first imports of the same path parse once and
/// share the tree. First writer wins; entries are never replaced.
#[derive(Debug, Clone, Default)]
pub struct ImportCache {
    cells: Arc<Mutex<HashMap<PathBuf, CacheCell>>>,
}

impl ImportCache {
    pub fn new() -> ImportCache {
        ImportCache::default()
    }

    fn cell(&self, path: &Path) -> CacheCell {
        let mut cells = self
            .cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Arc::clone(cells.entry(path.to_path_buf()).or_default())
    }
}

/// Loads and parses template sources relative to a root directory.
#[derive(Debug, Clone)]
pub struct Importer {
    root: PathBuf,
    cache: ImportCache,
}

impl Importer {
    pub fn new(root: impl Into<PathBuf>, cache: ImportCache) -> Importer {
        Importer {
            root: root.into(),
            cache,
        }
    }

    /// An importer whose root is `base` under this one's root, sharing the
    /// same cache.
    pub fn relative_to(&self, base: impl AsRef<Path>) -> Importer {
        Importer {
            root: self.root.join(base),
            cache: self.cache.clone(),
        }
    }

    /// The cache key and source location (minus extension) for a logical
    /// template path.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub async fn resolve_and_import(&self, path: impl AsRef<Path>) -> Result<Arc<SyntaxNode>> {
        self.import(&self.resolve_path(path)).await
    }

    /// Returns the parsed tree for an already-resolved path, reading and
    /// parsing the source only if no cache entry exists yet.
    pub async fn import(&self, path: &Path) -> Result<Arc<SyntaxNode>> {
        let cell = self.cache.cell(path);

        let tree = cell
            .get_or_try_init(|| async { self.load(path).await.map(Arc::new) })
            .await?;

        Ok(Arc::clone(tree))
    }

    async fn load(&self, path: &Path) -> Result<SyntaxNode> {
        let source_path = source_path(path);

        let source = tokio::fs::read_to_string(&source_path)
            .await
            .map_err(|source| Error::Io {
                path: source_path,
                source,
            })?;

        let tokens = tokenize(&source)?;
        let tree = parse(&tokens)?;

        match &tree {
            SyntaxNode::Children(children) if children.nodes.is_empty() => {
                Err(Error::EmptyTree {
                    path: path.to_path_buf(),
                })
            }
            _ => Ok(tree),
        }
    }

    /// Enumerates the `.htmy` sources under `dir` and returns their resolved
    /// paths, extension stripped, as the known-components set.
    pub async fn preload(&self, dir: impl AsRef<Path>) -> Result<HashSet<PathBuf>> {
        let importer = self.relative_to(dir);

        let mut entries = tokio::fs::read_dir(&importer.root)
            .await
            .map_err(|source| Error::Io {
                path: importer.root.clone(),
                source,
            })?;

        let mut paths = HashSet::new();

        while let Some(entry) = entries.next_entry().await.map_err(|source| Error::Io {
            path: importer.root.clone(),
            source,
        })? {
            let name = PathBuf::from(entry.file_name());

            if name.extension().is_some_and(|ext| ext == "htmy") {
                paths.insert(importer.resolve_path(name.with_extension("")));
            }
        }

        Ok(paths)
    }
}

/// `views/test1` loads from `views/test1.htmy`. The suffix is appended to
/// the whole file name, not swapped in as an extension, so dotted template
/// names stay intact.
fn source_path(path: &Path) -> PathBuf {
    let mut source = OsString::from(path.as_os_str());
    source.push(".htmy");

    PathBuf::from(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_path_appends_the_suffix() {
        assert_eq!(
            source_path(Path::new("views/test1")),
            PathBuf::from("views/test1.htmy")
        );
        assert_eq!(
            source_path(Path::new("views/v1.card")),
            PathBuf::from("views/v1.card.htmy")
        );
    }

    #[test]
    fn relative_importers_compose_roots() {
        let importer = Importer::new("views", ImportCache::new());
        let components = importer.relative_to("components");

        assert_eq!(
            components.resolve_path("card"),
            PathBuf::from("views/components/card")
        );
        assert_eq!(
            components.relative_to("nested").resolve_path("leaf"),
            PathBuf::from("views/components/nested/leaf")
        );
    }
}
