//! Filesystem template source: reads template resources from the assets
//! directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::application::templates::{TemplateError, TemplateSource};

/// Reads templates from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsTemplateSource {
    root: PathBuf,
}

impl FsTemplateSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, resource: &str) -> Result<PathBuf, TemplateError> {
        let rel = Path::new(resource);
        let plain = !resource.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(TemplateError::InvalidName(resource.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl TemplateSource for FsTemplateSource {
    async fn fetch(&self, resource: &str) -> Result<String, TemplateError> {
        let path = self.resolve(resource)?;
        debug!("loading template {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => TemplateError::NotFound(resource.to_string()),
                _ => TemplateError::Io {
                    name: resource.to_string(),
                    source,
                },
            })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
