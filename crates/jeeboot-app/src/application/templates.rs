//! The template resource seam.
//!
//! A route names its template (`"jeeboot.html"`); a [`TemplateSource`] turns
//! that name into markup when the route activates.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template exists under that name.
    #[error("template not found: {0}")]
    NotFound(String),

    /// The name would escape the template directory.
    #[error("invalid template name: {0:?}")]
    InvalidName(String),

    /// The template exists but could not be read.
    #[error("I/O error reading template {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves template resource names to markup.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch(&self, resource: &str) -> Result<String, TemplateError>;
}
