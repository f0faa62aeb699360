use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a run before any page is rendered.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load CSV from URL {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read CSV: {0}")]
    Parse(#[from] ParseError),

    /// Data row with fewer than the three positional fields a page needs.
    #[error("row at line {line} has {fields} field(s), expected at least 3 (slug, title, description)")]
    Mapping { line: u64, fields: usize },

    #[error("failed to create directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read template file {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template file {}: {source}", path.display())]
    TemplateSyntax {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("quoted field starting at line {line} is never closed")]
    UnterminatedQuote { line: u64 },

    #[error("bare \" in field at line {line}")]
    BareQuote { line: u64 },
}

/// Per-page failure. Logged by the renderer, never fatal to the run.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("slug {0:?} is not a safe file name")]
    UnsafeSlug(String),

    #[error("failed to create file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("failed to write to file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
