use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::output;
use crate::page;
use crate::render::{self, DispatchOptions, RenderStats};
use crate::source;
use crate::template::PageTemplate;

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub url: String,
    pub template: PathBuf,
    pub dist: PathBuf,
    pub dispatch: DispatchOptions,
}

/// Fetch → parse → map → prepare output → load template → render all pages.
///
/// Any error returned is fatal and happens before the first page is written.
pub async fn run(client: &reqwest::Client, opts: &RunOptions) -> Result<RenderStats> {
    let records = source::load_records(client, &opts.url).await?;
    let pages = page::pages_from_records(&records)?;
    info!("Mapped {} pages", pages.len());

    for slug in page::duplicate_slugs(&pages) {
        warn!(
            "Slug {:?} appears more than once, its pages are written one at a time and the last one wins",
            slug
        );
    }

    output::ensure_dir(&opts.dist)?;
    let template = Arc::new(PageTemplate::load(&opts.template)?);

    render::render_pages(pages, template, &opts.dist, &opts.dispatch).await
}
