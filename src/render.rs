use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tracing::{info, warn};

use crate::error::RenderError;
use crate::page::{duplicate_slugs, is_safe_slug, Page};
use crate::template::PageTemplate;

#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Max renderers running at once. `None` spawns every page immediately.
    pub concurrency: Option<NonZeroUsize>,
    pub progress: bool,
}

/// Render stats returned after every task has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

struct PageOutcome {
    ok: bool,
}

/// Render one page to `<dist>/<slug>.html`, creating or truncating the file.
pub async fn render_page(
    page: &Page,
    template: &PageTemplate,
    dist: &Path,
) -> Result<PathBuf, RenderError> {
    if !is_safe_slug(&page.slug) {
        return Err(RenderError::UnsafeSlug(page.slug.clone()));
    }

    let path = dist.join(page.file_name());
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|source| RenderError::Create {
            path: path.clone(),
            source,
        })?;

    let body = template.render(page).map_err(|source| RenderError::Render {
        path: path.clone(),
        source,
    })?;

    let write_err = |source: std::io::Error| RenderError::Write {
        path: path.clone(),
        source,
    };
    file.write_all(&body).await.map_err(write_err)?;
    file.flush().await.map_err(write_err)?;

    Ok(path)
}

/// Spawn one render task per page and wait until all of them have finished.
///
/// Pages sharing a slug take turns on a per-slug lock, so their file always
/// holds one complete page. Per-page failures are logged and counted, never
/// returned.
pub async fn render_pages(
    pages: Vec<Page>,
    template: Arc<PageTemplate>,
    dist: &Path,
    options: &DispatchOptions,
) -> Result<RenderStats> {
    let total = pages.len();
    let semaphore = options
        .concurrency
        .map(|n| Arc::new(Semaphore::new(n.get())));
    let dist = Arc::new(dist.to_path_buf());
    let slug_locks: HashMap<String, Arc<Mutex<()>>> = duplicate_slugs(&pages)
        .into_iter()
        .map(|slug| (slug.to_string(), Arc::new(Mutex::new(()))))
        .collect();

    info!(
        "Rendering {} pages from {} into {}",
        total,
        template.source().display(),
        dist.display()
    );

    let pb = if options.progress {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Every task owns a sender; rx yields None once the last one is dropped,
    // whether its task succeeded, failed or panicked.
    let (tx, mut rx) = mpsc::channel::<PageOutcome>(total.max(1));

    for page in pages {
        let template = Arc::clone(&template);
        let sem = semaphore.clone();
        let dist = Arc::clone(&dist);
        let tx = tx.clone();
        let slug_lock = slug_locks.get(&page.slug).cloned();

        tokio::spawn(async move {
            let _permit = match &sem {
                Some(sem) => sem.acquire().await.ok(),
                None => None,
            };
            let _turn = match &slug_lock {
                Some(lock) => Some(lock.lock().await),
                None => None,
            };
            let ok = match render_page(&page, &template, &dist).await {
                Ok(path) => {
                    info!("File {} created successfully", path.display());
                    true
                }
                Err(e) => {
                    warn!("Page {:?} failed: {}", page.slug, e);
                    false
                }
            };
            let _ = tx.send(PageOutcome { ok }).await;
        });
    }

    drop(tx);

    let mut ok = 0usize;
    let mut reported = 0usize;
    while let Some(outcome) = rx.recv().await {
        reported += 1;
        if outcome.ok {
            ok += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if reported < total {
        warn!("{} render task(s) ended without reporting", total - reported);
    }

    Ok(RenderStats {
        total,
        ok,
        errors: total - ok,
    })
}
