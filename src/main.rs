mod error;
mod output;
mod page;
mod pipeline;
mod render;
mod settings;
mod source;
mod template;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use crate::pipeline::RunOptions;
use crate::render::DispatchOptions;
use crate::settings::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "static-generator", about = "Generator of static pages from CSV")]
struct Cli {
    /// CSV download URL
    #[arg(short, long)]
    url: String,
    /// Path to template HTML [default: template.html, env: STATIC_GEN_TEMPLATE]
    #[arg(short, long)]
    template: Option<PathBuf>,
    /// Directory for storing HTML files [default: dist, env: STATIC_GEN_DIST]
    #[arg(short, long)]
    dist: Option<PathBuf>,
    /// Max pages rendered at once (default: unbounded) [env: STATIC_GEN_CONCURRENCY]
    #[arg(short, long)]
    concurrency: Option<NonZeroUsize>,
    /// Show a progress bar while rendering
    #[arg(long)]
    progress: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(&Overrides {
        template: cli.template,
        dist: cli.dist,
        concurrency: cli.concurrency,
    })?;

    let opts = RunOptions {
        url: cli.url,
        template: settings.template,
        dist: settings.dist,
        dispatch: DispatchOptions {
            concurrency: settings.concurrency,
            progress: cli.progress,
        },
    };

    let stats = pipeline::run(&reqwest::Client::new(), &opts).await?;

    info!("All pages have been created successfully.");
    info!(
        "Rendered {} pages ({} ok, {} errors) into {}",
        stats.total,
        stats.ok,
        stats.errors,
        opts.dist.display()
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::time::Duration;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn url_is_required() {
        assert!(Cli::try_parse_from(["static-generator"]).is_err());
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from([
            "static-generator", "-u", "https://example.com/a.csv", "-t", "page.html", "-d", "out", "-c", "8",
        ])
        .unwrap();
        assert_eq!(cli.url, "https://example.com/a.csv");
        assert_eq!(cli.template, Some(PathBuf::from("page.html")));
        assert_eq!(cli.dist, Some(PathBuf::from("out")));
        assert_eq!(cli.concurrency, NonZeroUsize::new(8));
        assert!(!cli.progress);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(Cli::try_parse_from(["static-generator", "-u", "x", "-c", "0"]).is_err());
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
