use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "STATIC_GEN";

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub template: Option<PathBuf>,
    pub dist: Option<PathBuf>,
    pub concurrency: Option<NonZeroUsize>,
}

/// Resolved settings: defaults, then `STATIC_GEN_*` environment variables,
/// then command-line overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub template: PathBuf,
    pub dist: PathBuf,
    pub concurrency: Option<NonZeroUsize>,
}

impl Settings {
    pub fn load(overrides: &Overrides) -> Result<Self> {
        Self::resolve(Environment::with_prefix(ENV_PREFIX), overrides)
    }

    /// An environment value is only parsed when no override replaces it, so a
    /// malformed variable is fatal only if it would actually be used.
    fn resolve(env: Environment, overrides: &Overrides) -> Result<Self> {
        let path_value = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());

        Config::builder()
            .set_default("template", "template.html")?
            .set_default("dist", "dist")?
            .add_source(env.try_parsing(true))
            .set_override_option("template", path_value(&overrides.template))?
            .set_override_option("dist", path_value(&overrides.dist))?
            .set_override_option("concurrency", overrides.concurrency.map(|n| n.get() as i64))?
            .build()
            .and_then(|c| c.try_deserialize())
            .context("Invalid STATIC_GEN_* settings")
    }
}
