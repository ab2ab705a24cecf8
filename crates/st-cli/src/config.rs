//! Run configuration: deck locations, output names, rule files.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use st_core::NormalizerChain;

const APKG_EXT: &str = ".apkg";

/// Environment override for where archives are unpacked.
pub const WORK_DIR_ENV: &str = "ST_WORK_DIR";

/// Every file the run reads from or may write to.
#[derive(Debug, PartialEq, Eq)]
pub struct DeckPaths {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub output: PathBuf,
    pub output_source: PathBuf,
}

impl DeckPaths {
    /// Outputs default to overwriting the deck they were read from.
    /// Output names never rename the deck inside the archive.
    pub fn resolve(
        source: &str,
        destination: &str,
        output: Option<&str>,
        output_source: Option<&str>,
    ) -> Self {
        Self {
            source: input_path(source),
            destination: input_path(destination),
            output: output_path(output.unwrap_or(destination)),
            output_source: output_path(output_source.unwrap_or(source)),
        }
    }
}

fn strip_ext(name: &str) -> &str {
    name.strip_suffix(APKG_EXT).unwrap_or(name)
}

/// A deck is named with or without `.apkg`; an unpacked directory is used as is.
fn input_path(name: &str) -> PathBuf {
    let as_given = PathBuf::from(name);
    if as_given.is_dir() {
        return as_given;
    }
    PathBuf::from(format!("{}{APKG_EXT}", strip_ext(name)))
}

fn output_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{}{APKG_EXT}", strip_ext(name)))
}

/// Load a normalizer chain from a TOML rule file, or fall back to `default`.
pub fn load_chain(path: Option<&Path>, default: NormalizerChain) -> Result<NormalizerChain> {
    let Some(path) = path else {
        return Ok(default);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule file {}", path.display()))?;
    let chain: NormalizerChain = toml::from_str(&content)
        .with_context(|| format!("invalid rule file {}", path.display()))?;
    tracing::info!(
        "loaded {} rule(s) from {} (disambiguate={})",
        chain.rules.len(),
        path.display(),
        chain.disambiguate
    );
    Ok(chain)
}

pub fn work_root() -> Option<PathBuf> {
    env::var(WORK_DIR_ENV).ok().map(PathBuf::from)
}

/// With overwriting disabled, refuse up front so neither deck gets written.
pub fn ensure_writable(paths: &[&Path], overwrite: bool) -> Result<()> {
    if overwrite {
        return Ok(());
    }
    for path in paths {
        if path.exists() {
            bail!(
                "{} already exists; drop --no-overwrite or choose another output name",
                path.display()
            );
        }
    }
    Ok(())
}
