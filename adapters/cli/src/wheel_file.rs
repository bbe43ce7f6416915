//! TOML wheel definitions read by the command-line adapter.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use fortune_wheel_core::{Prize, PrizeSet, WheelConfig};
use serde::Deserialize;

const SUPPORTED_WHEEL_VERSION: u32 = 1;

/// Wheel configuration together with the prizes laid out on it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct WheelFile {
    pub(crate) config: WheelConfig,
    pub(crate) prizes: PrizeSet,
}

impl WheelFile {
    /// Reads and parses the wheel definition stored at `path`.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read wheel file at {}", path.display()))?;
        parse_wheel(&contents)
            .with_context(|| format!("invalid wheel file at {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    wheel: WheelConfig,
    #[serde(default)]
    prizes: Vec<Prize>,
}

fn parse_wheel(contents: &str) -> Result<WheelFile> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse wheel toml contents")?;
    if manifest.version != SUPPORTED_WHEEL_VERSION {
        bail!(
            "unsupported wheel file version {}; expected {}",
            manifest.version,
            SUPPORTED_WHEEL_VERSION
        );
    }

    Ok(WheelFile {
        config: manifest.wheel,
        prizes: PrizeSet::new(manifest.prizes),
    })
}
