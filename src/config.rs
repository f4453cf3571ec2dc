use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::sync::SyncConfig;
use crate::viewport::Viewport;

const DEFAULT_SIZE: (u32, u32) = (1280, 720);

/// One conversion job, read from a `key=value` file.
///
/// ```text
/// osu=maps/song.osu
/// osr=recordings/song.mp4
/// delay=40
/// size=1280,720
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertorConfig {
    pub beatmap: PathBuf,
    pub video: Option<PathBuf>,
    /// Milliseconds the video lags behind the beatmap.
    pub delay: i32,
    pub size: (u32, u32),
}

impl ConvertorConfig {
    pub fn new(beatmap: impl Into<PathBuf>) -> Self {
        Self {
            beatmap: beatmap.into(),
            video: None,
            delay: 0,
            size: DEFAULT_SIZE,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = content.parse()?;
        debug!("loaded job {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::with_delay(self.delay)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.size.0, self.size.1)
    }
}

impl FromStr for ConvertorConfig {
    type Err = Error;

    fn from_str(content: &str) -> Result<Self> {
        let mut beatmap = None;
        let mut video = None;
        let mut delay = 0;
        let mut size = DEFAULT_SIZE;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = line.split_once('=').unwrap_or((line, ""));
            match key.trim() {
                "osu" => beatmap = Some(PathBuf::from(value)),
                "osr" => video = Some(PathBuf::from(value)),
                "delay" => {
                    delay = value.trim().parse().map_err(|_| {
                        Error::Config(format!("delay must be an integer, got {value:?}"))
                    })?
                }
                "size" => size = parse_size(value)?,
                other => warn!("ignoring unknown config key {other:?}"),
            }
        }

        let beatmap = beatmap.ok_or_else(|| Error::Config("missing osu= beatmap path".into()))?;

        Ok(Self {
            beatmap,
            video,
            delay,
            size,
        })
    }
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let invalid = || Error::Config(format!("size must be \"width,height\", got {value:?}"));

    let (width, height) = value.split_once(',').ok_or_else(invalid)?;
    let width = width.trim().parse().map_err(|_| invalid())?;
    let height = height.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}
