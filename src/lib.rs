//! Reconstructs the cursor trajectory of an osu! beatmap and lines it up with
//! the frames of a gameplay recording.

pub mod beatmap;
pub mod config;
pub mod curve;
pub mod dataset;
pub mod error;
pub mod hit_object;
pub mod sync;
pub mod timing;
pub mod types;
pub mod viewport;

#[cfg(feature = "python")]
mod python;

pub use beatmap::{parse_beatmap, Beatmap};
pub use config::ConvertorConfig;
pub use dataset::{Dataset, DatasetBuilder};
pub use error::{Error, ParseError, Result};
pub use hit_object::HitObject;
pub use sync::{FrameClock, FrameLabels, FrameSource, LabeledFrame, SyncConfig};
pub use timing::{TimingPoint, TimingPoints};
pub use types::*;
pub use viewport::Viewport;
