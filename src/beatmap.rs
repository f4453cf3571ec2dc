use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, ParseError, Result};
use crate::hit_object::HitObject;
use crate::sync::{FrameLabels, FrameSource, SyncConfig};
use crate::timing::TimingPoints;
use crate::types::{Difficulty, Sample};

const TIMING_POINTS: &str = "TimingPoints";
const HIT_OBJECTS: &str = "HitObjects";
const DIFFICULTY: &str = "Difficulty";
const NEEDED_SECTIONS: [&str; 3] = [TIMING_POINTS, HIT_OBJECTS, DIFFICULTY];

const VERSION_PREFIX: &str = "osu file format v";

/// Everything needed to reconstruct the cursor trajectory of one beatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Beatmap {
    pub format_version: Option<u32>,
    pub timing_points: TimingPoints,
    pub difficulty: Difficulty,
    /// In file order, which is also time order.
    pub hit_objects: Vec<HitObject>,
}

pub fn parse_beatmap(file_path: impl AsRef<Path>) -> Result<Beatmap> {
    let path = file_path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let beatmap: Beatmap = content.parse()?;
    debug!(
        "loaded {} ({} timing points, {} hit objects)",
        path.display(),
        beatmap.timing_points.len(),
        beatmap.hit_objects.len()
    );
    Ok(beatmap)
}

impl Beatmap {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        parse_beatmap(path)
    }

    /// Every trajectory sample of every object, in time order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.hit_objects.iter().flat_map(|object| object.samples())
    }

    /// Labels frames pulled from `source` against this beatmap's trajectory.
    pub fn label_frames<S: FrameSource>(
        &self,
        source: S,
        config: SyncConfig,
    ) -> FrameLabels<S, impl Iterator<Item = Sample> + '_> {
        FrameLabels::new(source, self.samples(), config)
    }

    pub fn end_time(&self) -> Option<i32> {
        self.hit_objects.last().map(HitObject::end_time)
    }
}

impl FromStr for Beatmap {
    type Err = ParseError;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let content = content.trim_start_matches('\u{feff}');
        let mut format_version = None;
        let mut sections: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut current: Option<&str> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if let Some(version) = line.strip_prefix(VERSION_PREFIX) {
                format_version = version.trim().parse().ok();
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = &line[1..line.len() - 1];
                current = NEEDED_SECTIONS.iter().copied().find(|needed| *needed == name);
                if let Some(name) = current {
                    sections.entry(name).or_default();
                }
                continue;
            }

            if let Some(name) = current {
                sections.entry(name).or_default().push(line);
            }
        }

        let section = |name: &'static str| {
            sections
                .get(name)
                .map(Vec::as_slice)
                .ok_or(ParseError::MissingSection(name))
        };

        let difficulty = Difficulty::from_lines(section(DIFFICULTY)?.iter().copied())?;
        let timing_points = TimingPoints::parse(section(TIMING_POINTS)?.iter().copied())?;

        let mut hit_objects: Vec<HitObject> = Vec::new();
        for line in section(HIT_OBJECTS)? {
            let object = HitObject::parse(line, &timing_points, &difficulty)?;
            if let Some(previous) = hit_objects.last() {
                if object.start_time() < previous.start_time() {
                    return Err(ParseError::OutOfOrder {
                        what: "hit object",
                        time: object.start_time(),
                        previous: previous.start_time(),
                    });
                }
            }
            hit_objects.push(object);
        }

        debug!(
            "parsed v{} beatmap: {} timing points, {} hit objects",
            format_version.unwrap_or(0),
            timing_points.len(),
            hit_objects.len()
        );

        Ok(Beatmap {
            format_version,
            timing_points,
            difficulty,
            hit_objects,
        })
    }
}
