use serde::{Deserialize, Serialize};

use crate::error::{parse_field, ParseError};

/// Speed value used when a record omits it (the format's historic default).
const DEFAULT_SPEED: i32 = 4;

/// A `[TimingPoints]` line before inheritance is resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTimingPoint {
    pub start: i32,
    pub step: f64,
    pub speed: i32,
    pub uninherited: bool,
}

impl RawTimingPoint {
    /// Reads fields 0 (start), 1 (step), 2 (speed) and 6 (uninherited).
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 2 {
            return Err(ParseError::FieldCount {
                record: "timing point",
                expected: 2,
                found: parts.len(),
                line: line.to_string(),
            });
        }

        let start = parse_field::<f64>("timing point start", parts[0])? as i32;
        let step = parse_field("timing point step", parts[1])?;
        let speed = match parts.get(2) {
            Some(speed) => parse_field("timing point speed", speed)?,
            None => DEFAULT_SPEED,
        };
        let uninherited = match parts.get(6) {
            Some(flag) => parse_field::<i32>("timing point uninherited flag", flag)? != 0,
            None => true,
        };

        Ok(Self {
            start,
            step,
            speed,
            uninherited,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingPoint {
    pub start: i32,
    pub raw_step: f64,
    pub is_uninherited: bool,
    pub slide_multiplier: f64,
    pub bpm: f64,
    /// Milliseconds per beat of the governing uninherited point.
    pub base_step: f64,
    pub speed: i32,
}

impl TimingPoint {
    fn uninherited(start: i32, step: f64, speed: i32) -> Self {
        Self {
            start,
            raw_step: step,
            is_uninherited: true,
            slide_multiplier: 1.0,
            bpm: 60000.0 / step,
            base_step: step,
            speed,
        }
    }

    fn inherited(start: i32, step: f64, speed: i32, parent: &TimingPoint) -> Self {
        Self {
            start,
            raw_step: step,
            is_uninherited: false,
            // Only negative steps scale slides; a positive one leaves them at 1x.
            slide_multiplier: if step > 0.0 { 1.0 } else { 100.0 / -step },
            bpm: parent.bpm,
            base_step: parent.base_step,
            speed,
        }
    }
}

/// The resolved, time-ordered timing point chain of one beatmap.
///
/// Always holds at least the two bootstrap points, so every lookup has an
/// answer and every inherited point has an uninherited parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingPoints {
    points: Vec<TimingPoint>,
}

impl TimingPoints {
    pub fn from_records(records: &[RawTimingPoint]) -> Result<Self, ParseError> {
        let (first, rest) = records
            .split_first()
            .ok_or(ParseError::EmptyTimingPoints)?;
        if !first.uninherited {
            return Err(ParseError::InheritedFirstPoint(first.start));
        }

        // The first record is replaced by a tempo point at 0ms, covering objects
        // placed before it, and a neutral inherited point at its own start.
        let origin = TimingPoint::uninherited(0, first.step, first.speed);
        let neutral = TimingPoint::inherited(first.start, -100.0, first.speed, &origin);

        let mut points = Vec::with_capacity(records.len() + 1);
        points.push(origin);
        points.push(neutral);

        let mut parent = origin;
        let mut previous = first.start;
        for record in rest {
            if record.start < previous {
                return Err(ParseError::OutOfOrder {
                    what: "timing point",
                    time: record.start,
                    previous,
                });
            }
            previous = record.start;

            let point = if record.uninherited {
                parent = TimingPoint::uninherited(record.start, record.step, record.speed);
                parent
            } else {
                TimingPoint::inherited(record.start, record.step, record.speed, &parent)
            };
            points.push(point);
        }

        Ok(Self { points })
    }

    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self, ParseError> {
        let records = lines
            .into_iter()
            .map(RawTimingPoint::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_records(&records)
    }

    /// The last point starting at or before `time`, or the first point if
    /// `time` precedes the whole chain.
    pub fn at(&self, time: i32) -> &TimingPoint {
        self.points
            .iter()
            .take_while(|point| point.start <= time)
            .last()
            .unwrap_or(&self.points[0])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimingPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<'a> IntoIterator for &'a TimingPoints {
    type Item = &'a TimingPoint;
    type IntoIter = std::slice::Iter<'a, TimingPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
