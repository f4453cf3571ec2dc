use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::curve::{
    estimate_length, linspace, proportion, sample, sample_count, split_segments, stitch, ArcFit,
    Bezier, Curve, Linear, PerfectArc, ESTIMATE_SAMPLES, SAMPLE_RATE,
};
use crate::error::{parse_field, ParseError};
use crate::timing::{TimingPoint, TimingPoints};
use crate::types::{Difficulty, PathType, Pixel, Sample};

const TAP_BIT: u32 = 1;
const SLIDE_BIT: u32 = 1 << 1;
const SPIN_BIT: u32 = 1 << 3;
const OBJECT_BITS: u32 = TAP_BIT | SLIDE_BIT | SPIN_BIT;

pub const SPIN_CENTER: Pixel = Pixel::new(256.0, 192.0);
pub const SPIN_RADIUS: f64 = 44.0;
/// Spinner revolutions per second.
pub const SPIN_CPS: f64 = 477.26 / 120.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HitObject {
    Tap(Tap),
    Slide(Slide),
    Spin(Spin),
}

impl HitObject {
    /// Builds one object from a `[HitObjects]` line.
    ///
    /// The type field must carry exactly one of the tap, slide or spin bits;
    /// combo bits are ignored.
    pub fn parse(
        line: &str,
        timing: &TimingPoints,
        difficulty: &Difficulty,
    ) -> Result<Self, ParseError> {
        let parts: Vec<&str> = line.split(',').collect();
        require_fields(&parts, 4, "hit object", line)?;

        let x = parse_field("x", parts[0])?;
        let y = parse_field("y", parts[1])?;
        let time: i32 = parse_field("time", parts[2])?;
        let object_type: u32 = parse_field("type", parts[3])?;
        let head = Pixel::new(x, y);

        match object_type & OBJECT_BITS {
            TAP_BIT => Ok(HitObject::Tap(Tap::new(head, time))),
            SLIDE_BIT => {
                require_fields(&parts, 8, "slider", line)?;
                let path = SlidePath::parse(head, parts[5], parts[6], parts[7])?;
                Ok(HitObject::Slide(Slide::new(
                    time,
                    path,
                    timing.at(time),
                    difficulty,
                )?))
            }
            SPIN_BIT => {
                require_fields(&parts, 6, "spinner", line)?;
                let end = parse_field("spinner end", parts[5])?;
                Ok(HitObject::Spin(Spin::new(time, end)?))
            }
            _ => Err(ParseError::UnknownObjectType(object_type)),
        }
    }

    pub fn points(&self) -> &[Pixel] {
        match self {
            HitObject::Tap(tap) => std::slice::from_ref(&tap.position),
            HitObject::Slide(slide) => &slide.points,
            HitObject::Spin(spin) => &spin.points,
        }
    }

    pub fn times(&self) -> &[i32] {
        match self {
            HitObject::Tap(tap) => std::slice::from_ref(&tap.time),
            HitObject::Slide(slide) => &slide.times,
            HitObject::Spin(spin) => &spin.times,
        }
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.points()
            .iter()
            .zip(self.times())
            .map(|(&position, &time)| Sample::new(position, time))
    }

    pub fn start_time(&self) -> i32 {
        self.times()[0]
    }

    pub fn end_time(&self) -> i32 {
        self.times()[self.times().len() - 1]
    }
}

fn require_fields(
    parts: &[&str],
    expected: usize,
    record: &'static str,
    line: &str,
) -> Result<(), ParseError> {
    if parts.len() < expected {
        return Err(ParseError::FieldCount {
            record,
            expected,
            found: parts.len(),
            line: line.to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tap {
    pub position: Pixel,
    pub time: i32,
}

impl Tap {
    pub fn new(position: Pixel, time: i32) -> Self {
        Self { position, time }
    }
}

/// The declared shape of a slide, as written in the beatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidePath {
    pub path_type: PathType,
    /// The slide head followed by its control points.
    pub points: Vec<Pixel>,
    pub repeats: u32,
    /// Declared pixel length of one pass.
    pub length: f64,
}

impl SlidePath {
    /// Parses `FLAG|x:y|x:y|...`, the repeat count and the pixel length.
    pub fn parse(head: Pixel, spec: &str, repeats: &str, length: &str) -> Result<Self, ParseError> {
        let mut parts = spec.split('|');
        let path_type = PathType::from_flag(parts.next().unwrap_or_default())?;

        let mut points = vec![head];
        for point in parts {
            let (x, y) = point
                .split_once(':')
                .ok_or_else(|| ParseError::number("slider point", point))?;
            points.push(Pixel::new(
                parse_field("slider point", x)?,
                parse_field("slider point", y)?,
            ));
        }

        Ok(Self {
            path_type,
            points,
            repeats: parse_field("slider repeats", repeats)?,
            length: parse_field("slider length", length)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub path: SlidePath,
    /// Milliseconds for one traversal of the path.
    pub pass_duration: f64,
    points: Vec<Pixel>,
    times: Vec<i32>,
}

impl Slide {
    pub fn new(
        start: i32,
        path: SlidePath,
        timing: &TimingPoint,
        difficulty: &Difficulty,
    ) -> Result<Self, ParseError> {
        let pass = path.length / (100.0 * difficulty.slider_multiplier * timing.slide_multiplier)
            * timing.base_step;
        if !pass.is_finite() || pass < 0.0 {
            return Err(ParseError::InvalidSlideDuration {
                time: start,
                duration: pass,
            });
        }

        let base = trace_pass(path.path_type, &path.points, pass);
        let base_times: Vec<f64> =
            linspace(start as f64, start as f64 + pass, base.len()).collect();

        // Later passes bounce back and forth, sharing the turnaround point.
        let mut points = base.clone();
        let mut times = base_times.clone();
        for k in 1..path.repeats.max(1) {
            if k % 2 == 1 {
                points.extend(base.iter().rev().skip(1));
            } else {
                points.extend(base.iter().skip(1));
            }
            let offset = pass * k as f64;
            times.extend(base_times.iter().skip(1).map(|t| t + offset));
        }

        Ok(Self {
            path,
            pass_duration: pass,
            points,
            times: times.into_iter().map(|t| t.round() as i32).collect(),
        })
    }

    pub fn points(&self) -> &[Pixel] {
        &self.points
    }

    pub fn times(&self) -> &[i32] {
        &self.times
    }
}

/// One traversal of a slide path, rounded to whole playfield units.
///
/// `points` always starts with the slide head, so it is never empty.
fn trace_pass(path_type: PathType, points: &[Pixel], duration: f64) -> Vec<Pixel> {
    let path = match path_type {
        PathType::Bezier => trace_bezier(points, duration),
        PathType::Linear => trace_linear(points, duration),
        PathType::Perfect => match <[Pixel; 3]>::try_from(points) {
            Ok(three) => match PerfectArc::fit(three) {
                ArcFit::Circle(arc) => sample(&arc, sample_count(duration)),
                ArcFit::Line(line) => trace_linear(&line, duration),
            },
            // The game traces arcs with any other point count as beziers.
            Err(_) => trace_bezier(points, duration),
        },
    };

    path.into_iter().map(Pixel::round).collect()
}

fn trace_bezier(points: &[Pixel], duration: f64) -> Vec<Pixel> {
    let chunks = split_segments(points);
    if chunks.is_empty() {
        return vec![points[0]; 2];
    }

    let curves: Vec<Bezier> = chunks
        .into_iter()
        .map(|chunk| Bezier::new(chunk.to_vec()))
        .collect();
    let lengths: Vec<f64> = curves
        .iter()
        .map(|curve| estimate_length(curve, ESTIMATE_SAMPLES))
        .collect();

    stitch(
        curves
            .iter()
            .zip(proportion(&lengths, duration))
            .map(|(curve, time)| curve.evenly_spaced(sample_count(time))),
    )
}

fn trace_linear(points: &[Pixel], duration: f64) -> Vec<Pixel> {
    if points.len() < 2 {
        return vec![points[0]; 2];
    }

    let segments: Vec<Linear> = points
        .windows(2)
        .map(|pair| Linear::new(pair[0], pair[1]))
        .collect();
    let lengths: Vec<f64> = segments
        .iter()
        .map(|segment| estimate_length(segment, segment.length_hint()))
        .collect();

    stitch(
        segments
            .iter()
            .zip(proportion(&lengths, duration))
            .map(|(segment, time)| sample(segment, sample_count(time))),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    points: Vec<Pixel>,
    times: Vec<i32>,
}

impl Spin {
    /// Traces a clockwise circle around the playfield center from `start` to `end`.
    pub fn new(start: i32, end: i32) -> Result<Self, ParseError> {
        if end < start {
            return Err(ParseError::SpinReversed { start, end });
        }

        let duration = (end - start) as f64;
        let sweep = SPIN_CPS * duration / 1000.0 * 2.0 * PI;
        let steps = ((duration * SAMPLE_RATE / 1000.0).ceil() as usize).max(1);

        let mut angles: Vec<f64> = linspace(0.0, sweep, steps).collect();
        angles.reverse();
        let points = angles
            .into_iter()
            .map(|angle| {
                Pixel::new(
                    SPIN_CENTER.x + SPIN_RADIUS * angle.cos(),
                    SPIN_CENTER.y + SPIN_RADIUS * angle.sin(),
                )
                .round()
            })
            .collect();
        let times = linspace(start as f64, end as f64, steps)
            .map(|t| t.ceil() as i32)
            .collect();

        Ok(Self { points, times })
    }

    pub fn points(&self) -> &[Pixel] {
        &self.points
    }

    pub fn times(&self) -> &[i32] {
        &self.times
    }
}
