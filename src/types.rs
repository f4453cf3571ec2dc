use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use crate::error::{parse_field, ParseError};

/// A point in the beatmap's logical 512x384 playfield.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn round(self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    pub fn powf(self, exp: f64) -> Self {
        Self::new(self.x.powf(exp), self.y.powf(exp))
    }

    pub fn distance(self, other: Pixel) -> f64 {
        let d = other - self;
        (d.x * d.x + d.y * d.y).sqrt()
    }

    /// Linear interpolation towards `other`.
    pub fn lerp(self, other: Pixel, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Add for Pixel {
    type Output = Pixel;

    fn add(self, rhs: Pixel) -> Pixel {
        Pixel::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pixel {
    type Output = Pixel;

    fn sub(self, rhs: Pixel) -> Pixel {
        Pixel::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// Scalar offsets move both coordinates.
impl Add<f64> for Pixel {
    type Output = Pixel;

    fn add(self, rhs: f64) -> Pixel {
        Pixel::new(self.x + rhs, self.y + rhs)
    }
}

impl Sub<f64> for Pixel {
    type Output = Pixel;

    fn sub(self, rhs: f64) -> Pixel {
        Pixel::new(self.x - rhs, self.y - rhs)
    }
}

impl Mul<f64> for Pixel {
    type Output = Pixel;

    fn mul(self, rhs: f64) -> Pixel {
        Pixel::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Pixel> for f64 {
    type Output = Pixel;

    fn mul(self, rhs: Pixel) -> Pixel {
        rhs * self
    }
}

impl Div<f64> for Pixel {
    type Output = Pixel;

    fn div(self, rhs: f64) -> Pixel {
        Pixel::new(self.x / rhs, self.y / rhs)
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Pixel {
    fn from((x, y): (f64, f64)) -> Self {
        Pixel::new(x, y)
    }
}

/// One point of a reconstructed cursor trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub position: Pixel,
    /// Milliseconds from the start of the song.
    pub time: i32,
}

impl Sample {
    pub fn new(position: Pixel, time: i32) -> Self {
        Self { position, time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub slider_multiplier: f64,
    /// Parsed for completeness, trajectories never use it.
    pub slider_tick_rate: f64,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            slider_multiplier: 1.4,
            slider_tick_rate: 1.0,
        }
    }
}

impl Difficulty {
    /// Builds from `Key:Value` lines, keeping only the slider keys.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self, ParseError> {
        let mut difficulty = Difficulty::default();

        for line in lines {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };

            match key.trim() {
                "SliderMultiplier" => {
                    difficulty.slider_multiplier = parse_field("SliderMultiplier", value)?
                }
                "SliderTickRate" => {
                    difficulty.slider_tick_rate = parse_field("SliderTickRate", value)?
                }
                _ => {}
            }
        }

        Ok(difficulty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathType {
    Bezier,  // B
    Perfect, // P
    Linear,  // L
}

impl PathType {
    pub fn from_flag(flag: &str) -> Result<Self, ParseError> {
        match flag {
            "B" => Ok(PathType::Bezier),
            "P" => Ok(PathType::Perfect),
            "L" => Ok(PathType::Linear),
            other => Err(ParseError::UnknownPathType(other.to_string())),
        }
    }
}
