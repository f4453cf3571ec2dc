//! Parametric path families used by slides.
//!
//! Each curve maps `t` in `[0, 1]` onto the playfield. Sampling, stitching and
//! arc-length estimation are free functions over any [`Curve`].

use std::f64::consts::PI;

use crate::types::Pixel;

/// Trajectory samples per second of slide time.
pub const SAMPLE_RATE: f64 = 60.0;

/// Samples used when estimating the length of a bezier chunk.
pub const ESTIMATE_SAMPLES: usize = 500;

/// Dense samples per evenly spaced output point.
const DENSITY: usize = 10;

pub trait Curve {
    fn point_at(&self, t: f64) -> Pixel;

    /// How many samples are enough to estimate this curve's length.
    fn length_hint(&self) -> usize;
}

/// Number of trajectory points for a piece of path lasting `duration_ms`.
pub fn sample_count(duration_ms: f64) -> usize {
    ((duration_ms * SAMPLE_RATE / 1000.0).floor().max(0.0) as usize + 1).max(2)
}

/// `n` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| if i + 1 == n && n > 1 { end } else { start + step * i as f64 })
}

pub fn sample<C: Curve + ?Sized>(curve: &C, count: usize) -> Vec<Pixel> {
    linspace(0.0, 1.0, count).map(|t| curve.point_at(t)).collect()
}

/// Sum of chord lengths over `samples` evenly spaced parameters.
pub fn estimate_length<C: Curve + ?Sized>(curve: &C, samples: usize) -> f64 {
    sample(curve, samples)
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum()
}

/// Joins consecutive pieces of one path, dropping the point each piece
/// shares with the one before it.
pub fn stitch(pieces: impl IntoIterator<Item = Vec<Pixel>>) -> Vec<Pixel> {
    let mut path: Vec<Pixel> = Vec::new();
    for piece in pieces {
        if !path.is_empty() {
            path.pop();
        }
        path.extend(piece);
    }
    path
}

/// Splits control points into independent chunks wherever a point repeats.
///
/// The repeated point ends one chunk and starts the next. Chunks with fewer
/// than two points carry no path and are dropped.
pub fn split_segments(points: &[Pixel]) -> Vec<&[Pixel]> {
    let mut chunks = Vec::new();
    let mut begin = 0;
    for i in 1..points.len() {
        if points[i] == points[i - 1] {
            chunks.push(&points[begin..i]);
            begin = i;
        }
    }
    chunks.push(&points[begin..]);
    chunks.retain(|chunk| chunk.len() >= 2);
    chunks
}

/// Shares of `total` proportional to `weights`; equal shares if they sum to 0.
pub fn proportion(weights: &[f64], total: f64) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 {
        weights.iter().map(|w| total * w / sum).collect()
    } else {
        vec![total / weights.len().max(1) as f64; weights.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bezier {
    control: Vec<Pixel>,
}

impl Bezier {
    pub fn new(control: Vec<Pixel>) -> Self {
        Self { control }
    }

    pub fn control_points(&self) -> &[Pixel] {
        &self.control
    }

    /// `count` points spaced at equal arc length along the curve.
    ///
    /// Raw parametric sampling bunches up near tightly packed control points,
    /// so the curve is sampled densely first and then inverted by arc length.
    pub fn evenly_spaced(&self, count: usize) -> Vec<Pixel> {
        if count == 0 {
            return Vec::new();
        }

        let dense = sample(self, (count * DENSITY).max(2));
        let mut arc = Vec::with_capacity(dense.len());
        let mut total = 0.0;
        arc.push(0.0);
        for pair in dense.windows(2) {
            total += pair[0].distance(pair[1]);
            arc.push(total);
        }

        linspace(0.0, total, count)
            .map(|target| {
                let i = arc.partition_point(|&len| len < target);
                if i == 0 {
                    return dense[0];
                }
                if i >= arc.len() {
                    return dense[dense.len() - 1];
                }

                let span = arc[i] - arc[i - 1];
                if span <= 0.0 {
                    dense[i]
                } else {
                    dense[i - 1].lerp(dense[i], (target - arc[i - 1]) / span)
                }
            })
            .collect()
    }
}

impl Curve for Bezier {
    fn point_at(&self, t: f64) -> Pixel {
        let n = self.control.len().saturating_sub(1);
        let mut point = Pixel::default();
        let mut coefficient = 1.0;
        for (i, control) in self.control.iter().enumerate() {
            if i > 0 {
                coefficient = coefficient * (n - i + 1) as f64 / i as f64;
            }
            let weight = coefficient * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32);
            point = point + *control * weight;
        }
        point
    }

    fn length_hint(&self) -> usize {
        self.control.len() * 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    pub from: Pixel,
    pub to: Pixel,
}

impl Linear {
    pub fn new(from: Pixel, to: Pixel) -> Self {
        Self { from, to }
    }
}

impl Curve for Linear {
    fn point_at(&self, t: f64) -> Pixel {
        self.from.lerp(self.to, t)
    }

    fn length_hint(&self) -> usize {
        2
    }
}

/// Outcome of fitting a circle through three slide control points.
#[derive(Debug, Clone, PartialEq)]
pub enum ArcFit {
    Circle(PerfectArc),
    /// No unique circle exists; trace these points as a polyline instead.
    Line(Vec<Pixel>),
}

/// A circular arc through three points, travelled from the first through the
/// second to the third.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfectArc {
    pub center: Pixel,
    pub radius: f64,
    head: f64,
    middle: f64,
    tail: f64,
    split: f64,
}

impl PerfectArc {
    pub fn fit([p0, p1, p2]: [Pixel; 3]) -> ArcFit {
        if p0 == p1 {
            return ArcFit::Line(vec![p1, p2]);
        }
        if p0 == p2 || p1 == p2 {
            return ArcFit::Line(vec![p0, p1]);
        }

        let d = 2.0 * (p0.x * (p1.y - p2.y) + p1.x * (p2.y - p0.y) + p2.x * (p0.y - p1.y));
        if d.abs() < 1e-6 {
            return ArcFit::Line(vec![p0, p1, p2]);
        }

        let s0 = p0.x * p0.x + p0.y * p0.y;
        let s1 = p1.x * p1.x + p1.y * p1.y;
        let s2 = p2.x * p2.x + p2.y * p2.y;
        let center = Pixel::new(
            (s0 * (p1.y - p2.y) + s1 * (p2.y - p0.y) + s2 * (p0.y - p1.y)) / d,
            (s0 * (p2.x - p1.x) + s1 * (p0.x - p2.x) + s2 * (p1.x - p0.x)) / d,
        );
        let radius = center.distance(p0);

        let angle = |p: Pixel| {
            let a = (p.y - center.y).atan2(p.x - center.x);
            if a < 0.0 {
                a + 2.0 * PI
            } else {
                a
            }
        };
        let (mut head, middle, mut tail) = (angle(p0), angle(p1), angle(p2));

        // Move one endpoint a full turn so the middle angle sits between them;
        // that picks the arc that actually passes through p1.
        if head > middle && middle < tail {
            if head > tail {
                head -= 2.0 * PI;
            } else {
                tail -= 2.0 * PI;
            }
        } else if head < middle && middle > tail {
            if head < tail {
                head += 2.0 * PI;
            } else {
                tail += 2.0 * PI;
            }
        }

        let first = (head - middle).abs();
        let second = (middle - tail).abs();

        ArcFit::Circle(Self {
            center,
            radius,
            head,
            middle,
            tail,
            split: first / (first + second),
        })
    }

    /// The parameter at which the arc passes its middle control point.
    pub fn split(&self) -> f64 {
        self.split
    }

    fn angle_at(&self, t: f64) -> f64 {
        if t > self.split {
            let u = (t - self.split) / (1.0 - self.split);
            self.middle * (1.0 - u) + self.tail * u
        } else {
            let u = t / self.split;
            self.head * (1.0 - u) + self.middle * u
        }
    }
}

impl Curve for PerfectArc {
    fn point_at(&self, t: f64) -> Pixel {
        let angle = self.angle_at(t);
        Pixel::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    fn length_hint(&self) -> usize {
        ((self.radius / 2.0).floor() as usize).max(2)
    }
}
