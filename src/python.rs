use numpy::PyArray2;
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::beatmap::parse_beatmap;
use crate::dataset::DatasetBuilder;
use crate::error::Error;
use crate::sync::{FrameClock, SyncConfig};
use crate::viewport::Viewport;

impl From<Error> for PyErr {
    fn from(err: Error) -> Self {
        match err {
            Error::Io { .. } => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

fn frame_clock(frame_limit: Option<u64>) -> FrameClock {
    frame_limit.map_or_else(FrameClock::new, FrameClock::with_limit)
}

/// Trajectory samples of a beatmap as an (N, 3) array of x, y, time
#[pyfunction]
fn beatmap_samples(py: Python<'_>, file_path: String) -> PyResult<&PyArray2<f64>> {
    let beatmap = parse_beatmap(&file_path)?;
    let rows: Vec<Vec<f64>> = beatmap
        .samples()
        .map(|sample| vec![sample.position.x, sample.position.y, sample.time as f64])
        .collect();

    if rows.is_empty() {
        return Ok(PyArray2::zeros(py, [0, 3], false));
    }
    Ok(PyArray2::from_vec2(py, &rows)?)
}

/// Per-frame cursor labels, `None` where the frame is idle
#[pyfunction]
#[pyo3(signature = (file_path, delay = 0, frame_limit = None))]
fn label_frames(
    file_path: String,
    delay: i32,
    frame_limit: Option<u64>,
) -> PyResult<Vec<Option<(f64, f64)>>> {
    let beatmap = parse_beatmap(&file_path)?;
    let labels = beatmap
        .label_frames(frame_clock(frame_limit), SyncConfig::with_delay(delay))
        .map(|frame| frame.position.map(|p| (p.x, p.y)))
        .collect();
    Ok(labels)
}

/// Screen positions and click flags for every frame
#[pyfunction]
#[pyo3(signature = (file_path, delay = 0, frame_limit = None, width = 1280, height = 720))]
fn build_dataset(
    file_path: String,
    delay: i32,
    frame_limit: Option<u64>,
    width: u32,
    height: u32,
) -> PyResult<(Vec<(i32, i32)>, Vec<u8>)> {
    let beatmap = parse_beatmap(&file_path)?;
    let mut builder = DatasetBuilder::new(Viewport::new(width, height));
    builder.extend(
        beatmap
            .label_frames(frame_clock(frame_limit), SyncConfig::with_delay(delay))
            .map(|frame| frame.position),
    );

    let dataset = builder.finish();
    Ok((dataset.positions, dataset.clicks))
}

#[pymodule]
fn osu_trace(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(beatmap_samples, m)?)?;
    m.add_function(wrap_pyfunction!(label_frames, m)?)?;
    m.add_function(wrap_pyfunction!(build_dataset, m)?)?;
    Ok(())
}
