use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::curve::linspace;
use crate::error::{Error, Result};
use crate::types::Pixel;
use crate::viewport::Viewport;

/// Where the cursor is assumed to rest before the first label.
const REST_POSITION: Pixel = Pixel::new(256.0, 192.0);

/// One screen position and one click flag per frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub positions: Vec<(i32, i32)>,
    pub clicks: Vec<u8>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.clicks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote {} frames to {}", self.len(), path.display());
        Ok(())
    }
}

/// Turns a stream of frame labels into a gap-free cursor track.
///
/// Idle frames between two labels are filled by walking in a straight line
/// from the previous labeled position to the next one.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    viewport: Viewport,
    prev: Pixel,
    gap: usize,
    dataset: Dataset,
}

impl DatasetBuilder {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            prev: REST_POSITION,
            gap: 0,
            dataset: Dataset::default(),
        }
    }

    pub fn push(&mut self, label: Option<Pixel>) {
        self.dataset.clicks.push(u8::from(label.is_some()));

        let Some(current) = label else {
            self.gap += 1;
            return;
        };

        if self.gap > 0 {
            self.fill_gap(current);
        }
        self.dataset.positions.push(self.viewport.to_screen(current));
        self.prev = current;
    }

    pub fn finish(mut self) -> Dataset {
        if self.gap > 0 {
            self.fill_gap(self.prev);
        }
        self.dataset
    }

    fn fill_gap(&mut self, towards: Pixel) {
        let k = self.gap;
        let (prev, viewport) = (self.prev, self.viewport);
        self.dataset.positions.extend(
            linspace(1.0 / k as f64, 1.0, k)
                .map(|s| viewport.to_screen((prev + (towards - prev) * s).round())),
        );
        self.gap = 0;
    }
}

impl Extend<Option<Pixel>> for DatasetBuilder {
    fn extend<T: IntoIterator<Item = Option<Pixel>>>(&mut self, labels: T) {
        for label in labels {
            self.push(label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(labels: &[Option<Pixel>]) -> Dataset {
        let mut builder = DatasetBuilder::new(Viewport::new(640, 480));
        builder.extend(labels.iter().copied());
        builder.finish()
    }

    #[test]
    fn labeled_frames_map_straight_to_screen() {
        let dataset = build(&[Some(Pixel::new(0.0, 0.0)), Some(Pixel::new(10.0, 20.0))]);

        assert_eq!(dataset.clicks, vec![1, 1]);
        assert_eq!(dataset.positions, vec![(64, 55), (74, 75)]);
    }

    #[test]
    fn leading_gap_walks_from_the_rest_position() {
        let dataset = build(&[None, Some(Pixel::new(256.0, 0.0))]);

        assert_eq!(dataset.clicks, vec![0, 1]);
        // The single idle frame lands on the target itself.
        assert_eq!(dataset.positions, vec![(320, 55), (320, 55)]);
    }

    #[test]
    fn gaps_are_filled_linearly() {
        let dataset = build(&[
            Some(Pixel::new(0.0, 0.0)),
            None,
            None,
            None,
            Some(Pixel::new(30.0, 0.0)),
        ]);

        assert_eq!(dataset.clicks, vec![1, 0, 0, 0, 1]);
        let xs: Vec<i32> = dataset.positions.iter().map(|&(x, _)| x - 64).collect();
        assert_eq!(xs, vec![0, 10, 20, 30, 30]);
    }

    #[test]
    fn trailing_gap_holds_the_last_position() {
        let dataset = build(&[Some(Pixel::new(5.0, 5.0)), None, None]);

        assert_eq!(dataset.clicks, vec![1, 0, 0]);
        assert_eq!(dataset.positions, vec![(69, 60); 3]);
    }

    #[test]
    fn every_frame_gets_a_position() {
        let labels: Vec<Option<Pixel>> = (0..50)
            .map(|i| (i % 7 == 3).then(|| Pixel::new(i as f64, i as f64)))
            .collect();
        let dataset = build(&labels);

        assert_eq!(dataset.positions.len(), labels.len());
        assert_eq!(dataset.clicks.len(), labels.len());
    }

    #[test]
    fn serializes_as_two_arrays() {
        let dataset = build(&[Some(Pixel::new(0.0, 0.0)), None]);
        let json = dataset.to_json().unwrap();

        assert_eq!(json, r#"{"positions":[[64,55],[64,55]],"clicks":[1,0]}"#);
        let back: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dataset);
    }

    #[test]
    fn writes_json_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");

        build(&[Some(Pixel::new(1.0, 1.0))]).write_json(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"clicks\":[1]"));
    }
}
