use std::io::Write;
use std::path::PathBuf;

use osu_trace::{
    Beatmap, ConvertorConfig, DatasetBuilder, FrameClock, HitObject, Pixel, SyncConfig, Viewport,
};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample.osu")
}

#[test]
fn fixture_parses_into_every_object_kind() {
    let beatmap = Beatmap::open(fixture()).unwrap();

    assert_eq!(beatmap.format_version, Some(14));
    assert_eq!(beatmap.difficulty.slider_multiplier, 1.4);
    assert_eq!(beatmap.hit_objects.len(), 4);
    assert!(matches!(beatmap.hit_objects[0], HitObject::Tap(_)));
    assert!(matches!(beatmap.hit_objects[1], HitObject::Slide(_)));
    assert!(matches!(beatmap.hit_objects[2], HitObject::Slide(_)));
    assert!(matches!(beatmap.hit_objects[3], HitObject::Spin(_)));
    assert_eq!(beatmap.end_time(), Some(3000));
}

#[test]
fn trajectory_is_time_ordered_and_on_the_playfield() {
    let beatmap = Beatmap::open(fixture()).unwrap();
    let samples: Vec<_> = beatmap.samples().collect();

    assert_eq!(samples.first().map(|s| s.time), Some(1000));
    assert_eq!(samples.last().map(|s| s.time), Some(3000));
    assert!(samples.windows(2).all(|w| w[0].time <= w[1].time));
    assert!(samples.iter().all(|s| {
        (0.0..=512.0).contains(&s.position.x) && (0.0..=384.0).contains(&s.position.y)
    }));
}

#[test]
fn frames_cover_the_whole_map() {
    let beatmap = Beatmap::open(fixture()).unwrap();
    let labels: Vec<Option<Pixel>> = beatmap
        .label_frames(FrameClock::new(), SyncConfig::default())
        .map(|frame| frame.position)
        .collect();

    // 3000ms at 60fps.
    assert_eq!(labels.len(), 180);

    // Idle until the tap at 1000ms lands on frame 59.
    assert!(labels[..59].iter().all(Option::is_none));
    assert_eq!(labels[59], Some(Pixel::new(100.0, 100.0)));

    // Idle again until the first slide, which is then followed every frame.
    assert!(labels[60..89].iter().all(Option::is_none));
    assert!(labels[89..120].iter().all(Option::is_some));
}

#[test]
fn delay_adds_leading_frames() {
    let beatmap = Beatmap::open(fixture()).unwrap();
    let frames = beatmap
        .label_frames(FrameClock::new(), SyncConfig::with_delay(50))
        .count();

    assert_eq!(frames, 183);
}

#[test]
fn frame_limit_truncates_labeling() {
    let beatmap = Beatmap::open(fixture()).unwrap();
    let frames = beatmap
        .label_frames(FrameClock::with_limit(100), SyncConfig::default())
        .count();

    assert_eq!(frames, 100);
}

#[test]
fn job_file_drives_the_dataset() {
    let mut job = tempfile::NamedTempFile::new().unwrap();
    writeln!(job, "osu={}", fixture().display()).unwrap();
    writeln!(job, "delay=0").unwrap();
    writeln!(job, "size=640,480").unwrap();

    let config = ConvertorConfig::load(job.path()).unwrap();
    assert_eq!(config.viewport(), Viewport::new(640, 480));

    let beatmap = Beatmap::open(&config.beatmap).unwrap();
    let mut builder = DatasetBuilder::new(config.viewport());
    builder.extend(
        beatmap
            .label_frames(FrameClock::new(), config.sync_config())
            .map(|frame| frame.position),
    );
    let dataset = builder.finish();

    assert_eq!(dataset.len(), 180);
    assert_eq!(dataset.positions.len(), 180);
    // The tap frame maps (100, 100) through a 1:1 scale at (64, 55).
    assert_eq!(dataset.clicks[59], 1);
    assert_eq!(dataset.positions[59], (164, 155));
    assert!(dataset.clicks[..59].iter().all(|&click| click == 0));

    let json = dataset.to_json().unwrap();
    assert!(json.starts_with("{\"positions\":[["));
}
