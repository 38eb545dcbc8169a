//! Scrolling and culling under adversarial input and concurrent readers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use notescope::rendering::piano_roll::{NoteRect, RenderNote};
use notescope::viewer::culling::VisibilityCuller;
use notescope::viewer::navigation::ViewportPhysics;
use notescope::viewer::scene::SceneBounds;
use notescope::{MidiSequence, MidiViewer, RawTrackEvent as Ev, ViewerSettings, ViewportInput};

fn long_piece(notes: u8) -> MidiSequence {
    let mut track = Vec::new();
    for i in 0..notes {
        let key = 36 + i % 48;
        track.push(Ev::note_on(0, key, 1 + i % 127, 0));
        track.push(Ev::note_off(0, key, 0, 960));
    }
    MidiSequence::new(vec![track], 480)
}

#[test]
fn test_offset_stays_in_bounds_under_random_input() {
    let mut rng = StdRng::seed_from_u64(42);
    for pages in [0.2, 1.0, 3.5, 40.0, 900.0] {
        let bounds = SceneBounds {
            lowest_pitch: 0,
            highest_pitch: 127,
            total_duration_ms: pages * 7300.0,
            page_window_ms: 7300.0,
        };
        let mut physics = ViewportPhysics::new(&bounds, 730.0);
        for _ in 0..20_000 {
            match rng.gen_range(0..6) {
                0 => physics.apply(ViewportInput::Press),
                1 => physics.apply(ViewportInput::Wheel(rng.gen_range(-1.0e4..1.0e4))),
                _ => physics.apply(ViewportInput::Wheel(if rng.gen_bool(0.5) { 1.0 } else { -1.0 })),
            }
            let offset = physics.step();
            let state = physics.state();
            assert!(offset.is_finite());
            assert!(state.min_offset <= offset && offset <= state.max_offset, "{:?}", state);
        }
    }
}

#[test]
fn test_rapid_direction_reversals() {
    let bounds = SceneBounds {
        lowest_pitch: 60,
        highest_pitch: 60,
        total_duration_ms: 50_000.0,
        page_window_ms: 1000.0,
    };
    let mut physics = ViewportPhysics::new(&bounds, 100.0);
    for i in 0..10_000 {
        let impulse = if i % 2 == 0 { 3.0e5 } else { -3.0e5 };
        physics.wheel(impulse);
        physics.step();
        let state = physics.state();
        assert!(state.min_offset <= state.offset && state.offset <= state.max_offset);
        // each reversal discards the previous momentum
        assert!(state.velocity.abs() <= 3.0e5);
    }
}

#[test]
fn test_single_note_piece_never_scrolls() {
    let sequence = MidiSequence::new(vec![vec![Ev::note_on(0, 60, 100, 0), Ev::note_off(0, 60, 0, 480)]], 480);
    let mut viewer = MidiViewer::new(&sequence, ViewerSettings::default()).unwrap();
    let state = viewer.viewport();
    assert_eq!(state.min_offset, 0.0);
    assert_eq!(state.max_offset, 0.0);

    viewer.apply(ViewportInput::Wheel(-1000.0));
    for _ in 0..100 {
        assert_eq!(viewer.update(), 0.0);
    }
    assert_eq!(viewer.descriptor().notes().len(), 1);
}

fn template(x: f32) -> RenderNote {
    RenderNote(NoteRect { x, y: 0.0, w: 5.0, h: 1.0 }, [0, 255, 0])
}

#[test]
fn test_readers_never_see_a_torn_snapshot() {
    // 3 notes visible at offset 0, 7 at offset -1000
    let mut templates: Vec<RenderNote> = (0..3).map(|i| template(10.0 + i as f32 * 20.0)).collect();
    templates.extend((0..7).map(|i| template(1010.0 + i as f32 * 10.0)));
    let culler = VisibilityCuller::new(templates, 100.0);
    let buffer = culler.buffer();
    culler.update(0.0);

    let done = AtomicBool::new(false);
    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let mut samples = 0usize;
                while !done.load(Ordering::Acquire) || samples == 0 {
                    let set = buffer.read();
                    let expected = if set.offset == 0.0 { 3 } else { 7 };
                    assert!(set.offset == 0.0 || set.offset == -1000.0);
                    assert_eq!(set.notes.len(), expected);
                    samples += 1;
                }
            });
        }

        for i in 0..20_000 {
            culler.update(if i % 2 == 0 { -1000.0 } else { 0.0 });
        }
        done.store(true, Ordering::Release);
    });
}

#[test]
fn test_background_worker_scrolls_and_shuts_down() {
    let mut settings = ViewerSettings::new(200, 100).unwrap();
    settings.update_interval = Duration::from_millis(1);
    let viewer = MidiViewer::new(&long_piece(120), settings).unwrap();
    let grid_rows = viewer.grid_rows().len();
    let mut handle = viewer.start().unwrap();
    assert!(handle.is_running());

    for _ in 0..20 {
        handle.send(ViewportInput::Wheel(-50.0));
    }

    let mut scrolled = false;
    for _ in 0..500 {
        let frame = handle.descriptor();
        assert_eq!(frame.grid.len(), grid_rows);
        for RenderNote(rect, _) in frame.notes() {
            assert!((rect.x > 0.0 && rect.x < 200.0) || (rect.right() > 0.0 && rect.right() < 200.0));
        }
        if frame.offset() < 0.0 {
            scrolled = true;
            break;
        }
        drop(frame);
        thread::sleep(Duration::from_millis(2));
    }
    assert!(scrolled);

    handle.send(ViewportInput::Press);
    handle.shutdown();
    assert!(!handle.is_running());
}
