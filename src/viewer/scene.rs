use crate::error::{Result, ViewerError};
use crate::midi::notes::NoteSpan;
use crate::rendering::heatmap::velocity_color;
use crate::rendering::piano_roll::{GridRow, NoteRect, RenderNote, TimeTick};

use super::settings::ViewerSettings;

const BLACK_KEYS: [u8; 5] = [1, 3, 6, 8, 10];

/// Linear map of `value` from `in_min..in_max` onto `out_min..out_max`, without
/// clamping. A degenerate input range maps everything to `out_min`.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if (in_min - in_max).abs() < f32::EPSILON {
        return out_min;
    }
    (value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub lowest_pitch: u8,
    pub highest_pitch: u8,
    pub total_duration_ms: f64,
    pub page_window_ms: f64,
}

impl SceneBounds {
    pub fn compute(notes: &[NoteSpan], settings: &ViewerSettings) -> Result<Self> {
        let first = notes.first().ok_or(ViewerError::EmptyResult)?;

        let mut bounds = Self {
            lowest_pitch: first.pitch,
            highest_pitch: first.pitch,
            total_duration_ms: first.end_ms,
            page_window_ms: settings.page_window_ms(),
        };
        for note in &notes[1..] {
            bounds.lowest_pitch = bounds.lowest_pitch.min(note.pitch);
            bounds.highest_pitch = bounds.highest_pitch.max(note.pitch);
            bounds.total_duration_ms = bounds.total_duration_ms.max(note.end_ms);
        }
        Ok(bounds)
    }

    pub fn inclusive_pitch_range(&self) -> u32 {
        (self.highest_pitch - self.lowest_pitch) as u32 + 1
    }

    pub fn track_pages(&self) -> f64 {
        self.total_duration_ms / self.page_window_ms
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub bounds: SceneBounds,
    pub row_height: f32,
    pub templates: Vec<RenderNote>,
    pub grid: Vec<GridRow>,
    pub ruler: TimeRuler,
}

impl Scene {
    pub fn build(notes: &[NoteSpan], settings: &ViewerSettings) -> Result<Self> {
        let bounds = SceneBounds::compute(notes, settings)?;
        let row_height = settings.height_f() / bounds.inclusive_pitch_range() as f32;

        let templates = notes
            .iter()
            .map(|note| note_template(note, &bounds, row_height, settings))
            .collect();

        Ok(Self {
            grid: grid_rows(&bounds, row_height, settings),
            ruler: TimeRuler::new(&bounds, settings),
            bounds,
            row_height,
            templates,
        })
    }
}

/// Rectangle and color of a note in track space, before scrolling.
pub fn note_template(note: &NoteSpan, bounds: &SceneBounds, row_height: f32, settings: &ViewerSettings) -> RenderNote {
    let page = bounds.page_window_ms as f32;
    let width = settings.width_f();
    let height = settings.height_f();
    let padding = settings.padding;

    let rect = NoteRect {
        x: map_range(note.start_ms as f32, 0.0, page, 0.0, width) + padding,
        y: map_range(
            note.pitch as f32,
            bounds.lowest_pitch as f32,
            bounds.highest_pitch as f32,
            height - row_height,
            0.0,
        ) + padding,
        w: map_range(note.duration_ms() as f32, 0.0, page, 0.0, width).clamp(0.0, width) - padding * 2.0,
        h: row_height - padding * 2.0,
    };
    RenderNote(rect, velocity_color(note.velocity))
}

pub fn grid_rows(bounds: &SceneBounds, row_height: f32, settings: &ViewerSettings) -> Vec<GridRow> {
    let range = bounds.inclusive_pitch_range();
    let height = settings.height_f();
    (0..range)
        .map(|i| {
            let key = bounds.lowest_pitch + i as u8;
            GridRow {
                rect: NoteRect {
                    x: 0.0,
                    y: map_range(i as f32, 0.0, range as f32, height - row_height, -row_height),
                    w: settings.width_f(),
                    h: row_height,
                },
                key,
                black_key: BLACK_KEYS.contains(&(key % 12)),
            }
        })
        .collect()
}

/// Time markers every `tick_interval_ms`, covering the piece or at least one
/// full page. Markers are produced on demand for the visible window only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRuler {
    spacing: f64,
    last: u64,
    accent_every: u64,
}

impl TimeRuler {
    pub fn new(bounds: &SceneBounds, settings: &ViewerSettings) -> Self {
        let interval = settings.tick_interval_ms as f64;
        let last = (bounds.total_duration_ms / interval)
            .floor()
            .max((bounds.page_window_ms / interval).floor()) as u64;

        Self {
            spacing: interval * settings.width as f64 / bounds.page_window_ms,
            last,
            accent_every: settings.accent_every as u64,
        }
    }

    pub fn len(&self) -> u64 {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.last == 0
    }

    /// Marker `index` in track space, counting from 1.
    pub fn tick(&self, index: u64) -> TimeTick {
        TimeTick {
            x: (index as f64 * self.spacing) as f32,
            accent: index % self.accent_every == 0,
        }
    }

    /// Markers whose scrolled position `x + offset` lies within `0..=width`.
    pub fn visible(&self, offset: f32, width: f32) -> impl Iterator<Item = TimeTick> + '_ {
        let offset = offset as f64;
        let first = (-offset / self.spacing).ceil().max(1.0) as u64;
        let end = ((width as f64 - offset) / self.spacing).floor().max(0.0) as u64;
        (first..=end.min(self.last)).map(|index| self.tick(index))
    }
}
