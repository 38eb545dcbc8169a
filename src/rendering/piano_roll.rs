use eframe::egui::{self, Color32, Painter, Pos2, Stroke};
use parking_lot::RwLockReadGuard;

use crate::viewer::culling::VisibleSet;
use crate::viewer::scene::TimeRuler;

// Piano roll background
const BLACK_KEY_SHADE: Color32 = Color32::from_rgb(5, 5, 5);
const WHITE_KEY_SHADE: Color32 = Color32::from_rgb(50, 50, 50);
const ROW_LINE: Color32 = Color32::from_rgb(25, 25, 25);
const TICK_LINE: Color32 = Color32::from_rgb(25, 25, 25);
const TICK_ACCENT: Color32 = Color32::from_rgb(70, 70, 80);

pub type NoteColor = [u8; 3];

/// Axis-aligned rectangle in viewport pixels, origin at the top left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoteRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl NoteRect {
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn shifted(&self, dx: f32) -> Self {
        Self { x: self.x + dx, ..*self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderNote(pub NoteRect, pub NoteColor);

/// One horizontal key lane of the background grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridRow {
    pub rect: NoteRect,
    pub key: u8,
    pub black_key: bool,
}

/// A vertical time marker, before the viewport offset is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeTick {
    pub x: f32,
    pub accent: bool,
}

/// Everything needed to draw one frame.
pub struct RenderDescriptor<'a> {
    pub width: f32,
    pub height: f32,
    pub grid: &'a [GridRow],
    pub ruler: TimeRuler,
    pub visible: RwLockReadGuard<'a, VisibleSet>,
}

impl RenderDescriptor<'_> {
    pub fn offset(&self) -> f32 {
        self.visible.offset
    }

    pub fn notes(&self) -> &[RenderNote] {
        &self.visible.notes
    }
}

pub trait Renderer {
    fn draw(&mut self, painter: &Painter, origin: Pos2, frame: &RenderDescriptor<'_>);
}

#[derive(Default)]
pub struct PianoRollRenderer;

impl PianoRollRenderer {
    pub fn new() -> Self {
        Self
    }

    fn draw_piano_roll(&self, painter: &Painter, origin: Pos2, frame: &RenderDescriptor<'_>) {
        for row in frame.grid {
            let shade = if row.black_key { BLACK_KEY_SHADE } else { WHITE_KEY_SHADE };
            painter.rect_filled(to_egui(origin, &row.rect), 0.0, shade);
            let y = origin.y + row.rect.y;
            painter.line_segment(
                [Pos2::new(origin.x, y), Pos2::new(origin.x + frame.width, y)],
                Stroke::new(1.0, ROW_LINE),
            );
        }
    }

    fn draw_time_ticks(&self, painter: &Painter, origin: Pos2, frame: &RenderDescriptor<'_>) {
        let offset = frame.offset();
        for tick in frame.ruler.visible(offset, frame.width) {
            let x = origin.x + tick.x + offset;
            let color = if tick.accent { TICK_ACCENT } else { TICK_LINE };
            painter.line_segment(
                [Pos2::new(x, origin.y), Pos2::new(x, origin.y + frame.height)],
                Stroke::new(1.0, color),
            );
        }
    }

    fn draw_notes(&self, painter: &Painter, origin: Pos2, frame: &RenderDescriptor<'_>) {
        for RenderNote(rect, [r, g, b]) in frame.notes() {
            painter.rect_filled(to_egui(origin, rect), 0.0, Color32::from_rgb(*r, *g, *b));
        }
    }
}

impl Renderer for PianoRollRenderer {
    fn draw(&mut self, painter: &Painter, origin: Pos2, frame: &RenderDescriptor<'_>) {
        painter.rect_filled(
            egui::Rect::from_min_size(origin, egui::vec2(frame.width, frame.height)),
            0.0,
            Color32::BLACK,
        );
        self.draw_piano_roll(painter, origin, frame);
        self.draw_time_ticks(painter, origin, frame);
        self.draw_notes(painter, origin, frame);
    }
}

fn to_egui(origin: Pos2, rect: &NoteRect) -> egui::Rect {
    egui::Rect::from_min_size(origin + egui::vec2(rect.x, rect.y), egui::vec2(rect.w, rect.h))
}
