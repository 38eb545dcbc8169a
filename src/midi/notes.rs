use rayon::prelude::*;

use crate::error::{Result, ViewerError};

use super::events::{MidiSequence, NoteEventType, RawTrackEvent};
use super::tempo_map::TempoMap;

const KEY_COUNT: usize = 128;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Note {
    pub start: u64, // in ticks
    pub end: u64,   // in ticks
    pub key: u8,
    pub velocity: u8,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub struct NoteSpan {
    pub pitch: u8,
    pub velocity: u8,
    pub start_ms: f64,
    pub end_ms: f64,
}

impl NoteSpan {
    pub fn duration_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parallelism {
    #[default]
    PerTrack,
    Sequential,
}

#[derive(Clone, Copy)]
struct OpenNote {
    tick: u64,
    velocity: u8,
}

/// Per-track matching state: the running tick and the pending note-on per key.
struct TrackState {
    track: usize,
    tick: u64,
    open: [Option<OpenNote>; KEY_COUNT],
    notes: Vec<Note>,
}

impl TrackState {
    fn new(track: usize) -> Self {
        Self {
            track,
            tick: 0,
            open: [None; KEY_COUNT],
            notes: Vec::new(),
        }
    }

    fn push_event(&mut self, event: &RawTrackEvent) -> Result<()> {
        self.tick += event.delta() as u64;

        let RawTrackEvent::Channel { status, data, .. } = event else {
            return Ok(());
        };
        if !matches!(status & 0xF0, 0x80 | 0x90) {
            return Ok(());
        }

        let (key, velocity) = match data.as_slice() {
            [key, velocity, ..] if *key < 0x80 && *velocity < 0x80 => (*key, *velocity),
            _ => return Err(self.malformed(format!("note message {:#04x} with data {:02x?}", status, data))),
        };

        match NoteEventType::classify(*status, velocity) {
            Some(NoteEventType::NoteOn) => {
                // a retrigger before the note-off replaces the pending note-on
                self.open[key as usize] = Some(OpenNote { tick: self.tick, velocity });
            }
            Some(NoteEventType::NoteOff) => {
                let Some(open) = self.open[key as usize].take() else {
                    return Err(self.malformed(format!("note-off for key {} without a note-on", key)));
                };
                self.notes.push(Note {
                    start: open.tick,
                    end: self.tick,
                    key,
                    velocity: open.velocity,
                });
            }
            None => {}
        }
        Ok(())
    }

    fn malformed(&self, what: String) -> ViewerError {
        ViewerError::MalformedInput(format!("{} on track {} at tick {}", what, self.track, self.tick))
    }
}

pub fn collect_track_notes(track: usize, events: &[RawTrackEvent]) -> Result<Vec<Note>> {
    let mut state = TrackState::new(track);
    for event in events {
        state.push_event(event)?;
    }
    Ok(state.notes)
}

/// Turns every track of `sequence` into note spans, concatenated in track order.
pub fn reconstruct(
    sequence: &MidiSequence,
    tempo_map: &TempoMap,
    parallelism: Parallelism,
) -> Result<Vec<NoteSpan>> {
    let per_track = match parallelism {
        Parallelism::PerTrack => sequence
            .tracks
            .par_iter()
            .enumerate()
            .map(|(track, events)| collect_track_notes(track, events))
            .collect::<Result<Vec<_>>>()?,
        Parallelism::Sequential => sequence
            .tracks
            .iter()
            .enumerate()
            .map(|(track, events)| collect_track_notes(track, events))
            .collect::<Result<Vec<_>>>()?,
    };

    let spans: Vec<NoteSpan> = per_track
        .into_iter()
        .flatten()
        .map(|note| {
            let (start_ms, end_ms) = tempo_map.span_to_ms(note.start, note.end);
            NoteSpan {
                pitch: note.key,
                velocity: note.velocity,
                start_ms,
                end_ms,
            }
        })
        .collect();

    log::debug!(
        "Reconstructed {} notes from {} tracks ({:?})",
        spans.len(),
        sequence.tracks.len(),
        parallelism
    );
    Ok(spans)
}
