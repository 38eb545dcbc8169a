use rayon::prelude::*;

use crate::error::{Result, ViewerError};

use super::events::{MidiSequence, RawTrackEvent, TempoEvent, DEFAULT_TEMPO, META_TEMPO};

/// Tick-ordered tempo changes of a whole sequence.
///
/// Every sample also stores the real time elapsed at its tick, so converting a
/// tick to milliseconds is one binary search plus a linear step inside the
/// active tempo segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    ppq: u16,
    tempo_events: Vec<TempoEvent>,
}

impl TempoMap {
    pub fn build(sequence: &MidiSequence) -> Result<Self> {
        if sequence.ticks_per_quarter == 0 {
            return Err(ViewerError::MalformedInput(
                "time division of 0 ticks per quarter".to_string(),
            ));
        }

        let per_track = sequence
            .tracks
            .par_iter()
            .enumerate()
            .map(|(track, events)| scan_track(track, events))
            .collect::<Result<Vec<_>>>()?;

        let samples = per_track.into_iter().flatten().collect();
        Ok(Self::from_samples(sequence.ticks_per_quarter, samples))
    }

    /// Builds a map from raw `(tick, us_per_quarter)` samples. Samples sharing a
    /// tick keep their order, so the last one wins on lookup.
    pub fn from_samples(ppq: u16, mut samples: Vec<(u64, u32)>) -> Self {
        samples.sort_by_key(|&(tick, _)| tick);

        let ppq = ppq.max(1);
        let mut tempo_events = Vec::with_capacity(samples.len());
        let mut last = TempoEvent { tick: 0, time_ms: 0.0, tempo: DEFAULT_TEMPO };
        for (tick, tempo) in samples {
            let time_ms = last.time_ms + ticks_to_ms(tick - last.tick, ppq, last.tempo);
            last = TempoEvent { tick, time_ms, tempo };
            tempo_events.push(last);
        }

        Self { ppq, tempo_events }
    }

    pub fn ppq(&self) -> u16 {
        self.ppq
    }

    pub fn events(&self) -> &[TempoEvent] {
        &self.tempo_events
    }

    pub fn is_empty(&self) -> bool {
        self.tempo_events.is_empty()
    }

    pub fn lookup(&self, tick: u64) -> u32 {
        self.active(tick).map_or(DEFAULT_TEMPO, |ev| ev.tempo)
    }

    /// Real time of `tick`, integrating over every tempo change before it.
    pub fn tick_to_ms(&self, tick: u64) -> f64 {
        match self.active(tick) {
            Some(ev) => ev.time_ms + ticks_to_ms(tick - ev.tick, self.ppq, ev.tempo),
            None => ticks_to_ms(tick, self.ppq, DEFAULT_TEMPO),
        }
    }

    /// Start and end time of a note. The tempo at `start` is used for the whole
    /// span, even if the tempo changes before `end`.
    pub fn span_to_ms(&self, start: u64, end: u64) -> (f64, f64) {
        let start_ms = self.tick_to_ms(start);
        let length = ticks_to_ms(end.saturating_sub(start), self.ppq, self.lookup(start));
        (start_ms, start_ms + length)
    }

    fn active(&self, tick: u64) -> Option<&TempoEvent> {
        let idx = self.tempo_events.partition_point(|ev| ev.tick <= tick);
        idx.checked_sub(1).map(|i| &self.tempo_events[i])
    }
}

fn ticks_to_ms(ticks: u64, ppq: u16, us_per_qn: u32) -> f64 {
    ticks as f64 / ppq as f64 * us_per_qn as f64 / 1000.0
}

fn scan_track(track: usize, events: &[RawTrackEvent]) -> Result<Vec<(u64, u32)>> {
    let mut tick = 0u64;
    let mut samples = Vec::new();
    for event in events {
        tick += event.delta() as u64;
        if let RawTrackEvent::Meta { status: META_TEMPO, data, .. } = event {
            let [hi, mid, lo] = match data.as_slice() {
                [hi, mid, lo, ..] => [*hi, *mid, *lo],
                _ => {
                    return Err(ViewerError::MalformedInput(format!(
                        "tempo event with {} byte payload on track {} at tick {}",
                        data.len(),
                        track,
                        tick
                    )));
                }
            };
            samples.push((tick, u32::from_be_bytes([0, hi, mid, lo])));
        }
    }
    Ok(samples)
}
