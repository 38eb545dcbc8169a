pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const META_TEMPO: u8 = 0x51;
pub const META_END_OF_TRACK: u8 = 0x2F;

/// Tempo assumed until the first tempo event, in microseconds per quarter (120 BPM).
pub const DEFAULT_TEMPO: u32 = 500_000;

/// A single event of a parsed track. `delta` is the number of ticks since the
/// previous event on the same track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTrackEvent {
    Channel { status: u8, data: Vec<u8>, delta: u32 },
    Meta { status: u8, data: Vec<u8>, delta: u32 },
    Opaque { delta: u32 },
}

impl RawTrackEvent {
    pub fn delta(&self) -> u32 {
        match self {
            RawTrackEvent::Channel { delta, .. }
            | RawTrackEvent::Meta { delta, .. }
            | RawTrackEvent::Opaque { delta } => *delta,
        }
    }

    pub fn note_on(channel: u8, key: u8, velocity: u8, delta: u32) -> Self {
        RawTrackEvent::Channel {
            status: NOTE_ON | (channel & 0x0F),
            data: vec![key, velocity],
            delta,
        }
    }

    pub fn note_off(channel: u8, key: u8, velocity: u8, delta: u32) -> Self {
        RawTrackEvent::Channel {
            status: NOTE_OFF | (channel & 0x0F),
            data: vec![key, velocity],
            delta,
        }
    }

    /// A set-tempo meta event carrying `us_per_quarter` as a 24-bit big-endian payload.
    pub fn tempo(us_per_quarter: u32, delta: u32) -> Self {
        let [_, hi, mid, lo] = us_per_quarter.to_be_bytes();
        RawTrackEvent::Meta {
            status: META_TEMPO,
            data: vec![hi, mid, lo],
            delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEventType {
    NoteOff,
    NoteOn,
}

impl NoteEventType {
    /// Classifies a channel message by its status high nibble. A note-on with
    /// velocity 0 counts as a note-off.
    pub fn classify(status: u8, velocity: u8) -> Option<Self> {
        match status & 0xF0 {
            NOTE_ON if velocity > 0 => Some(NoteEventType::NoteOn),
            NOTE_ON | NOTE_OFF => Some(NoteEventType::NoteOff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEvent {
    pub tick: u64,
    pub time_ms: f64,
    pub tempo: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MidiSequence {
    pub tracks: Vec<Vec<RawTrackEvent>>,
    pub ticks_per_quarter: u16,
}

impl MidiSequence {
    pub fn new(tracks: Vec<Vec<RawTrackEvent>>, ticks_per_quarter: u16) -> Self {
        Self { tracks, ticks_per_quarter }
    }

    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(Vec::len).sum()
    }
}
