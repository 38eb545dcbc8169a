use std::path::Path;

use midly::num::u4;
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

use crate::error::{Result, ViewerError};
use crate::midi::events::{MidiSequence, RawTrackEvent, META_END_OF_TRACK, NOTE_OFF, NOTE_ON};

impl MidiSequence {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        log::info!("Loaded {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let smf = Smf::parse(bytes).map_err(|err| ViewerError::MalformedInput(err.to_string()))?;
        Self::from_smf(&smf)
    }

    /// Flattens a parsed file into raw status/data events. Only metrical time
    /// division is supported.
    pub fn from_smf(smf: &Smf) -> Result<Self> {
        let ppq = match smf.header.timing {
            Timing::Metrical(ppq) => ppq.as_int(),
            Timing::Timecode(fps, sub) => {
                return Err(ViewerError::MalformedInput(format!(
                    "timecode division ({:?}, {} subframes) is not supported",
                    fps,
                    sub
                )));
            }
        };

        let tracks: Vec<Vec<RawTrackEvent>> = smf
            .tracks
            .iter()
            .map(|track| track.iter().map(convert_event).collect())
            .collect();

        let sequence = MidiSequence::new(tracks, ppq);
        log::debug!(
            "Parsed {} tracks, {} events, {} ticks per quarter",
            sequence.tracks.len(),
            sequence.event_count(),
            ppq
        );
        Ok(sequence)
    }
}

fn convert_event(event: &TrackEvent) -> RawTrackEvent {
    let delta = event.delta.as_int();
    match event.kind {
        TrackEventKind::Midi { channel, message } => {
            let (status, data) = channel_message(channel, message);
            RawTrackEvent::Channel { status, data, delta }
        }
        TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => RawTrackEvent::tempo(tempo.as_int(), delta),
        TrackEventKind::Meta(MetaMessage::EndOfTrack) => RawTrackEvent::Meta {
            status: META_END_OF_TRACK,
            data: Vec::new(),
            delta,
        },
        TrackEventKind::Meta(MetaMessage::TimeSignature(num, den, clocks, notes)) => RawTrackEvent::Meta {
            status: 0x58,
            data: vec![num, den, clocks, notes],
            delta,
        },
        TrackEventKind::Meta(MetaMessage::KeySignature(sharps, minor)) => RawTrackEvent::Meta {
            status: 0x59,
            data: vec![sharps as u8, minor as u8],
            delta,
        },
        TrackEventKind::Meta(_) | TrackEventKind::SysEx(_) | TrackEventKind::Escape(_) => {
            RawTrackEvent::Opaque { delta }
        }
    }
}

fn channel_message(channel: u4, message: MidiMessage) -> (u8, Vec<u8>) {
    let ch = channel.as_int();
    match message {
        MidiMessage::NoteOff { key, vel } => (NOTE_OFF | ch, vec![key.as_int(), vel.as_int()]),
        MidiMessage::NoteOn { key, vel } => (NOTE_ON | ch, vec![key.as_int(), vel.as_int()]),
        MidiMessage::Aftertouch { key, vel } => (0xA0 | ch, vec![key.as_int(), vel.as_int()]),
        MidiMessage::Controller { controller, value } => {
            (0xB0 | ch, vec![controller.as_int(), value.as_int()])
        }
        MidiMessage::ProgramChange { program } => (0xC0 | ch, vec![program.as_int()]),
        MidiMessage::ChannelAftertouch { vel } => (0xD0 | ch, vec![vel.as_int()]),
        MidiMessage::PitchBend { bend } => {
            let raw = bend.0.as_int();
            (0xE0 | ch, vec![(raw & 0x7F) as u8, (raw >> 7) as u8])
        }
    }
}
