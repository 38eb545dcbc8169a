//! Piano-roll viewer for Standard MIDI Files.
//!
//! Notes are rebuilt from raw per-track events ([`midi`]), laid out once as
//! static geometry, then scrolled with inertial physics and culled to the
//! viewport by a background worker ([`viewer`]). [`rendering`] holds the frame
//! description and an egui painter for it.

pub mod error;
pub mod midi;
pub mod rendering;
pub mod viewer;

pub use error::{Result, ViewerError};
pub use midi::events::{MidiSequence, RawTrackEvent};
pub use midi::notes::{NoteSpan, Parallelism};
pub use midi::tempo_map::TempoMap;
pub use viewer::navigation::ViewportInput;
pub use viewer::settings::ViewerSettings;
pub use viewer::worker::ViewerHandle;
pub use viewer::MidiViewer;
