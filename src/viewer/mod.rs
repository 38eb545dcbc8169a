pub mod culling;
pub mod navigation;
pub mod scene;
pub mod settings;
pub mod worker;

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::midi::events::MidiSequence;
use crate::midi::notes::{self, NoteSpan, Parallelism};
use crate::midi::tempo_map::TempoMap;
use crate::rendering::piano_roll::{GridRow, RenderDescriptor};

use culling::{DoubleBuffer, VisibilityCuller, VisibleSet};
use navigation::{ViewportInput, ViewportPhysics, ViewportState};
use scene::{Scene, SceneBounds, TimeRuler};
use settings::ViewerSettings;
use worker::{UpdateLoop, ViewerHandle};

/// A scrollable piano roll over the notes of one MIDI sequence.
///
/// Construction runs the whole pipeline: tempo map, note reconstruction,
/// bounds and static geometry. Any failure there is returned and no viewer is
/// created. Afterwards the viewer can be ticked in place with [`update`] or
/// moved onto a background worker with [`start`].
///
/// [`update`]: MidiViewer::update
/// [`start`]: MidiViewer::start
pub struct MidiViewer {
    settings: ViewerSettings,
    notes: Vec<NoteSpan>,
    bounds: SceneBounds,
    grid: Vec<GridRow>,
    ruler: TimeRuler,
    physics: ViewportPhysics,
    culler: VisibilityCuller,
    buffer: Arc<DoubleBuffer<VisibleSet>>,
}

impl MidiViewer {
    pub fn open(path: impl AsRef<Path>, settings: ViewerSettings) -> Result<Self> {
        let sequence = MidiSequence::from_file(path)?;
        Self::new(&sequence, settings)
    }

    pub fn new(sequence: &MidiSequence, settings: ViewerSettings) -> Result<Self> {
        Self::with_parallelism(sequence, settings, Parallelism::PerTrack)
    }

    pub fn with_parallelism(
        sequence: &MidiSequence,
        settings: ViewerSettings,
        parallelism: Parallelism,
    ) -> Result<Self> {
        settings.validate()?;
        let tempo_map = TempoMap::build(sequence)?;
        let notes = notes::reconstruct(sequence, &tempo_map, parallelism)?;
        log::info!(
            "Reconstructed {} notes from {} tracks ({} tempo changes)",
            notes.len(),
            sequence.tracks.len(),
            tempo_map.events().len()
        );
        Self::from_notes(notes, settings)
    }

    pub fn from_notes(notes: Vec<NoteSpan>, settings: ViewerSettings) -> Result<Self> {
        settings.validate()?;
        let Scene { bounds, templates, grid, ruler, .. } = Scene::build(&notes, &settings)?;
        log::debug!(
            "Scene bounds: keys {}..={}, {:.1} ms over {:.2} pages",
            bounds.lowest_pitch,
            bounds.highest_pitch,
            bounds.total_duration_ms,
            bounds.track_pages()
        );

        let physics = ViewportPhysics::new(&bounds, settings.width_f());
        let culler = VisibilityCuller::new(templates, settings.width_f());
        culler.update(physics.offset());
        let buffer = culler.buffer();

        Ok(Self {
            settings,
            notes,
            bounds,
            grid,
            ruler,
            physics,
            culler,
            buffer,
        })
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn notes(&self) -> &[NoteSpan] {
        &self.notes
    }

    pub fn bounds(&self) -> &SceneBounds {
        &self.bounds
    }

    pub fn grid_rows(&self) -> &[GridRow] {
        &self.grid
    }

    pub fn time_ruler(&self) -> TimeRuler {
        self.ruler
    }

    pub fn viewport(&self) -> ViewportState {
        self.physics.state()
    }

    pub fn buffer(&self) -> Arc<DoubleBuffer<VisibleSet>> {
        Arc::clone(&self.buffer)
    }

    pub fn apply(&mut self, input: ViewportInput) {
        self.physics.apply(input);
    }

    pub fn update(&mut self) -> f32 {
        let offset = self.physics.step();
        self.culler.update(offset);
        offset
    }

    pub fn descriptor(&self) -> RenderDescriptor<'_> {
        RenderDescriptor {
            width: self.settings.width_f(),
            height: self.settings.height_f(),
            grid: &self.grid,
            ruler: self.ruler,
            visible: self.buffer.read(),
        }
    }

    /// Moves physics and culling onto a background worker ticking at the
    /// configured update interval.
    pub fn start(self) -> Result<ViewerHandle> {
        let size = (self.settings.width_f(), self.settings.height_f());
        let update = UpdateLoop {
            physics: self.physics,
            culler: self.culler,
            interval: self.settings.update_interval,
        };
        Ok(ViewerHandle::spawn(update, size, self.grid, self.ruler)?)
    }
}
