use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::rendering::piano_roll::{GridRow, RenderDescriptor};

use super::culling::{DoubleBuffer, VisibilityCuller, VisibleSet};
use super::navigation::{ViewportInput, ViewportPhysics};
use super::scene::TimeRuler;

/// Foreground side of a running viewer.
///
/// Input goes to the update worker through a channel; frames are read from the
/// double buffer the worker publishes into. Dropping the handle stops and
/// joins the worker.
pub struct ViewerHandle {
    width: f32,
    height: f32,
    grid: Vec<GridRow>,
    ruler: TimeRuler,
    buffer: Arc<DoubleBuffer<VisibleSet>>,
    inputs: Sender<ViewportInput>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

pub(crate) struct UpdateLoop {
    pub physics: ViewportPhysics,
    pub culler: VisibilityCuller,
    pub interval: Duration,
}

impl UpdateLoop {
    fn run(mut self, inputs: Receiver<ViewportInput>, shutdown: Arc<AtomicBool>) {
        log::info!("Update worker started ({:?} interval)", self.interval);
        while !shutdown.load(Ordering::Acquire) {
            let start = Instant::now();

            for input in inputs.try_iter() {
                self.physics.apply(input);
            }
            let offset = self.physics.step();
            self.culler.update(offset);

            if let Some(remaining) = self.interval.checked_sub(start.elapsed()) {
                thread::sleep(remaining);
            }
        }
        log::info!("Update worker exiting");
    }
}

impl ViewerHandle {
    pub(crate) fn spawn(
        update: UpdateLoop,
        size: (f32, f32),
        grid: Vec<GridRow>,
        ruler: TimeRuler,
    ) -> std::io::Result<Self> {
        let buffer = update.culler.buffer();
        let (inputs, receiver) = crossbeam_channel::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker = thread::Builder::new()
            .name("notescope-update".into())
            .spawn({
                let shutdown = Arc::clone(&shutdown);
                move || update.run(receiver, shutdown)
            })?;

        Ok(Self {
            width: size.0,
            height: size.1,
            grid,
            ruler,
            buffer,
            inputs,
            shutdown,
            worker: Some(worker),
        })
    }

    pub fn send(&self, input: ViewportInput) {
        if self.inputs.send(input).is_err() {
            log::warn!("Update worker is gone, dropping {:?}", input);
        }
    }

    pub fn buffer(&self) -> Arc<DoubleBuffer<VisibleSet>> {
        Arc::clone(&self.buffer)
    }

    pub fn descriptor(&self) -> RenderDescriptor<'_> {
        RenderDescriptor {
            width: self.width,
            height: self.height,
            grid: &self.grid,
            ruler: self.ruler,
            visible: self.buffer.read(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Update worker panicked");
            }
        }
    }
}

impl Drop for ViewerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
