use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::rendering::piano_roll::RenderNote;

/// Two slots and an atomic selector.
///
/// The writer always fills the slot that is not current and flips the selector
/// once it is complete, so a reader sees either the previous or the new
/// snapshot. There must be a single writer.
pub struct DoubleBuffer<T> {
    slots: [RwLock<T>; 2],
    current: AtomicUsize,
}

impl<T: Default> Default for DoubleBuffer<T> {
    fn default() -> Self {
        Self::new(T::default(), T::default())
    }
}

impl<T> DoubleBuffer<T> {
    pub fn new(front: T, back: T) -> Self {
        Self {
            slots: [RwLock::new(front), RwLock::new(back)],
            current: AtomicUsize::new(0),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.slots[self.current_index()].read()
    }

    /// Rewrites the back slot with `write`, then makes it current.
    pub fn publish(&self, write: impl FnOnce(&mut T)) {
        let back = 1 - self.current.load(Ordering::Acquire);
        {
            let mut slot = self.slots[back].write();
            write(&mut *slot);
        }
        self.current.store(back, Ordering::Release);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleSet {
    pub offset: f32,
    pub notes: Vec<RenderNote>,
}

/// A rectangle counts as visible when either horizontal edge lies strictly
/// inside the viewport. A note spanning the whole viewport is not drawn.
pub fn is_visible(x: f32, w: f32, width: f32) -> bool {
    let end = x + w;
    (x > 0.0 && x < width) || (end > 0.0 && end < width)
}

pub struct VisibilityCuller {
    templates: Vec<RenderNote>,
    width: f32,
    buffer: Arc<DoubleBuffer<VisibleSet>>,
}

impl VisibilityCuller {
    pub fn new(templates: Vec<RenderNote>, width: f32) -> Self {
        Self {
            templates,
            width,
            buffer: Arc::new(DoubleBuffer::default()),
        }
    }

    pub fn buffer(&self) -> Arc<DoubleBuffer<VisibleSet>> {
        Arc::clone(&self.buffer)
    }

    pub fn templates(&self) -> &[RenderNote] {
        &self.templates
    }

    /// Culls every template against the viewport at `offset` and publishes the result.
    pub fn update(&self, offset: f32) {
        let width = self.width;
        self.buffer.publish(|set| {
            set.offset = offset;
            set.notes.clear();
            set.notes.extend(
                self.templates
                    .iter()
                    .filter(|RenderNote(rect, _)| is_visible(rect.x + offset, rect.w, width))
                    .map(|RenderNote(rect, color)| RenderNote(rect.shifted(offset), *color)),
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::piano_roll::NoteRect;

    fn note(x: f32, w: f32) -> RenderNote {
        RenderNote(NoteRect { x, y: 0.0, w, h: 1.0 }, [0, 0, 255])
    }

    #[test]
    fn test_is_visible() {
        assert!(is_visible(10.0, 5.0, 100.0));
        assert!(is_visible(-5.0, 10.0, 100.0));
        assert!(is_visible(95.0, 10.0, 100.0));
        assert!(!is_visible(-20.0, 10.0, 100.0));
        assert!(!is_visible(100.0, 10.0, 100.0));
        // spans the whole viewport with both edges outside
        assert!(!is_visible(-10.0, 200.0, 100.0));
    }

    #[test]
    fn test_publish_flips_current_slot() {
        let buffer = DoubleBuffer::new(1, 0);
        assert_eq!(*buffer.read(), 1);
        buffer.publish(|v| *v = 2);
        assert_eq!(buffer.current_index(), 1);
        assert_eq!(*buffer.read(), 2);
        buffer.publish(|v| *v = 3);
        assert_eq!(buffer.current_index(), 0);
        assert_eq!(*buffer.read(), 3);
    }

    #[test]
    fn test_update_offsets_visible_notes() {
        let culler = VisibilityCuller::new(vec![note(10.0, 20.0), note(150.0, 20.0), note(300.0, 5.0)], 100.0);
        let buffer = culler.buffer();

        culler.update(0.0);
        {
            let set = buffer.read();
            assert_eq!(set.offset, 0.0);
            assert_eq!(set.notes, vec![note(10.0, 20.0)]);
        }

        culler.update(-140.0);
        let set = buffer.read();
        assert_eq!(set.offset, -140.0);
        assert_eq!(set.notes, vec![note(10.0, 20.0)]);
    }
}
