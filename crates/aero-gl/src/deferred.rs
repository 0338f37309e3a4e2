//! Frame-counted deferred destruction of GPU-backed objects.
//!
//! Deleting a legacy object only detaches it from the state store; the explicit-API object
//! behind it may still be referenced by command buffers in flight. Deletions are queued with the
//! frame they happened in and handed to a [`ResourceDestroyer`] once `delay` frames have passed.

use std::collections::VecDeque;

use tracing::debug;

use crate::handle::{Handle, ResourceKind};

/// Owner of the explicit-API objects behind legacy handles.
pub trait ResourceDestroyer {
    /// Destroy every object in `handles`. Called at most once per kind per collection.
    fn destroy(&mut self, kind: ResourceKind, handles: &[Handle]);

    /// Block until the device has finished all submitted work.
    fn wait_idle(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingDeletion {
    frame: u64,
    kind: ResourceKind,
    handle: Handle,
}

#[derive(Debug)]
pub struct DeferredDeletionQueue {
    delay: u64,
    frame: u64,
    pending: VecDeque<PendingDeletion>,
}

impl DeferredDeletionQueue {
    pub fn new(delay_frames: u64) -> Self {
        Self {
            delay: delay_frames,
            frame: 0,
            pending: VecDeque::new(),
        }
    }

    pub fn delay_frames(&self) -> u64 {
        self.delay
    }

    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn retire(&mut self, kind: ResourceKind, handle: Handle) {
        if handle.is_none() {
            return;
        }
        self.pending.push_back(PendingDeletion {
            frame: self.frame,
            kind,
            handle,
        });
    }

    /// Move to the next frame and destroy everything retired at least `delay` frames ago.
    ///
    /// Returns the number of objects destroyed.
    pub fn advance_frame(&mut self, destroyer: &mut dyn ResourceDestroyer) -> usize {
        self.frame += 1;
        let frame = self.frame;
        let delay = self.delay;

        // Entries are pushed in frame order, so the eligible ones form a prefix.
        let eligible = self
            .pending
            .iter()
            .take_while(|p| frame - p.frame >= delay)
            .count();
        let drained: Vec<_> = self.pending.drain(..eligible).collect();
        destroy_grouped(&drained, destroyer)
    }

    /// Wait for the device to go idle, then destroy every pending object regardless of age.
    pub fn flush(&mut self, destroyer: &mut dyn ResourceDestroyer) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        destroyer.wait_idle();
        let drained: Vec<_> = self.pending.drain(..).collect();
        destroy_grouped(&drained, destroyer)
    }
}

fn destroy_grouped(entries: &[PendingDeletion], destroyer: &mut dyn ResourceDestroyer) -> usize {
    if entries.is_empty() {
        return 0;
    }
    let mut handles = Vec::with_capacity(entries.len());
    for kind in ResourceKind::ALL {
        handles.clear();
        handles.extend(entries.iter().filter(|e| e.kind == kind).map(|e| e.handle));
        if !handles.is_empty() {
            debug!(%kind, count = handles.len(), "destroying retired objects");
            destroyer.destroy(kind, &handles);
        }
    }
    entries.len()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ResourceDestroyer for Recorder {
        fn destroy(&mut self, kind: ResourceKind, handles: &[Handle]) {
            let raw: Vec<u64> = handles.iter().map(|h| h.raw()).collect();
            self.events.push(format!("{kind}:{raw:?}"));
        }

        fn wait_idle(&mut self) {
            self.events.push("wait_idle".into());
        }
    }

    #[test]
    fn waits_the_configured_number_of_frames() {
        let mut queue = DeferredDeletionQueue::new(2);
        let mut recorder = Recorder::default();
        queue.retire(ResourceKind::Buffer, Handle::from_raw(7));

        assert_eq!(queue.advance_frame(&mut recorder), 0);
        assert!(recorder.events.is_empty());
        assert_eq!(queue.advance_frame(&mut recorder), 1);
        assert_eq!(recorder.events, vec!["buffer:[7]".to_string()]);
        assert!(queue.is_empty());
    }

    #[test]
    fn groups_by_kind_and_keeps_young_entries() {
        let mut queue = DeferredDeletionQueue::new(1);
        let mut recorder = Recorder::default();
        queue.retire(ResourceKind::Texture, Handle::from_raw(1));
        queue.retire(ResourceKind::Buffer, Handle::from_raw(2));
        queue.retire(ResourceKind::Texture, Handle::from_raw(3));

        assert_eq!(queue.advance_frame(&mut recorder), 3);
        queue.retire(ResourceKind::Sampler, Handle::from_raw(4));
        assert_eq!(
            recorder.events,
            vec!["texture:[1, 3]".to_string(), "buffer:[2]".to_string()]
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn flush_waits_idle_before_destroying() {
        let mut queue = DeferredDeletionQueue::new(100);
        let mut recorder = Recorder::default();
        queue.retire(ResourceKind::Program, Handle::from_raw(9));

        assert_eq!(queue.flush(&mut recorder), 1);
        assert_eq!(
            recorder.events,
            vec!["wait_idle".to_string(), "program:[9]".to_string()]
        );
    }

    #[test]
    fn empty_flush_does_not_stall() {
        let mut queue = DeferredDeletionQueue::new(1);
        let mut recorder = Recorder::default();
        assert_eq!(queue.flush(&mut recorder), 0);
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn zero_delay_destroys_on_next_frame() {
        let mut queue = DeferredDeletionQueue::new(0);
        let mut recorder = Recorder::default();
        queue.retire(ResourceKind::Query, Handle::from_raw(5));
        assert_eq!(queue.advance_frame(&mut recorder), 1);
    }
}
