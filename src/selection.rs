use std::sync::mpsc::{Receiver, Sender, channel};

use crate::catalog::RegionId;

/// The region the user last clicked, if any.
///
/// Observable two ways: `revision()` bumps on every change so a renderer
/// can diff cheaply, and `subscribe()` hands out a channel that receives
/// each new value.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: Option<RegionId>,
    revision: u64,
    watchers: Vec<Sender<Option<RegionId>>>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<RegionId> {
        self.selected
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Select `id`. Returns false (and notifies nobody) if it already was.
    pub fn select(&mut self, id: RegionId) -> bool {
        self.set(Some(id))
    }

    /// Only teardown clears the selection.
    pub(crate) fn clear(&mut self) -> bool {
        self.set(None)
    }

    fn set(&mut self, value: Option<RegionId>) -> bool {
        if self.selected == value {
            return false;
        }
        self.selected = value;
        self.revision += 1;
        log::debug!("selection -> {:?} (rev {})", value, self.revision);
        // Dropped receivers unsubscribe themselves.
        self.watchers.retain(|tx| tx.send(value).is_ok());
        true
    }

    pub fn subscribe(&mut self) -> Receiver<Option<RegionId>> {
        let (tx, rx) = channel();
        self.watchers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.watchers.len()
    }
}
