use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::catalog::RegionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionEventKind {
    Hover,
    Leave,
    Click,
}

/// Interaction on one region, as published by the layer manager. Also the
/// unit of synthetic replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionEvent {
    pub kind: RegionEventKind,
    pub region: RegionId,
}

impl RegionEvent {
    pub fn hover(region: RegionId) -> Self {
        Self {
            kind: RegionEventKind::Hover,
            region,
        }
    }

    pub fn leave(region: RegionId) -> Self {
        Self {
            kind: RegionEventKind::Leave,
            region,
        }
    }

    pub fn click(region: RegionId) -> Self {
        Self {
            kind: RegionEventKind::Click,
            region,
        }
    }
}

/// Bounded history of region events. Oldest entries drop off first.
pub struct EventLog {
    events: VecDeque<RegionEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    pub fn push(&mut self, event: RegionEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &RegionEvent> {
        self.events.iter()
    }

    /// The most recent n events (newest last).
    pub fn recent(&self, n: usize) -> Vec<&RegionEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Fan-out of region events to channel subscribers, with a history log.
pub struct EventBus {
    subscribers: Vec<Sender<RegionEvent>>,
    log: EventLog,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            log: EventLog::default_capacity(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<RegionEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: RegionEvent) {
        self.log.push(event);
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Disconnect every subscriber; their receivers drain and then close.
    pub fn close(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
