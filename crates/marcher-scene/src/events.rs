//! Structural change events
//!
//! Every add or delete in the tree produces one [`ChangeEvent`] for the
//! editor's history. Events are only recorded here; replaying them is up to
//! the consumer.

use serde::Serialize;

use crate::ids::NodeId;
use crate::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Delete,
}

/// One structural change
///
/// `child` is a snapshot of the subtree as it was when the event fired, so a
/// delete event still shows everything that was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub parent: NodeId,
    pub child: Shape,
}

impl ChangeEvent {
    pub fn add(parent: &NodeId, child: &Shape) -> Self {
        Self {
            kind: ChangeKind::Add,
            parent: parent.clone(),
            child: child.clone(),
        }
    }

    pub fn delete(parent: &NodeId, child: &Shape) -> Self {
        Self {
            kind: ChangeKind::Delete,
            parent: parent.clone(),
            child: child.clone(),
        }
    }
}

/// Receiver for structural change events
pub trait HistorySink {
    fn record(&mut self, event: ChangeEvent);
}

/// Append-only, ordered record of change events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ChangeEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&ChangeEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand every recorded event to the caller, leaving the log empty
    pub fn take(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.events)
    }
}

impl HistorySink for EventLog {
    fn record(&mut self, event: ChangeEvent) {
        tracing::debug!(
            kind = ?event.kind,
            parent = %event.parent,
            child = %event.child.id(),
            "recorded change"
        );
        self.events.push(event);
    }
}
