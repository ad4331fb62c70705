use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A discrete annotation on the recording timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Start time in seconds
    pub onset: f64,
    /// Length in seconds
    pub duration: f64,
    /// Free-form label, not necessarily unique
    pub label: String,
}

impl Event {
    /// Create an event
    pub fn new(onset: f64, duration: f64, label: impl Into<String>) -> Self {
        Self {
            onset,
            duration,
            label: label.into(),
        }
    }

    /// End time in seconds (exclusive)
    pub fn end(&self) -> f64 {
        self.onset + self.duration
    }
}

/// Ordered sequence of events; order and duplicates are preserved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSet {
    events: Vec<Event>,
}

impl EventSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events in order
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Event at `index`
    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when there are no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Labels in order
    pub fn labels(&self) -> Vec<String> {
        self.events.iter().map(|e| e.label.clone()).collect()
    }
}

impl FromIterator<Event> for EventSet {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EventSet {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// Store entities produced by tagging
#[derive(Debug, Clone, PartialEq)]
pub struct TagHandle {
    /// The multi-tag
    pub tag: Uuid,
    /// Positions array
    pub positions: Uuid,
    /// Extents array
    pub extents: Uuid,
    /// Number of events tagged
    pub events: usize,
}
