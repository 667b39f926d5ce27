/// Input event types the engine understands.
/// Generic: no game-specific semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began at world coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// A touch/click ended at world coordinates (x, y).
    PointerUp { x: f32, y: f32 },
    /// A touch/cursor moved to world coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// A custom event from the UI layer (HUD buttons, etc.).
    /// `kind` identifies the event type; `a`, `b`, `c` carry arbitrary data.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

/// A queue of input events.
/// The host writes events into the queue; Rust drains them once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take all pending events, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<InputEvent>> for InputQueue {
    fn from(events: Vec<InputEvent>) -> Self {
        Self { events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown { x: 10.0, y: 20.0 });
        q.push(InputEvent::PointerUp { x: 10.0, y: 20.0 });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn custom_event_round_trips_payload() {
        let q = InputQueue::from(vec![InputEvent::Custom { kind: 7, a: 1.5, b: 2.5, c: 3.5 }]);
        match q.iter().next() {
            Some(InputEvent::Custom { kind, a, b, c }) => {
                assert_eq!((*kind, *a, *b, *c), (7, 1.5, 2.5, 3.5));
            }
            other => panic!("Expected Custom event, got {:?}", other),
        };
    }
}
