//! JSON wire form of the engine's event protocol, for presentation adapters
//! that live outside the Rust process.
//!
//! Every message is an object tagged by its event name:
//!
//! ```json
//! {"event":"tile_step","x":3,"y":1}
//! {"event":"clear_tile","x":3,"y":1,"tile":{"x":3,"y":1,"mine":false,...}}
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use sweeper_core::{EventBus, EventName, GameEvent, Gesture};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

pub fn encode_event(event: &GameEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

pub fn encode_gesture(gesture: &Gesture) -> Result<String> {
    Ok(serde_json::to_string(gesture)?)
}

pub fn decode_gesture(text: &str) -> Result<Gesture> {
    Ok(serde_json::from_str(text)?)
}

/// Decodes newline-delimited gestures, skipping blank lines.
pub fn decode_gestures(text: &str) -> impl Iterator<Item = Result<Gesture>> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(decode_gesture)
}

/// Records every event published on a bus as one JSON line.
#[derive(Clone, Debug, Default)]
pub struct JsonEventLog {
    lines: Rc<RefCell<Vec<String>>>,
}

impl JsonEventLog {
    pub fn attach(bus: &mut EventBus<GameEvent>) -> Self {
        let recorder = Self::default();
        for name in EventName::ALL {
            let lines = Rc::clone(&recorder.lines);
            bus.subscribe(name, move |event| match encode_event(event) {
                Ok(line) => lines.borrow_mut().push(line),
                Err(err) => log::error!("Could not encode {} event: {}", name, err),
            });
        }
        recorder
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<String> {
        self.lines.take()
    }

    pub fn to_ndjson(&self) -> String {
        self.lines.borrow().join("\n")
    }
}
