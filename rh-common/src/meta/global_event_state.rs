use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumString, IntoStaticStr};

use super::position::Position;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
pub enum EventType {
    #[strum(serialize = "schema_event")]
    SchemaEvent,
    #[strum(serialize = "data_event")]
    DataEvent,
}

/// The durable record of the last acknowledged position, written by the
/// tailing loop and read once per restart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedStreamState {
    pub event_type: EventType,
    pub position: Position,
    // true only if the previous instance flushed its position and stopped in order
    pub is_clean_shutdown: bool,
}

impl PersistedStreamState {
    pub fn new(event_type: EventType, position: Position, is_clean_shutdown: bool) -> Self {
        Self {
            event_type,
            position,
            is_clean_shutdown,
        }
    }

    pub fn from_log(log: &str) -> Option<Self> {
        let json = match log.rfind('|') {
            Some(idx) => &log[idx + 1..],
            None => log,
        };
        serde_json::from_str(json.trim()).ok()
    }
}

impl fmt::Display for PersistedStreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", json!(self))
    }
}
