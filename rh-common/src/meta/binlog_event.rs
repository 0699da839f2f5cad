use strum::{Display, IntoStaticStr};

use super::{global_event_state::EventType, position::Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
pub enum RowChange {
    #[strum(serialize = "insert")]
    Insert,
    #[strum(serialize = "update")]
    Update,
    #[strum(serialize = "delete")]
    Delete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BinlogEventKind {
    Ddl {
        schema: String,
        query: String,
    },
    Rows {
        schema: String,
        tb: String,
        change: RowChange,
        row_count: usize,
    },
    Commit {
        xid: u64,
    },
    Other {
        event_type: u8,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinlogEvent {
    pub position: Position,
    pub kind: BinlogEventKind,
}

impl BinlogEvent {
    pub fn new(position: Position, kind: BinlogEventKind) -> Self {
        Self { position, kind }
    }

    pub fn event_type(&self) -> EventType {
        match self.kind {
            BinlogEventKind::Ddl { .. } => EventType::SchemaEvent,
            BinlogEventKind::Rows { .. }
            | BinlogEventKind::Commit { .. }
            | BinlogEventKind::Other { .. } => EventType::DataEvent,
        }
    }
}
