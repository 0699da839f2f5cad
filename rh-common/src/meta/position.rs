use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::gtid_set::GtidSet;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Position {
    #[default]
    None,
    MysqlBinlog {
        binlog_filename: String,
        // start offset of the event
        binlog_position: u32,
        // offset right after the event
        next_event_position: u32,
    },
    MysqlGtid {
        // executed set, including last_gtid
        gtid_set: String,
        last_gtid: String,
    },
}

impl Position {
    /// Parses a position from a log line like:
    /// 2025-02-18 04:13:04.655541 | global_event_state | {"type":"MysqlBinlog",...}
    /// or from a bare json text. Unparsable input yields Position::None.
    pub fn from_log(log: &str) -> Position {
        let json = match log.rfind('|') {
            Some(idx) => &log[idx + 1..],
            None => log,
        };
        serde_json::from_str(json.trim()).unwrap_or(Position::None)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Position::None)
    }

    /// Relative order of two coordinates in the replication log.
    ///
    /// Binlog coordinates compare by file sequence number and then offset,
    /// GTID coordinates compare by set containment. Anything else is
    /// incomparable and returns None.
    pub fn log_order(&self, other: &Position) -> Option<Ordering> {
        match (self, other) {
            (
                Position::MysqlBinlog {
                    binlog_filename: self_filename,
                    binlog_position: self_position,
                    ..
                },
                Position::MysqlBinlog {
                    binlog_filename: other_filename,
                    binlog_position: other_position,
                    ..
                },
            ) => {
                if self_filename == other_filename {
                    return Some(self_position.cmp(other_position));
                }
                let self_seq = Self::binlog_sequence(self_filename)?;
                let other_seq = Self::binlog_sequence(other_filename)?;
                if Self::binlog_basename(self_filename) != Self::binlog_basename(other_filename) {
                    return None;
                }
                Some(
                    self_seq
                        .cmp(&other_seq)
                        .then(self_position.cmp(other_position)),
                )
            }

            (
                Position::MysqlGtid {
                    gtid_set: self_gtid_set,
                    ..
                },
                Position::MysqlGtid {
                    gtid_set: other_gtid_set,
                    ..
                },
            ) => {
                let self_set = GtidSet::parse(self_gtid_set).ok()?;
                let other_set = GtidSet::parse(other_gtid_set).ok()?;
                match (
                    self_set.contains_set(&other_set),
                    other_set.contains_set(&self_set),
                ) {
                    (true, true) => Some(Ordering::Equal),
                    (true, false) => Some(Ordering::Greater),
                    (false, true) => Some(Ordering::Less),
                    (false, false) => None,
                }
            }

            _ => None,
        }
    }

    // mysql-bin.000003 -> 3
    fn binlog_sequence(binlog_filename: &str) -> Option<u64> {
        binlog_filename
            .rsplit_once('.')
            .and_then(|(_, seq)| seq.parse::<u64>().ok())
    }

    fn binlog_basename(binlog_filename: &str) -> &str {
        binlog_filename
            .rsplit_once('.')
            .map(|(base, _)| base)
            .unwrap_or(binlog_filename)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", json!(self))
    }
}
