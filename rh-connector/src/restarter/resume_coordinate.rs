use std::fmt;

use anyhow::bail;

use rh_common::{error::Error, meta::position::Position};

/// A resume point in the addressing scheme of the binlog reader.
///
/// The default (empty) coordinate means no adjustment: the stored position
/// is used verbatim. It never means "start from the beginning of the log".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResumeCoordinate {
    pub binlog_filename: Option<String>,
    pub binlog_position: Option<u32>,
    pub gtid_set: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamStart {
    Binlog {
        binlog_filename: String,
        binlog_position: u32,
    },
    Gtid {
        gtid_set: String,
    },
}

impl ResumeCoordinate {
    pub fn binlog(binlog_filename: &str, binlog_position: u32) -> Self {
        Self {
            binlog_filename: Some(binlog_filename.to_string()),
            binlog_position: Some(binlog_position),
            gtid_set: None,
        }
    }

    pub fn gtid(gtid_set: &str) -> Self {
        Self {
            gtid_set: Some(gtid_set.to_string()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.binlog_filename.is_none() && self.binlog_position.is_none() && self.gtid_set.is_none()
    }

    pub fn resolve(&self, stored: &Position) -> anyhow::Result<StreamStart> {
        if let Some(gtid_set) = &self.gtid_set {
            return Ok(StreamStart::Gtid {
                gtid_set: gtid_set.clone(),
            });
        }

        match (&self.binlog_filename, self.binlog_position) {
            (Some(binlog_filename), Some(binlog_position)) => Ok(StreamStart::Binlog {
                binlog_filename: binlog_filename.clone(),
                binlog_position,
            }),
            (None, None) => StreamStart::verbatim(stored),
            _ => bail!(Error::PositionUnresolvable(format!(
                "incomplete binlog coordinate: {:?}",
                self
            ))),
        }
    }
}

impl StreamStart {
    pub fn verbatim(stored: &Position) -> anyhow::Result<Self> {
        match stored {
            Position::MysqlBinlog {
                binlog_filename,
                binlog_position,
                ..
            } => Ok(Self::Binlog {
                binlog_filename: binlog_filename.clone(),
                binlog_position: *binlog_position,
            }),
            Position::MysqlGtid { gtid_set, .. } => Ok(Self::Gtid {
                gtid_set: gtid_set.clone(),
            }),
            Position::None => bail!(Error::PositionUnresolvable(
                "no stored position to resume from, refusing to tail from the beginning of the log"
                    .into()
            )),
        }
    }
}

impl fmt::Display for StreamStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binlog {
                binlog_filename,
                binlog_position,
            } => write!(f, "{}:{}", binlog_filename, binlog_position),
            Self::Gtid { gtid_set } => write!(f, "gtid_set: {}", gtid_set),
        }
    }
}
