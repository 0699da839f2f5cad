use std::{cmp::Ordering, sync::Arc};

use anyhow::bail;
use async_trait::async_trait;
use strum::Display;

use super::{position_finder::BinlogPositionFinder, resume_coordinate::ResumeCoordinate};
use crate::{
    dump::DumpHandler,
    schema::{SchemaCache, SchemaProbe},
};
use rh_common::{
    error::Error,
    log_info, log_warn,
    meta::{
        global_event_state::{EventType, PersistedStreamState},
        position::Position,
        schema_snapshot::SchemaSnapshot,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum RecoveryState {
    NeedsRecovery,
    Recovering,
    Recovered,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum RecoverySource {
    Dump,
    LiveProbe,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoveryResult {
    pub source: RecoverySource,
    // fingerprint of the schema the tailer continues with
    pub schema_version: String,
    pub schema_rebuilt: bool,
    pub resume_override: Option<ResumeCoordinate>,
}

#[async_trait]
pub trait RecoveryHandler {
    /// Brings the schema cache back in line with the stream position after an
    /// unclean shutdown. Running it twice on the same inputs gives the same result.
    async fn recover(
        &mut self,
        state: &PersistedStreamState,
        dump_exists: bool,
        published_position: Option<Position>,
    ) -> anyhow::Result<RecoveryResult>;
}

pub struct SchemaRecoveryHandler {
    dump_handler: Arc<dyn DumpHandler + Send + Sync>,
    schema_cache: Arc<dyn SchemaCache + Send + Sync>,
    schema_probe: Arc<dyn SchemaProbe + Send + Sync>,
    suppress_side_effects: bool,
    recovery_state: RecoveryState,
}

impl SchemaRecoveryHandler {
    pub fn new(
        dump_handler: Arc<dyn DumpHandler + Send + Sync>,
        schema_cache: Arc<dyn SchemaCache + Send + Sync>,
        schema_probe: Arc<dyn SchemaProbe + Send + Sync>,
        suppress_side_effects: bool,
    ) -> Self {
        Self {
            dump_handler,
            schema_cache,
            schema_probe,
            suppress_side_effects,
            recovery_state: RecoveryState::NeedsRecovery,
        }
    }

    pub fn recovery_state(&self) -> RecoveryState {
        self.recovery_state
    }

    fn transition(&mut self, to: RecoveryState) {
        log_info!("recovery state: {} -> {}", self.recovery_state, to);
        self.recovery_state = to;
    }

    async fn recover_from_dump(
        &self,
        state: &PersistedStreamState,
    ) -> anyhow::Result<(RecoveryResult, Position)> {
        let Some(dump) = self.dump_handler.load_dump().await? else {
            bail!(Error::DependencyFailure(
                "schema dump reported available but could not be loaded".into()
            ))
        };

        let resume_override = match (dump.position.log_order(&state.position), state.event_type)
        {
            // crashed after recording the schema event, before the dump was dropped
            (Some(Ordering::Equal), EventType::SchemaEvent) => {
                Some(BinlogPositionFinder::at(&state.position)?)
            }
            (Some(Ordering::Equal), EventType::DataEvent) => {
                bail!(Error::RecoveryDivergenceUnresolved(format!(
                    "schema dump at {} matches a data event checkpoint, dump and state are inconsistent",
                    dump.position
                )))
            }
            // crashed before a later schema event was recorded, replay reaches it again
            (Some(Ordering::Greater), EventType::DataEvent) => None,
            // the recorded schema event is already in the cache, only the later one is replayed
            (Some(Ordering::Greater), EventType::SchemaEvent) => {
                Some(BinlogPositionFinder::after(&state.position)?)
            }
            _ => bail!(Error::RecoveryDivergenceUnresolved(format!(
                "schema dump at {} is stale against the checkpoint at {}",
                dump.position, state.position
            ))),
        };

        let cached = self.schema_cache.snapshot().await?;
        let schema_version = dump.snapshot.fingerprint();
        let schema_rebuilt = cached.fingerprint() != schema_version;
        if schema_rebuilt {
            self.replace_cache(&dump.snapshot).await?;
        }

        Ok((
            RecoveryResult {
                source: RecoverySource::Dump,
                schema_version,
                schema_rebuilt,
                resume_override,
            },
            dump.position,
        ))
    }

    async fn recover_from_probe(&self) -> anyhow::Result<RecoveryResult> {
        let cached = self.schema_cache.snapshot().await?;
        let live = self.schema_probe.probe().await?;
        let (cached_version, live_version) = (cached.fingerprint(), live.fingerprint());
        if cached_version != live_version {
            bail!(Error::RecoveryDivergenceUnresolved(format!(
                "no schema dump available and the schema cache (version {}) diverges from the source (version {})",
                cached_version, live_version
            )))
        }
        Ok(RecoveryResult {
            source: RecoverySource::LiveProbe,
            schema_version: cached_version,
            schema_rebuilt: false,
            resume_override: None,
        })
    }

    async fn replace_cache(&self, snapshot: &SchemaSnapshot) -> anyhow::Result<()> {
        if self.suppress_side_effects {
            log_info!(
                "side effects suppressed, schema cache not replaced with version: {}",
                snapshot.fingerprint()
            );
            return Ok(());
        }
        self.schema_cache.replace(snapshot).await
    }

    fn reconcile_published(
        result: &mut RecoveryResult,
        state: &PersistedStreamState,
        dump_position: Option<&Position>,
        published: &Position,
    ) -> anyhow::Result<()> {
        if published.log_order(&state.position) != Some(Ordering::Greater) {
            return Ok(());
        }
        // events at or past the dump are read again on the restored schema
        if let Some(dump_position) = dump_position {
            if published.log_order(dump_position) != Some(Ordering::Less) {
                return Ok(());
            }
        }
        log_warn!(
            "sink already published up to {}, beyond the checkpoint at {}",
            published,
            state.position
        );
        result.resume_override = Some(BinlogPositionFinder::after(published)?);
        Ok(())
    }
}

#[async_trait]
impl RecoveryHandler for SchemaRecoveryHandler {
    async fn recover(
        &mut self,
        state: &PersistedStreamState,
        dump_exists: bool,
        published_position: Option<Position>,
    ) -> anyhow::Result<RecoveryResult> {
        self.transition(RecoveryState::Recovering);

        let recovered = async {
            let (mut result, dump_position) = if dump_exists {
                let (result, dump_position) = self.recover_from_dump(state).await?;
                (result, Some(dump_position))
            } else {
                (self.recover_from_probe().await?, None)
            };
            if let Some(published) = &published_position {
                Self::reconcile_published(&mut result, state, dump_position.as_ref(), published)?;
            }
            anyhow::Ok(result)
        }
        .await;

        match recovered {
            Ok(result) => {
                log_info!(
                    "recovered from {}, schema version: {}, rebuilt: {}, resume override: {:?}",
                    result.source,
                    result.schema_version,
                    result.schema_rebuilt,
                    result.resume_override
                );
                self.transition(RecoveryState::Recovered);
                Ok(result)
            }
            Err(err) => {
                self.transition(RecoveryState::Failed);
                Err(err)
            }
        }
    }
}
