use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::bail;
use async_trait::async_trait;

use rh_common::meta::{
    binlog_event::BinlogEvent, global_event_state::PersistedStreamState, gtid_set::GtidSet,
    position::Position, schema_snapshot::SchemaDump, schema_snapshot::SchemaSnapshot,
};
use rh_connector::{
    dump::{DumpAvailabilityChecker, DumpHandler},
    extractor::{
        binlog_inventory::{BinaryLog, BinlogInventory},
        StreamReaderFactory,
    },
    restarter::{
        position_finder::PositionFinder,
        recovery_handler::{RecoveryHandler, RecoveryResult},
        resume_coordinate::{ResumeCoordinate, StreamStart},
    },
    resumer::state_store::GlobalStateStore,
    schema::{SchemaCache, SchemaProbe},
    BinlogReader, Sinker,
};

#[derive(Clone, Default)]
pub struct CallCounters {
    pub state_store_get: Arc<AtomicUsize>,
    pub dump_exists: Arc<AtomicUsize>,
    pub find_position: Arc<AtomicUsize>,
    pub validate_position: Arc<AtomicUsize>,
    pub recover: Arc<AtomicUsize>,
    pub published_query: Arc<AtomicUsize>,
    pub open_stream: Arc<AtomicUsize>,
    pub current_position: Arc<AtomicUsize>,
    pub schema_replaced: Arc<AtomicUsize>,
}

impl CallCounters {
    pub fn get(counter: &Arc<AtomicUsize>) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn hit(counter: &Arc<AtomicUsize>) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeStateStore {
    pub state: Option<PersistedStreamState>,
    pub delay: Option<Duration>,
    pub counters: CallCounters,
}

#[async_trait]
impl GlobalStateStore for FakeStateStore {
    async fn get(&self) -> anyhow::Result<Option<PersistedStreamState>> {
        CallCounters::hit(&self.counters.state_store_get);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.state.clone())
    }
}

pub struct FakeDumpStore {
    pub dump: Option<SchemaDump>,
    pub counters: CallCounters,
}

#[async_trait]
impl DumpAvailabilityChecker for FakeDumpStore {
    async fn dump_exists(&self) -> anyhow::Result<bool> {
        CallCounters::hit(&self.counters.dump_exists);
        Ok(self.dump.is_some())
    }
}

#[async_trait]
impl DumpHandler for FakeDumpStore {
    async fn load_dump(&self) -> anyhow::Result<Option<SchemaDump>> {
        Ok(self.dump.clone())
    }

    async fn create_dump(&self, _dump: &SchemaDump) -> anyhow::Result<()> {
        bail!("recovery must not create dumps")
    }

    async fn delete_dump(&self) -> anyhow::Result<()> {
        bail!("recovery must not delete dumps")
    }
}

pub struct FakeSchemaCache {
    pub snapshot: Mutex<SchemaSnapshot>,
    pub counters: CallCounters,
}

#[async_trait]
impl SchemaCache for FakeSchemaCache {
    async fn snapshot(&self) -> anyhow::Result<SchemaSnapshot> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn replace(&self, snapshot: &SchemaSnapshot) -> anyhow::Result<()> {
        CallCounters::hit(&self.counters.schema_replaced);
        *self.snapshot.lock().unwrap() = snapshot.clone();
        Ok(())
    }
}

pub struct FakeSchemaProbe {
    pub snapshot: SchemaSnapshot,
}

#[async_trait]
impl SchemaProbe for FakeSchemaProbe {
    async fn probe(&self) -> anyhow::Result<SchemaSnapshot> {
        Ok(self.snapshot.clone())
    }
}

pub struct FakeInventory {
    pub binary_logs: Vec<BinaryLog>,
    pub purged: String,
    pub current_position: Position,
    pub counters: CallCounters,
}

#[async_trait]
impl BinlogInventory for FakeInventory {
    async fn binary_logs(&self) -> anyhow::Result<Vec<BinaryLog>> {
        Ok(self.binary_logs.clone())
    }

    async fn purged_gtid_set(&self) -> anyhow::Result<GtidSet> {
        GtidSet::parse(&self.purged)
    }

    async fn current_position(&self, _gtid_enabled: bool) -> anyhow::Result<Position> {
        CallCounters::hit(&self.counters.current_position);
        Ok(self.current_position.clone())
    }
}

/// Delegates to the real finder and counts calls.
pub struct CountingPositionFinder<F> {
    pub inner: F,
    pub counters: CallCounters,
}

#[async_trait]
impl<F: PositionFinder + Send + Sync> PositionFinder for CountingPositionFinder<F> {
    async fn get_position_to_resume_tailing_from(
        &self,
        state: &PersistedStreamState,
        dump_exists: bool,
    ) -> anyhow::Result<ResumeCoordinate> {
        CallCounters::hit(&self.counters.find_position);
        self.inner
            .get_position_to_resume_tailing_from(state, dump_exists)
            .await
    }

    async fn validate(&self, start: &StreamStart) -> anyhow::Result<()> {
        CallCounters::hit(&self.counters.validate_position);
        self.inner.validate(start).await
    }
}

pub struct CountingRecoveryHandler<R> {
    pub inner: R,
    pub counters: CallCounters,
}

#[async_trait]
impl<R: RecoveryHandler + Send> RecoveryHandler for CountingRecoveryHandler<R> {
    async fn recover(
        &mut self,
        state: &PersistedStreamState,
        dump_exists: bool,
        published_position: Option<Position>,
    ) -> anyhow::Result<RecoveryResult> {
        CallCounters::hit(&self.counters.recover);
        self.inner
            .recover(state, dump_exists, published_position)
            .await
    }
}

/// Replays the events that follow `start` in a scripted log.
pub struct FakeStreamFactory {
    pub log: Vec<BinlogEvent>,
    pub opened: Arc<Mutex<Vec<StreamStart>>>,
    pub counters: CallCounters,
}

impl FakeStreamFactory {
    fn starts_at(event: &BinlogEvent, start: &StreamStart) -> bool {
        match (&event.position, start) {
            (
                Position::MysqlBinlog {
                    binlog_filename,
                    binlog_position,
                    ..
                },
                StreamStart::Binlog {
                    binlog_filename: start_filename,
                    binlog_position: start_position,
                },
            ) => binlog_filename == start_filename && binlog_position >= start_position,
            (Position::MysqlGtid { last_gtid, .. }, StreamStart::Gtid { gtid_set }) => {
                GtidSet::parse(gtid_set)
                    .and_then(|set| set.contains(last_gtid))
                    .map(|contained| !contained)
                    .unwrap_or(false)
            }
            _ => false,
        }
    }
}

#[async_trait]
impl StreamReaderFactory for FakeStreamFactory {
    async fn open(&self, start: &StreamStart) -> anyhow::Result<Box<dyn BinlogReader + Send>> {
        CallCounters::hit(&self.counters.open_stream);
        self.opened.lock().unwrap().push(start.clone());
        let events: VecDeque<BinlogEvent> = self
            .log
            .iter()
            .filter(|event| Self::starts_at(event, start))
            .cloned()
            .collect();
        Ok(Box::new(FakeReader { events }))
    }
}

pub struct FakeReader {
    events: VecDeque<BinlogEvent>,
}

#[async_trait]
impl BinlogReader for FakeReader {
    async fn next(&mut self) -> anyhow::Result<BinlogEvent> {
        match self.events.pop_front() {
            Some(event) => Ok(event),
            None => bail!("scripted log exhausted"),
        }
    }
}

pub struct FakeSinker {
    pub published: Arc<Mutex<Vec<BinlogEvent>>>,
    pub last_published: Option<Position>,
    pub counters: CallCounters,
}

#[async_trait]
impl Sinker for FakeSinker {
    async fn sink_event(&mut self, event: &BinlogEvent) -> anyhow::Result<()> {
        self.published.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn last_published_position(&self) -> anyhow::Result<Option<Position>> {
        CallCounters::hit(&self.counters.published_query);
        Ok(self.last_published.clone())
    }
}
