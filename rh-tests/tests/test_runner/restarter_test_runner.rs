use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rh_common::{
    config::recovery_config::BootstrapConfig,
    meta::{
        binlog_event::{BinlogEvent, BinlogEventKind, RowChange},
        global_event_state::{EventType, PersistedStreamState},
        position::Position,
        schema_snapshot::{SchemaDump, SchemaSnapshot},
    },
};
use rh_connector::{
    extractor::binlog_inventory::BinaryLog,
    restarter::{
        position_finder::BinlogPositionFinder,
        recovery_handler::SchemaRecoveryHandler,
        replication_stream_restarter::{ReplicationStreamRestarter, RestarterOptions},
        resume_coordinate::StreamStart,
        stream_handle::StreamHandle,
    },
};

use super::fakes::{
    CallCounters, CountingPositionFinder, CountingRecoveryHandler, FakeDumpStore,
    FakeInventory, FakeSchemaCache, FakeSchemaProbe, FakeSinker, FakeStateStore,
    FakeStreamFactory,
};

pub const BINLOG_FILENAME: &str = "mysql-bin.000003";

/// Wires a restarter from fakes around a scripted binlog of fixed-size events.
pub struct RestarterTestRunner {
    pub state: Option<PersistedStreamState>,
    pub state_store_delay: Option<Duration>,
    pub dump: Option<SchemaDump>,
    pub cached: SchemaSnapshot,
    pub live: SchemaSnapshot,
    pub binary_logs: Vec<BinaryLog>,
    pub current_position: Position,
    pub log: Vec<BinlogEvent>,
    pub last_published: Option<Position>,
    pub options: RestarterOptions,
    pub counters: CallCounters,
    pub opened: Arc<Mutex<Vec<StreamStart>>>,
    pub published: Arc<Mutex<Vec<BinlogEvent>>>,
    pub schema_cache: Option<Arc<FakeSchemaCache>>,
}

impl RestarterTestRunner {
    pub const EVENT_SIZE: u32 = 100;

    pub fn new() -> Self {
        Self {
            state: None,
            state_store_delay: None,
            dump: None,
            cached: Self::snapshot("id int"),
            live: Self::snapshot("id int"),
            binary_logs: vec![BinaryLog {
                name: BINLOG_FILENAME.into(),
                size: 10_000,
            }],
            current_position: Position::None,
            log: Self::scripted_log(),
            last_published: None,
            options: RestarterOptions {
                suppress_side_effects: false,
                bootstrap: BootstrapConfig::Disabled,
                gtid_enabled: false,
                collaborator_timeout: Duration::from_secs(5),
            },
            counters: CallCounters::default(),
            opened: Arc::new(Mutex::new(Vec::new())),
            published: Arc::new(Mutex::new(Vec::new())),
            schema_cache: None,
        }
    }

    pub fn position(binlog_position: u32) -> Position {
        Position::MysqlBinlog {
            binlog_filename: BINLOG_FILENAME.into(),
            binlog_position,
            next_event_position: binlog_position + Self::EVENT_SIZE,
        }
    }

    pub fn state(event_type: EventType, binlog_position: u32, clean: bool) -> PersistedStreamState {
        PersistedStreamState::new(event_type, Self::position(binlog_position), clean)
    }

    pub fn snapshot(columns: &str) -> SchemaSnapshot {
        let mut snapshot = SchemaSnapshot::default();
        snapshot.tables.insert(
            SchemaSnapshot::table_key("test_db_1", "tb_1"),
            columns.to_string(),
        );
        snapshot
    }

    pub fn dump_at(binlog_position: u32, snapshot: SchemaSnapshot) -> SchemaDump {
        SchemaDump {
            position: Self::position(binlog_position),
            snapshot,
            created_at: "2025-02-18 04:13:04.655541".into(),
        }
    }

    /// 1000: insert, 1100: commit, 1200: alter, 1300: insert, 1400: commit
    fn scripted_log() -> Vec<BinlogEvent> {
        let rows = || BinlogEventKind::Rows {
            schema: "test_db_1".into(),
            tb: "tb_1".into(),
            change: RowChange::Insert,
            row_count: 1,
        };
        vec![
            BinlogEvent::new(Self::position(1000), rows()),
            BinlogEvent::new(Self::position(1100), BinlogEventKind::Commit { xid: 1 }),
            BinlogEvent::new(
                Self::position(1200),
                BinlogEventKind::Ddl {
                    schema: "test_db_1".into(),
                    query: "ALTER TABLE tb_1 ADD COLUMN f_1 int".into(),
                },
            ),
            BinlogEvent::new(Self::position(1300), rows()),
            BinlogEvent::new(Self::position(1400), BinlogEventKind::Commit { xid: 2 }),
        ]
    }

    pub fn build(&mut self) -> ReplicationStreamRestarter {
        let counters = self.counters.clone();
        let inventory = Arc::new(FakeInventory {
            binary_logs: self.binary_logs.clone(),
            purged: String::new(),
            current_position: self.current_position.clone(),
            counters: counters.clone(),
        });
        let dump_store = Arc::new(FakeDumpStore {
            dump: self.dump.clone(),
            counters: counters.clone(),
        });
        let schema_cache = Arc::new(FakeSchemaCache {
            snapshot: Mutex::new(self.cached.clone()),
            counters: counters.clone(),
        });
        self.schema_cache = Some(schema_cache.clone());

        let recovery_handler = SchemaRecoveryHandler::new(
            dump_store.clone(),
            schema_cache,
            Arc::new(FakeSchemaProbe {
                snapshot: self.live.clone(),
            }),
            self.options.suppress_side_effects,
        );

        ReplicationStreamRestarter::new(
            Arc::new(FakeStateStore {
                state: self.state.clone(),
                delay: self.state_store_delay,
                counters: counters.clone(),
            }),
            dump_store,
            Arc::new(CountingPositionFinder {
                inner: BinlogPositionFinder::new(inventory.clone()),
                counters: counters.clone(),
            }),
            Box::new(CountingRecoveryHandler {
                inner: recovery_handler,
                counters: counters.clone(),
            }),
            inventory,
            Arc::new(FakeStreamFactory {
                log: self.log.clone(),
                opened: self.opened.clone(),
                counters: counters.clone(),
            }),
            self.options.clone(),
        )
    }

    pub async fn restart(&mut self) -> anyhow::Result<StreamHandle> {
        let mut restarter = self.build();
        let sinker = Box::new(FakeSinker {
            published: self.published.clone(),
            last_published: self.last_published.clone(),
            counters: self.counters.clone(),
        });
        restarter.restart(sinker).await
    }

    pub fn opened(&self) -> Vec<StreamStart> {
        self.opened.lock().unwrap().clone()
    }

    pub fn cached_snapshot(&self) -> SchemaSnapshot {
        self.schema_cache
            .as_ref()
            .map(|cache| cache.snapshot.lock().unwrap().clone())
            .unwrap_or_default()
    }
}
