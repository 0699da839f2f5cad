#[cfg(test)]
mod test {
    use crate::test_runner::{
        fakes::CallCounters,
        restarter_test_runner::{RestarterTestRunner, BINLOG_FILENAME},
    };
    use rh_common::{
        error::Error,
        meta::{binlog_event::BinlogEventKind, global_event_state::EventType},
    };
    use rh_connector::restarter::resume_coordinate::StreamStart;

    fn binlog_start(binlog_position: u32) -> StreamStart {
        StreamStart::Binlog {
            binlog_filename: BINLOG_FILENAME.into(),
            binlog_position,
        }
    }

    fn schema_event_with_dump() -> RestarterTestRunner {
        let mut runner = RestarterTestRunner::new();
        runner.state = Some(RestarterTestRunner::state(EventType::SchemaEvent, 1200, false));
        runner.dump = Some(RestarterTestRunner::dump_at(
            1200,
            RestarterTestRunner::snapshot("id int"),
        ));
        // the crash happened after the cache took the new schema
        runner.cached = RestarterTestRunner::snapshot("id int, f_1 int");
        runner.live = RestarterTestRunner::snapshot("id int, f_1 int");
        runner
    }

    #[tokio::test]
    async fn recover_unclean_schema_event_with_dump_test() {
        let mut runner = schema_event_with_dump();

        let mut handle = runner.restart().await.unwrap();
        // the schema event is read again, on the schema from before it
        assert_eq!(handle.start(), &binlog_start(1200));
        let event = handle.next().await.unwrap();
        assert!(matches!(event.kind, BinlogEventKind::Ddl { .. }));
        assert_eq!(
            runner.cached_snapshot(),
            RestarterTestRunner::snapshot("id int")
        );

        let counters = &runner.counters;
        assert_eq!(CallCounters::get(&counters.recover), 1);
        assert_eq!(CallCounters::get(&counters.find_position), 1);
        assert_eq!(CallCounters::get(&counters.schema_replaced), 1);
    }

    #[tokio::test]
    async fn recover_is_idempotent_test() {
        let mut runner = schema_event_with_dump();
        runner.restart().await.unwrap();
        let first_cache = runner.cached_snapshot();

        // restart again on the cache the first recovery left behind
        runner.cached = first_cache.clone();
        runner.restart().await.unwrap();

        assert_eq!(runner.opened(), vec![binlog_start(1200), binlog_start(1200)]);
        assert_eq!(runner.cached_snapshot(), first_cache);
        assert_eq!(CallCounters::get(&runner.counters.recover), 2);
        assert_eq!(CallCounters::get(&runner.counters.schema_replaced), 1);
    }

    #[tokio::test]
    async fn recover_side_effects_suppressed_test() {
        let mut runner = schema_event_with_dump();
        runner.options.suppress_side_effects = true;

        let mut handle = runner.restart().await.unwrap();
        assert_eq!(handle.start(), &binlog_start(1200));
        handle.forward().await.unwrap();

        assert_eq!(handle.published_count(), 0);
        assert!(runner.published.lock().unwrap().is_empty());
        assert_eq!(CallCounters::get(&runner.counters.schema_replaced), 0);
        assert_eq!(
            runner.cached_snapshot(),
            RestarterTestRunner::snapshot("id int, f_1 int")
        );
    }

    #[tokio::test]
    async fn recover_dump_ahead_of_checkpoint_test() {
        // crashed between the dump and the schema event checkpoint
        let mut runner = RestarterTestRunner::new();
        runner.state = Some(RestarterTestRunner::state(EventType::DataEvent, 1100, false));
        runner.dump = Some(RestarterTestRunner::dump_at(
            1200,
            RestarterTestRunner::snapshot("id int"),
        ));
        runner.cached = RestarterTestRunner::snapshot("id int, f_1 int");

        let mut handle = runner.restart().await.unwrap();
        assert_eq!(handle.start(), &binlog_start(1200));
        let event = handle.next().await.unwrap();
        assert!(matches!(event.kind, BinlogEventKind::Ddl { .. }));
        assert_eq!(
            runner.cached_snapshot(),
            RestarterTestRunner::snapshot("id int")
        );
    }

    #[tokio::test]
    async fn recover_stale_dump_test() {
        let mut runner = RestarterTestRunner::new();
        runner.state = Some(RestarterTestRunner::state(EventType::DataEvent, 1400, false));
        runner.dump = Some(RestarterTestRunner::dump_at(
            1200,
            RestarterTestRunner::snapshot("id int"),
        ));

        let err = runner.restart().await.err().unwrap();
        let error = err.downcast_ref::<Error>().unwrap();
        assert!(matches!(error, Error::RecoveryDivergenceUnresolved(_)));
        assert!(!error.is_retryable());
        assert_eq!(CallCounters::get(&runner.counters.recover), 1);
        assert_eq!(CallCounters::get(&runner.counters.open_stream), 0);
        assert_eq!(CallCounters::get(&runner.counters.schema_replaced), 0);
    }

    #[tokio::test]
    async fn recover_without_dump_test() {
        let mut runner = RestarterTestRunner::new();
        runner.state = Some(RestarterTestRunner::state(EventType::DataEvent, 1100, false));

        let handle = runner.restart().await.unwrap();
        assert_eq!(handle.start(), &binlog_start(1200));
        assert_eq!(CallCounters::get(&runner.counters.recover), 1);

        let mut diverged = RestarterTestRunner::new();
        diverged.state = Some(RestarterTestRunner::state(EventType::DataEvent, 1100, false));
        diverged.live = RestarterTestRunner::snapshot("id int, f_1 int");

        let err = diverged.restart().await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::RecoveryDivergenceUnresolved(_))
        ));
        assert_eq!(CallCounters::get(&diverged.counters.open_stream), 0);
    }

    #[tokio::test]
    async fn recover_skips_published_events_test() {
        let mut runner = RestarterTestRunner::new();
        runner.state = Some(RestarterTestRunner::state(EventType::DataEvent, 1100, false));
        runner.cached = RestarterTestRunner::snapshot("id int, f_1 int");
        runner.live = RestarterTestRunner::snapshot("id int, f_1 int");
        runner.last_published = Some(RestarterTestRunner::position(1300));

        let mut handle = runner.restart().await.unwrap();
        assert_eq!(handle.start(), &binlog_start(1400));
        let event = handle.next().await.unwrap();
        assert!(matches!(event.kind, BinlogEventKind::Commit { xid: 2 }));
        assert_eq!(CallCounters::get(&runner.counters.published_query), 1);
        assert_eq!(CallCounters::get(&runner.counters.validate_position), 1);
    }

    #[tokio::test]
    async fn recover_schema_checkpoint_with_newer_dump_test() {
        // the schema event at 1200 was recorded, a later one dumped at 1400 was not
        let mut runner = RestarterTestRunner::new();
        runner.state = Some(RestarterTestRunner::state(EventType::SchemaEvent, 1200, false));
        runner.dump = Some(RestarterTestRunner::dump_at(
            1400,
            RestarterTestRunner::snapshot("id int, f_1 int"),
        ));
        runner.cached = RestarterTestRunner::snapshot("id int, f_1 int, f_2 int");

        let mut handle = runner.restart().await.unwrap();
        assert_eq!(handle.start(), &binlog_start(1300));
        let event = handle.next().await.unwrap();
        assert!(matches!(event.kind, BinlogEventKind::Rows { .. }));
        assert_eq!(event.position, RestarterTestRunner::position(1300));
        assert_eq!(
            runner.cached_snapshot(),
            RestarterTestRunner::snapshot("id int, f_1 int")
        );

        let counters = &runner.counters;
        assert_eq!(CallCounters::get(&counters.find_position), 1);
        assert_eq!(CallCounters::get(&counters.recover), 1);
        assert_eq!(CallCounters::get(&counters.validate_position), 1);
    }

    #[tokio::test]
    async fn recover_override_beyond_log_end_test() {
        let mut runner = RestarterTestRunner::new();
        runner.state = Some(RestarterTestRunner::state(EventType::DataEvent, 1100, false));
        // the binlog file holds 10000 bytes
        runner.last_published = Some(RestarterTestRunner::position(20_000));

        let err = runner.restart().await.err().unwrap();
        let error = err.downcast_ref::<Error>().unwrap();
        assert!(matches!(error, Error::PositionUnresolvable(_)));
        assert!(!error.is_retryable());

        let counters = &runner.counters;
        assert_eq!(CallCounters::get(&counters.recover), 1);
        assert_eq!(CallCounters::get(&counters.validate_position), 1);
        assert_eq!(CallCounters::get(&counters.open_stream), 0);
        assert!(runner.opened().is_empty());
    }
}
