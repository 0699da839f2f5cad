#[cfg(test)]
mod test {
    use crate::test_runner::{
        fakes::CallCounters,
        restarter_test_runner::{RestarterTestRunner, BINLOG_FILENAME},
    };
    use rh_common::{
        config::recovery_config::BootstrapConfig, error::Error, meta::position::Position,
    };
    use rh_connector::restarter::resume_coordinate::StreamStart;

    fn fresh_position() -> Position {
        Position::MysqlBinlog {
            binlog_filename: BINLOG_FILENAME.into(),
            binlog_position: 1000,
            next_event_position: 1000,
        }
    }

    #[tokio::test]
    async fn bootstrap_disabled_test() {
        let mut runner = RestarterTestRunner::new();

        let err = runner.restart().await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::StateUnavailable)
        ));
        assert_eq!(CallCounters::get(&runner.counters.state_store_get), 1);
        assert_eq!(CallCounters::get(&runner.counters.find_position), 0);
        assert_eq!(CallCounters::get(&runner.counters.open_stream), 0);
    }

    #[tokio::test]
    async fn bootstrap_from_config_test() {
        let mut runner = RestarterTestRunner::new();
        runner.options.bootstrap = BootstrapConfig::FromConfig {
            position: fresh_position(),
        };

        let mut handle = runner.restart().await.unwrap();
        // the configured position is used verbatim
        assert_eq!(
            handle.start(),
            &StreamStart::Binlog {
                binlog_filename: BINLOG_FILENAME.into(),
                binlog_position: 1000,
            }
        );
        let event = handle.next().await.unwrap();
        assert_eq!(event.position, RestarterTestRunner::position(1000));
        assert_eq!(CallCounters::get(&runner.counters.recover), 0);
        assert_eq!(CallCounters::get(&runner.counters.current_position), 0);
    }

    #[tokio::test]
    async fn bootstrap_from_source_test() {
        let mut runner = RestarterTestRunner::new();
        runner.options.bootstrap = BootstrapConfig::FromSource;
        runner.current_position = fresh_position();

        let handle = runner.restart().await.unwrap();
        assert_eq!(
            handle.start(),
            &StreamStart::Binlog {
                binlog_filename: BINLOG_FILENAME.into(),
                binlog_position: 1000,
            }
        );
        assert_eq!(CallCounters::get(&runner.counters.current_position), 1);
        assert_eq!(CallCounters::get(&runner.counters.find_position), 1);
    }
}
