use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{anyhow, bail};

use super::{
    position_finder::PositionFinder,
    recovery_handler::{RecoveryHandler, RecoveryResult},
    resume_coordinate::ResumeCoordinate,
    stream_handle::StreamHandle,
};
use crate::{
    dump::DumpAvailabilityChecker,
    extractor::{binlog_inventory::BinlogInventory, StreamReaderFactory},
    resumer::state_store::GlobalStateStore,
    Sinker,
};
use rh_common::{
    config::recovery_config::BootstrapConfig,
    error::Error,
    log_info, log_warn,
    meta::global_event_state::{EventType, PersistedStreamState},
};

#[derive(Clone, Debug)]
pub struct RestarterOptions {
    pub suppress_side_effects: bool,
    pub bootstrap: BootstrapConfig,
    pub gtid_enabled: bool,
    pub collaborator_timeout: Duration,
}

#[derive(Debug)]
struct RecoveryContext {
    dump_exists: bool,
    recovery: Option<RecoveryResult>,
    resume_coordinate: ResumeCoordinate,
}

/// Decides where a restarted tailer resumes and whether the schema cache has
/// to be recovered first, then opens the stream there.
pub struct ReplicationStreamRestarter {
    state_store: Arc<dyn GlobalStateStore + Send + Sync>,
    dump_checker: Arc<dyn DumpAvailabilityChecker + Send + Sync>,
    position_finder: Arc<dyn PositionFinder + Send + Sync>,
    recovery_handler: Box<dyn RecoveryHandler + Send>,
    inventory: Arc<dyn BinlogInventory + Send + Sync>,
    stream_factory: Arc<dyn StreamReaderFactory + Send + Sync>,
    options: RestarterOptions,
}

impl ReplicationStreamRestarter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state_store: Arc<dyn GlobalStateStore + Send + Sync>,
        dump_checker: Arc<dyn DumpAvailabilityChecker + Send + Sync>,
        position_finder: Arc<dyn PositionFinder + Send + Sync>,
        recovery_handler: Box<dyn RecoveryHandler + Send>,
        inventory: Arc<dyn BinlogInventory + Send + Sync>,
        stream_factory: Arc<dyn StreamReaderFactory + Send + Sync>,
        options: RestarterOptions,
    ) -> Self {
        Self {
            state_store,
            dump_checker,
            position_finder,
            recovery_handler,
            inventory,
            stream_factory,
            options,
        }
    }

    /// Returns a handle positioned so that no event is skipped and none is
    /// re-applied against the wrong schema. No handle is returned on any failure.
    pub async fn restart(&mut self, sinker: Box<dyn Sinker + Send>) -> anyhow::Result<StreamHandle> {
        let timeout = self.options.collaborator_timeout;

        let state = match with_timeout(timeout, "load stream state", self.state_store.get()).await? {
            Some(state) => state,
            None => self.bootstrap().await?,
        };
        log_info!("restarting from stream state: {}", state);

        let dump_exists =
            with_timeout(timeout, "check dump", self.dump_checker.dump_exists()).await?;
        if state.is_clean_shutdown && dump_exists {
            log_warn!("schema dump found after a clean shutdown, it is ignored");
        }

        let resume_coordinate = with_timeout(
            timeout,
            "find resume position",
            self.position_finder
                .get_position_to_resume_tailing_from(&state, dump_exists),
        )
        .await?;

        let mut context = RecoveryContext {
            dump_exists,
            recovery: None,
            resume_coordinate,
        };

        if !state.is_clean_shutdown {
            let published = with_timeout(
                timeout,
                "query published position",
                sinker.last_published_position(),
            )
            .await?;
            let recovery = with_timeout(
                timeout,
                "recover schema",
                self.recovery_handler
                    .recover(&state, context.dump_exists, published),
            )
            .await?;
            if let Some(resume_override) = &recovery.resume_override {
                context.resume_coordinate = resume_override.clone();
            }
            context.recovery = Some(recovery);
        }
        log_info!("recovery context: {:?}", context);

        let start = context.resume_coordinate.resolve(&state.position)?;
        let overridden = context
            .recovery
            .as_ref()
            .is_some_and(|recovery| recovery.resume_override.is_some());
        if overridden {
            // the finder only checked its own coordinate
            with_timeout(
                timeout,
                "validate resume position",
                self.position_finder.validate(&start),
            )
            .await?;
        }
        let reader = with_timeout(timeout, "open stream", self.stream_factory.open(&start)).await?;
        log_info!("stream restarted at [{}]", start);

        Ok(StreamHandle::new(
            reader,
            sinker,
            start,
            self.options.suppress_side_effects,
        ))
    }

    async fn bootstrap(&self) -> anyhow::Result<PersistedStreamState> {
        let position = match &self.options.bootstrap {
            BootstrapConfig::Disabled => bail!(Error::StateUnavailable),
            BootstrapConfig::FromConfig { position } => position.clone(),
            BootstrapConfig::FromSource => {
                with_timeout(
                    self.options.collaborator_timeout,
                    "query source position",
                    self.inventory.current_position(self.options.gtid_enabled),
                )
                .await?
            }
        };
        log_warn!(
            "no persisted stream state, bootstrapping from position: {}",
            position
        );
        Ok(PersistedStreamState::new(EventType::DataEvent, position, true))
    }
}

/// Runs a collaborator call under the deadline. Errors already classified
/// pass through, anything else surfaces as a dependency failure.
async fn with_timeout<T, F>(timeout: Duration, operation: &str, future: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => match err.downcast_ref::<Error>() {
            Some(
                Error::StateUnavailable
                | Error::PositionUnresolvable(_)
                | Error::RecoveryDivergenceUnresolved(_)
                | Error::DependencyFailure(_)
                | Error::ConfigError(_),
            ) => Err(err),
            _ => Err(anyhow!(Error::DependencyFailure(format!(
                "{} failed: {:#}",
                operation, err
            )))),
        },
        Err(_) => bail!(Error::DependencyFailure(format!(
            "{} timed out after {:?}",
            operation, timeout
        ))),
    }
}
