//! High-level runtime orchestrator.
//!
//! The runtime owns the content catalog, the lifecycle executor and the
//! confirm controller, and exposes a builder-based API for clients to use
//! actions and confirm their records. An arbiter runtime also spawns the
//! [`ArbiterWorker`] that serializes confirms relayed by participants.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use tactics_content::{Content, ContentFactory};
use tactics_core::{ActionError, ActionInstance, ActionRecord, ActorId, ActorSnapshot, RecordId};

use crate::api::{
    ArbiterHandle, DiceRoller, FirstChoicePrompter, Prompter, Result, RuntimeError, SeededRoller,
};
use crate::behavior::BehaviorTable;
use crate::confirm::{Authority, CommitStatus, ConfirmController};
use crate::executor::LifecycleExecutor;
use crate::hooks::HookRegistry;
use crate::repository::{DocumentStore, InMemoryDocumentStore};
use crate::workers::{ArbiterWorker, Command};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Table seed for the default dice roller.
    pub seed: u64,
    pub authority: Authority,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            authority: Authority::Arbiter,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime for one table.
///
/// Design: Runtime owns the executor, controller and arbiter worker.
/// [`ArbiterHandle`] provides a cloneable façade for participants.
pub struct Runtime {
    config: RuntimeConfig,
    content: Arc<Content>,
    executor: LifecycleExecutor,
    controller: ConfirmController,
    store: Arc<dyn DocumentStore>,

    // Arbiter side: handle to our own worker. Participant side: the relay.
    arbiter: Option<ArbiterHandle>,
    arbiter_worker: Option<JoinHandle<()>>,

    nonce: AtomicU64,
    in_flight: Mutex<HashSet<ActorId>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Handle to the arbiter: our own worker on the arbiter, the relay on a participant.
    pub fn arbiter(&self) -> Option<ArbiterHandle> {
        self.arbiter.clone()
    }

    /// Creates a fresh instance of a catalog action for an actor.
    pub fn instance(&self, action: &str, actor: ActorId) -> Result<ActionInstance> {
        let definition = self
            .content
            .actions
            .get(action)
            .ok_or_else(|| RuntimeError::UnknownAction(action.to_owned()))?;
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let instance = ActionInstance::new(definition.clone(), &self.content.tags, actor, nonce)
            .map_err(ActionError::from)?;
        Ok(instance)
    }

    /// Instance with `initialize` and `prepare` run, for showing cost and range.
    pub async fn prepare(&self, action: &str, actor: &ActorSnapshot) -> Result<ActionInstance> {
        let mut instance = self.instance(action, actor.id)?;
        self.prepare_instance(&mut instance, actor).await?;
        Ok(instance)
    }

    /// Re-runs `initialize` and `prepare` on an instance not yet executed.
    pub async fn prepare_instance(
        &self,
        instance: &mut ActionInstance,
        actor: &ActorSnapshot,
    ) -> Result<()> {
        self.executor.prepare(instance, actor).await?;
        Ok(())
    }

    /// Uses a catalog action and stores the unconfirmed record.
    pub async fn use_action(
        &self,
        action: &str,
        actor: &ActorSnapshot,
        targets: &[ActorSnapshot],
    ) -> Result<ActionRecord> {
        let mut instance = self.instance(action, actor.id)?;
        self.execute(&mut instance, actor, targets).await
    }

    /// Runs an already created (and possibly prepared) instance.
    ///
    /// One actor may have only one invocation in flight at a time.
    pub async fn execute(
        &self,
        instance: &mut ActionInstance,
        actor: &ActorSnapshot,
        targets: &[ActorSnapshot],
    ) -> Result<ActionRecord> {
        let _guard = InFlight::claim(&self.in_flight, actor.id)?;

        let record = self.executor.execute(instance, actor, targets).await?;
        self.store.save_record(&record).await?;
        debug!(
            target: "runtime",
            record = %record.id,
            action = %record.action,
            actor = %record.actor,
            "record stored"
        );
        Ok(record)
    }

    pub async fn record(&self, id: &RecordId) -> Result<ActionRecord> {
        self.store
            .load_record(id)
            .await?
            .ok_or_else(|| RuntimeError::RecordNotFound(id.clone()))
    }

    fn require_arbiter(&self) -> Result<()> {
        match self.config.authority {
            Authority::Arbiter => Ok(()),
            Authority::Participant => Err(RuntimeError::NotArbiter),
        }
    }

    /// Confirms (or reverses) a record directly. Arbiter only.
    pub async fn confirm(&self, id: &RecordId, reverse: bool) -> Result<CommitStatus> {
        self.require_arbiter()?;
        self.controller.confirm(id, reverse).await
    }

    /// Counters a record directly. Arbiter only.
    pub async fn negate(&self, id: &RecordId) -> Result<CommitStatus> {
        self.require_arbiter()?;
        self.controller.negate(id).await
    }

    /// Confirms through whichever path this participant has.
    pub async fn request_confirm(&self, id: &RecordId, reverse: bool) -> Result<CommitStatus> {
        match (&self.config.authority, &self.arbiter) {
            (Authority::Arbiter, _) => self.controller.confirm(id, reverse).await,
            (Authority::Participant, Some(relay)) => {
                relay.request_confirm(id.clone(), reverse).await
            }
            (Authority::Participant, None) => Err(RuntimeError::NotArbiter),
        }
    }

    pub async fn request_negate(&self, id: &RecordId) -> Result<CommitStatus> {
        match (&self.config.authority, &self.arbiter) {
            (Authority::Arbiter, _) => self.controller.negate(id).await,
            (Authority::Participant, Some(relay)) => relay.request_negate(id.clone()).await,
            (Authority::Participant, None) => Err(RuntimeError::NotArbiter),
        }
    }

    /// Shutdown the runtime gracefully
    ///
    /// The arbiter worker stops once every cloned handle is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.arbiter);

        if let Some(worker) = self.arbiter_worker {
            worker.await.map_err(RuntimeError::WorkerJoin)?;
        }
        Ok(())
    }
}

/// Marks an actor busy for the lifetime of the guard.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<ActorId>>,
    actor: ActorId,
}

impl<'a> InFlight<'a> {
    fn claim(set: &'a Mutex<HashSet<ActorId>>, actor: ActorId) -> Result<Self> {
        let mut busy = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !busy.insert(actor) {
            return Err(RuntimeError::ActorBusy(actor));
        }
        Ok(Self { set, actor })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut busy = self.set.lock().unwrap_or_else(PoisonError::into_inner);
        busy.remove(&self.actor);
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    content: Option<Content>,
    behaviors: Option<BehaviorTable>,
    talents: Option<HookRegistry>,
    store: Option<Arc<dyn DocumentStore>>,
    roller: Option<Arc<dyn DiceRoller>>,
    prompter: Option<Arc<dyn Prompter>>,
    relay: Option<ArbiterHandle>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            content: None,
            behaviors: None,
            talents: None,
            store: None,
            roller: None,
            prompter: None,
            relay: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn authority(mut self, authority: Authority) -> Self {
        self.config.authority = authority;
        self
    }

    /// Use loaded content instead of the compiled-in catalog.
    pub fn content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Replace the stock tag behaviors.
    pub fn behaviors(mut self, behaviors: BehaviorTable) -> Self {
        self.behaviors = Some(behaviors);
        self
    }

    pub fn talents(mut self, talents: HookRegistry) -> Self {
        self.talents = Some(talents);
        self
    }

    /// Defaults to an empty in-memory store.
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Defaults to a [`SeededRoller`] on the configured seed.
    pub fn roller(mut self, roller: Arc<dyn DiceRoller>) -> Self {
        self.roller = Some(roller);
        self
    }

    /// Defaults to [`FirstChoicePrompter`].
    pub fn prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    /// Arbiter to relay confirms to, for participant runtimes.
    pub fn relay(mut self, relay: ArbiterHandle) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Build the runtime
    ///
    /// An arbiter runtime spawns its worker here, so this must run inside a
    /// tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        let content = match self.content {
            Some(content) => content,
            None => ContentFactory::standard().map_err(RuntimeError::Content)?,
        };
        let behaviors = self.behaviors.unwrap_or_else(BehaviorTable::standard);
        behaviors
            .check_against(&content.tags)
            .map_err(ActionError::from)?;

        let behaviors = Arc::new(behaviors);
        let talents = Arc::new(self.talents.unwrap_or_default());
        let store: Arc<dyn DocumentStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryDocumentStore::new()),
        };
        let roller: Arc<dyn DiceRoller> = match self.roller {
            Some(roller) => roller,
            None => Arc::new(SeededRoller::new(self.config.seed)),
        };
        let prompter: Arc<dyn Prompter> = match self.prompter {
            Some(prompter) => prompter,
            None => Arc::new(FirstChoicePrompter),
        };

        let executor = LifecycleExecutor::new(
            Arc::clone(&behaviors),
            Arc::clone(&talents),
            Arc::new(content.rules.clone()),
            Arc::new(content.defenses.clone()),
            roller,
            prompter,
        );
        let controller = ConfirmController::new(Arc::clone(&store), behaviors, talents);

        let (arbiter, arbiter_worker) = match self.config.authority {
            Authority::Arbiter => {
                let (command_tx, command_rx) =
                    mpsc::channel::<Command>(self.config.command_buffer_size);
                let worker = ArbiterWorker::new(controller.clone(), command_rx);
                let join = tokio::spawn(async move {
                    worker.run().await;
                });
                (Some(ArbiterHandle::new(command_tx)), Some(join))
            }
            Authority::Participant => (self.relay, None),
        };

        info!(
            target: "runtime",
            authority = ?self.config.authority,
            actions = content.actions.len(),
            tags = content.tags.len(),
            "runtime built"
        );

        Ok(Runtime {
            config: self.config,
            content: Arc::new(content),
            executor,
            controller,
            store,
            arbiter,
            arbiter_worker,
            nonce: AtomicU64::new(0),
            in_flight: Mutex::new(HashSet::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_invocation_per_actor() {
        let busy = Mutex::new(HashSet::new());
        let guard = InFlight::claim(&busy, ActorId(1)).unwrap();

        let err = InFlight::claim(&busy, ActorId(1)).err().unwrap();
        assert!(matches!(err, RuntimeError::ActorBusy(ActorId(1))));
        assert!(InFlight::claim(&busy, ActorId(2)).is_ok());

        drop(guard);
        assert!(InFlight::claim(&busy, ActorId(1)).is_ok());
    }

    #[tokio::test]
    async fn participant_cannot_confirm_directly() {
        let runtime = Runtime::builder()
            .authority(Authority::Participant)
            .build()
            .await
            .unwrap();
        let err = runtime
            .confirm(&RecordId::from("r"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::NotArbiter));
    }
}
