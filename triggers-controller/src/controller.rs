//! Event-driven controller
//!
//! Routes watch events to the reconcilers. Each reconciliation runs in its own
//! task; a semaphore bounds how many run at the same time, and an object is
//! never reconciled by two tasks at once.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use triggers_core::domain::meta::NamespacedName;
use triggers_core::domain::object::Object;
use triggers_filter::{
    TriggerKeys, build_run_owned_by_run, event_filter_predicate, search_build_run_for_run_owner,
};

use crate::config::Config;
use crate::reconciler::{CustomRunReconciler, PipelineRunReconciler, ReconcileOutcome};
use crate::repository::ObjectStore;
use crate::service::{BuildInventory, BuildRunIssuer};

/// A unit of reconciliation work
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Work {
    PipelineRun(NamespacedName),
    CustomRun(NamespacedName),
}

impl Work {
    fn key(&self) -> &NamespacedName {
        match self {
            Work::PipelineRun(key) | Work::CustomRun(key) => key,
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    in_flight: HashSet<Work>,
    dirty: HashSet<Work>,
}

/// Work being reconciled, and work that changed again in the meantime
#[derive(Debug, Default)]
struct WorkQueue {
    state: Mutex<QueueState>,
}

impl WorkQueue {
    /// Claims `work` for a new task
    ///
    /// Returns false when a task already holds it; that task then runs one
    /// more pass once the current one is over.
    fn claim(&self, work: &Work) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.in_flight.contains(work) {
            state.dirty.insert(work.clone());
            return false;
        }
        state.in_flight.insert(work.clone());
        true
    }

    /// Ends a pass over `work`, true when another pass is due
    fn finish(&self, work: &Work) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.dirty.remove(work) {
            return true;
        }
        state.in_flight.remove(work);
        false
    }
}

/// Controller dispatching watch events to reconcilers
pub struct Controller {
    keys: TriggerKeys,
    pipeline_runs: Arc<PipelineRunReconciler>,
    custom_runs: Arc<CustomRunReconciler>,
    semaphore: Arc<Semaphore>,
    queue: Arc<WorkQueue>,
}

impl Controller {
    /// Creates a new controller from a validated configuration
    pub fn new(
        config: &Config,
        store: Arc<dyn ObjectStore>,
        inventory: Arc<dyn BuildInventory>,
        issuer: Arc<dyn BuildRunIssuer>,
    ) -> Result<Self> {
        config.validate().context("Invalid controller configuration")?;

        let keys = config.keys();
        let pipeline_runs = PipelineRunReconciler::new(
            keys.clone(),
            Arc::clone(&store),
            inventory,
            Arc::clone(&issuer),
            config.max_conflict_retries,
        );
        let custom_runs = CustomRunReconciler::new(keys.clone(), store, issuer);

        Ok(Self {
            keys,
            pipeline_runs: Arc::new(pipeline_runs),
            custom_runs: Arc::new(custom_runs),
            semaphore: Arc::new(Semaphore::new(config.max_parallel_reconciles)),
            queue: Arc::new(WorkQueue::default()),
        })
    }

    /// Creates the event channel sized after the configuration
    pub fn channel(config: &Config) -> (mpsc::Sender<Object>, mpsc::Receiver<Object>) {
        mpsc::channel(config.event_buffer)
    }

    /// Consumes events until the channel closes
    ///
    /// # Returns
    /// The number of reconciliation passes performed
    pub async fn run(&self, mut events: mpsc::Receiver<Object>) -> Result<usize> {
        info!("Starting triggers controller");

        let reconciles = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        while let Some(obj) = events.recv().await {
            while let Some(result) = tasks.try_join_next() {
                log_join_result(result);
            }

            let Some(work) = self.route(&obj) else {
                continue;
            };

            if !self.queue.claim(&work) {
                debug!("{} is being reconciled, queued another pass", work.key());
                continue;
            }

            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .context("Reconcile semaphore closed")?;
            self.spawn_work(&mut tasks, work, permit, Arc::clone(&reconciles));
        }

        while let Some(result) = tasks.join_next().await {
            log_join_result(result);
        }

        let reconciles = reconciles.load(Ordering::SeqCst);
        info!("Event channel closed after {} reconcile(s)", reconciles);
        Ok(reconciles)
    }

    /// Maps an event to the object that needs reconciling
    fn route(&self, obj: &Object) -> Option<Work> {
        match obj {
            Object::PipelineRun(pipeline_run) => event_filter_predicate(&self.keys, obj)
                .then(|| Work::PipelineRun(pipeline_run.namespaced_name())),
            Object::CustomRun(custom_run) => Some(Work::CustomRun(custom_run.namespaced_name())),
            Object::BuildRun(build_run) => {
                if !build_run_owned_by_run(&self.keys, obj) {
                    debug!(
                        "Ignoring BuildRun {} not owned by a Tekton Run",
                        build_run.namespaced_name()
                    );
                    return None;
                }
                search_build_run_for_run_owner(&self.keys, build_run).map(Work::CustomRun)
            }
        }
    }

    /// Spawns a task reconciling a single object until it stops changing
    fn spawn_work(
        &self,
        tasks: &mut JoinSet<()>,
        work: Work,
        permit: OwnedSemaphorePermit,
        reconciles: Arc<AtomicUsize>,
    ) {
        let pipeline_runs = Arc::clone(&self.pipeline_runs);
        let custom_runs = Arc::clone(&self.custom_runs);
        let queue = Arc::clone(&self.queue);

        tasks.spawn(async move {
            // Held until the last pass is over
            let _permit = permit;

            loop {
                reconcile_once(&pipeline_runs, &custom_runs, &work).await;
                reconciles.fetch_add(1, Ordering::SeqCst);

                if !queue.finish(&work) {
                    break;
                }
                debug!("{} changed while reconciling, running again", work.key());
            }
        });
    }
}

async fn reconcile_once(
    pipeline_runs: &PipelineRunReconciler,
    custom_runs: &CustomRunReconciler,
    work: &Work,
) {
    let result = match work {
        Work::PipelineRun(key) => pipeline_runs.reconcile(key, chrono::Utc::now()).await,
        Work::CustomRun(key) => custom_runs.reconcile(key).await,
    };

    match result {
        Ok(ReconcileOutcome::Triggered(build_runs)) => {
            debug!("Reconciled {}: {} BuildRun(s) issued", work.key(), build_runs.len())
        }
        Ok(outcome) => debug!("Reconciled {}: {:?}", work.key(), outcome),
        Err(e) => error!("Failed to reconcile {}: {}", work.key(), e),
    }
}

fn log_join_result(result: std::result::Result<(), JoinError>) {
    if let Err(e) = result {
        warn!("Reconcile task panicked: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::repository::InMemoryStore;
    use crate::service::{BuildTrigger, InMemoryInventory, StoreBuildRunIssuer};
    use async_trait::async_trait;
    use std::time::Duration;
    use triggers_core::constants::TEKTON_API_V1ALPHA1;
    use triggers_core::domain::build_run::BuildRun;
    use triggers_core::domain::custom_run::CustomRun;
    use triggers_core::domain::meta::OwnerReference;
    use triggers_core::domain::pipeline_run::{PipelineRun, PipelineSpec, TaskRef};
    use triggers_core::dto::object_ref::ObjectRef;
    use triggers_filter::{decode_extra_fields, issued_build_runs, triggered_builds};

    /// Issuer that takes its time and records how many issues overlap
    struct SlowIssuer {
        inner: StoreBuildRunIssuer,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowIssuer {
        fn new(config: &Config, store: Arc<InMemoryStore>) -> Self {
            Self {
                inner: StoreBuildRunIssuer::new(config.keys(), store),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BuildRunIssuer for SlowIssuer {
        async fn issue(
            &self,
            build: &NamespacedName,
            owner: &OwnerReference,
        ) -> std::result::Result<NamespacedName, StoreError> {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            let result = self.inner.issue(build, owner).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn controller(store: Arc<InMemoryStore>, inventory: Arc<InMemoryInventory>) -> Controller {
        let config = Config::default();
        let issuer = Arc::new(StoreBuildRunIssuer::new(config.keys(), store.clone()));
        Controller::new(&config, store, inventory, issuer).unwrap()
    }

    fn succeeded_pipeline_run(name: &str) -> PipelineRun {
        let mut pr = PipelineRun::new("default", name, "pipeline");
        pr.mark_succeeded("Succeeded", "done");
        pr.status.pipeline_spec = Some(PipelineSpec::default());
        pr
    }

    fn successful_trigger() -> BuildTrigger {
        BuildTrigger {
            build: NamespacedName::new("default", "build"),
            when: vec![ObjectRef {
                name: "pipeline".to_string(),
                status: vec!["Successful".to_string()],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_route_events() {
        let controller = controller(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryInventory::new()),
        );

        let pr = succeeded_pipeline_run("run-1");
        assert_eq!(
            controller.route(&Object::PipelineRun(pr.clone())),
            Some(Work::PipelineRun(pr.namespaced_name()))
        );

        let mut ineligible = pr;
        ineligible.spec.pipeline_ref = None;
        assert_eq!(controller.route(&Object::PipelineRun(ineligible)), None);

        let owned = BuildRun::new("default", "br", "build").with_owner(OwnerReference::new(
            TEKTON_API_V1ALPHA1,
            "Run",
            "custom-run",
        ));
        assert_eq!(
            controller.route(&Object::BuildRun(owned)),
            Some(Work::CustomRun(NamespacedName::new("default", "custom-run")))
        );
        assert_eq!(
            controller.route(&Object::BuildRun(BuildRun::new("default", "br", "build"))),
            None
        );
    }

    #[test]
    fn test_work_queue_reruns_dirty_work() {
        let queue = WorkQueue::default();
        let work = Work::PipelineRun(NamespacedName::new("default", "run-1"));
        let other = Work::CustomRun(NamespacedName::new("default", "run-1"));

        assert!(queue.claim(&work));
        assert!(queue.claim(&other));
        assert!(!queue.claim(&work));
        assert!(!queue.claim(&work));

        // both duplicates fold into a single extra pass
        assert!(queue.finish(&work));
        assert!(!queue.finish(&work));
        assert!(queue.claim(&work));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let store = Arc::new(InMemoryStore::new());
        let mut config = Config::default();
        config.max_parallel_reconciles = 0;
        let issuer = Arc::new(StoreBuildRunIssuer::new(config.keys(), store.clone()));

        let result = Controller::new(&config, store, Arc::new(InMemoryInventory::new()), issuer);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_until_channel_closes() {
        let store = Arc::new(InMemoryStore::new());
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.add(successful_trigger());
        let controller = controller(store.clone(), inventory);

        let pr = store.insert_pipeline_run(succeeded_pipeline_run("run-1")).await;
        let mut custom_run = CustomRun::new(
            "default",
            "custom-run",
            TaskRef {
                api_version: "shipwright.io/v1alpha1".to_string(),
                kind: "Build".to_string(),
                name: "build".to_string(),
            },
        );
        custom_run.status.start_time = Some(chrono::Utc::now());
        let custom_run = store.insert_custom_run(custom_run).await;

        let (tx, rx) = Controller::channel(&Config::default());
        tx.send(Object::PipelineRun(pr)).await.unwrap();
        tx.send(Object::CustomRun(custom_run.clone())).await.unwrap();
        drop(tx);

        let reconciles = controller.run(rx).await.unwrap();
        assert_eq!(reconciles, 2);

        let build_runs = store.list_build_runs().await;
        assert_eq!(build_runs.len(), 2);

        let stored = store.get_custom_run(&custom_run.namespaced_name()).await.unwrap();
        assert!(decode_extra_fields(&stored.status).is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_events_issue_once() {
        let config = Config::default();
        let store = Arc::new(InMemoryStore::new());
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.add(successful_trigger());
        let issuer = Arc::new(SlowIssuer::new(&config, store.clone()));
        let controller =
            Controller::new(&config, store.clone(), inventory, issuer.clone()).unwrap();

        let pr = store.insert_pipeline_run(succeeded_pipeline_run("run-1")).await;
        let (tx, rx) = Controller::channel(&config);
        for _ in 0..3 {
            tx.send(Object::PipelineRun(pr.clone())).await.unwrap();
        }
        drop(tx);

        let reconciles = controller.run(rx).await.unwrap();
        assert!(reconciles >= 2);
        assert_eq!(issuer.peak.load(Ordering::SeqCst), 1);
        assert_eq!(store.list_build_runs().await.len(), 1);

        let keys = config.keys();
        let stored = store.get_pipeline_run(&pr.namespaced_name()).await.unwrap();
        assert_eq!(issued_build_runs(&keys, &stored).len(), 1);
        assert_eq!(triggered_builds(&keys, &stored).unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_reconciles_are_bounded() {
        let mut config = Config::default();
        config.max_parallel_reconciles = 1;
        let store = Arc::new(InMemoryStore::new());
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.add(successful_trigger());
        let issuer = Arc::new(SlowIssuer::new(&config, store.clone()));
        let controller =
            Controller::new(&config, store.clone(), inventory, issuer.clone()).unwrap();

        let (tx, rx) = Controller::channel(&config);
        for i in 0..5 {
            let pr = store
                .insert_pipeline_run(succeeded_pipeline_run(&format!("run-{}", i)))
                .await;
            tx.send(Object::PipelineRun(pr)).await.unwrap();
        }
        drop(tx);

        let reconciles = controller.run(rx).await.unwrap();
        assert_eq!(reconciles, 5);
        assert_eq!(issuer.peak.load(Ordering::SeqCst), 1);
        assert_eq!(store.list_build_runs().await.len(), 5);
    }
}
