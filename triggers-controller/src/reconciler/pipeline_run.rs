//! PipelineRun reconciler

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use triggers_core::constants::{KIND_PIPELINE_RUN, TEKTON_API_V1BETA1};
use triggers_core::domain::meta::{NamespacedName, OwnerReference};
use triggers_core::domain::pipeline_run::PipelineRun;
use triggers_core::dto::triggered_build::TriggeredBuild;
use triggers_filter::{
    TriggerKeys, annotate_pipeline_run_name, append_issued_build_runs_label, is_eligible,
    pipeline_run_annotated_name_matches, pipeline_run_to_object_ref, record_triggered_builds,
    triggered_builds,
};

use super::ReconcileOutcome;
use crate::error::ReconcileError;
use crate::repository::ObjectStore;
use crate::service::{BuildInventory, BuildRunIssuer};

/// Triggers Builds from PipelineRun status changes
pub struct PipelineRunReconciler {
    keys: TriggerKeys,
    store: Arc<dyn ObjectStore>,
    inventory: Arc<dyn BuildInventory>,
    issuer: Arc<dyn BuildRunIssuer>,
    max_conflict_retries: u32,
}

impl PipelineRunReconciler {
    pub fn new(
        keys: TriggerKeys,
        store: Arc<dyn ObjectStore>,
        inventory: Arc<dyn BuildInventory>,
        issuer: Arc<dyn BuildRunIssuer>,
        max_conflict_retries: u32,
    ) -> Self {
        Self {
            keys,
            store,
            inventory,
            issuer,
            max_conflict_retries,
        }
    }

    /// Reconciles the PipelineRun `key` as of `now`
    ///
    /// Builds already in the triggered builds ledger for the current status are
    /// not issued again. When the update conflicts the pass is redone on a
    /// fresh copy, carrying over the BuildRuns issued so far.
    pub async fn reconcile(
        &self,
        key: &NamespacedName,
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let mut issued: Vec<(TriggeredBuild, NamespacedName)> = Vec::new();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let mut pipeline_run = match self.store.get_pipeline_run(key).await {
                Ok(pipeline_run) => pipeline_run,
                Err(e) if e.is_not_found() => {
                    debug!("PipelineRun {} is gone", key);
                    return Ok(ReconcileOutcome::Skipped);
                }
                Err(e) => return Err(e.into()),
            };

            if !is_eligible(&self.keys, &pipeline_run) {
                if !issued.is_empty() {
                    warn!(
                        "PipelineRun {} became ineligible with {} unrecorded BuildRun(s)",
                        key,
                        issued.len()
                    );
                }
                return Ok(ReconcileOutcome::Skipped);
            }

            let object_ref = pipeline_run_to_object_ref(&self.keys, now, &pipeline_run)?;
            let ledger = self.ledger(&mut pipeline_run)?;

            let builds = self
                .inventory
                .search_for_object_ref(&key.namespace, &object_ref)
                .await?;
            let pending: Vec<TriggeredBuild> = builds
                .iter()
                .map(|build| TriggeredBuild::new(build.name.clone(), object_ref.clone()))
                .filter(|entry| !ledger.iter().any(|recorded| recorded.is_same_trigger(entry)))
                .filter(|entry| !issued.iter().any(|(done, _)| done.is_same_trigger(entry)))
                .collect();

            let mut issue_error = None;
            let owner =
                OwnerReference::new(TEKTON_API_V1BETA1, KIND_PIPELINE_RUN, key.name.clone());
            for entry in pending {
                let build = NamespacedName::new(key.namespace.clone(), entry.build_name.clone());
                match self.issuer.issue(&build, &owner).await {
                    Ok(build_run) => issued.push((entry, build_run)),
                    Err(e) => {
                        error!("Failed to issue BuildRun for Build {}: {}", build, e);
                        issue_error = Some(e);
                        break;
                    }
                }
            }

            if issued.is_empty() {
                if let Some(e) = issue_error {
                    return Err(e.into());
                }
                debug!("PipelineRun {} is up to date ({})", key, object_ref.status.join(","));
                return Ok(ReconcileOutcome::UpToDate);
            }

            // Nothing issued so far is persisted yet, including BuildRuns whose
            // Build a concurrent writer recorded in the meantime.
            for (entry, build_run) in &issued {
                if ledger.iter().any(|recorded| recorded.is_same_trigger(entry)) {
                    warn!(
                        "BuildRun {} duplicates Build {} recorded concurrently on {}",
                        build_run, entry.build_name, key
                    );
                }
            }

            let entries: Vec<TriggeredBuild> = issued.iter().map(|(e, _)| e.clone()).collect();
            let build_runs: Vec<NamespacedName> =
                issued.iter().map(|(_, br)| br.clone()).collect();
            let names: Vec<String> = build_runs.iter().map(|br| br.name.clone()).collect();

            append_issued_build_runs_label(&self.keys, &mut pipeline_run, &names);
            record_triggered_builds(&self.keys, &mut pipeline_run, &entries)?;
            annotate_pipeline_run_name(&self.keys, &mut pipeline_run);

            match self.store.update_pipeline_run(&pipeline_run).await {
                Ok(_) => {
                    if let Some(e) = issue_error {
                        return Err(e.into());
                    }
                    info!(
                        "PipelineRun {} ({}) triggered {} BuildRun(s): {}",
                        key,
                        object_ref.status.join(","),
                        names.len(),
                        names.join(",")
                    );
                    return Ok(ReconcileOutcome::Triggered(build_runs));
                }
                Err(e) if e.is_conflict() => {
                    if let Some(issue_error) = issue_error {
                        warn!("Discarding issue error after conflict: {}", issue_error);
                    }
                    if attempt > self.max_conflict_retries {
                        error!("Giving up on PipelineRun {} after {} attempts", key, attempt);
                        return Err(ReconcileError::ConflictRetriesExhausted {
                            key: key.clone(),
                            attempts: attempt,
                        });
                    }
                    warn!(
                        "Conflict updating PipelineRun {} (attempt {}/{}), retrying",
                        key,
                        attempt,
                        self.max_conflict_retries + 1
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Triggered builds ledger of the PipelineRun
    ///
    /// A ledger whose name annotation does not match was copied along with the
    /// metadata of another PipelineRun; it is dropped and starts over empty.
    fn ledger(
        &self,
        pipeline_run: &mut PipelineRun,
    ) -> Result<Vec<TriggeredBuild>, ReconcileError> {
        if pipeline_run_annotated_name_matches(&self.keys, pipeline_run) {
            return Ok(triggered_builds(&self.keys, pipeline_run)?);
        }

        if pipeline_run
            .metadata
            .annotations
            .remove(&self.keys.triggered_builds)
            .is_some()
        {
            info!(
                "Discarding triggered builds copied onto PipelineRun {}",
                pipeline_run.namespaced_name()
            );
        }
        Ok(Vec::new())
    }
}
