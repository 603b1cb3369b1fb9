//! CustomRun reconciler
//!
//! A started CustomRun referencing a Shipwright Build gets exactly one
//! BuildRun. The BuildRun identity lands in the CustomRun extra fields, which
//! is also how later passes know the work was done.

use std::sync::Arc;
use tracing::{debug, info, warn};
use triggers_core::constants::{KIND_CUSTOM_RUN, TEKTON_API_V1ALPHA1};
use triggers_core::domain::meta::{NamespacedName, OwnerReference};
use triggers_core::dto::extra_fields::ExtraFields;
use triggers_filter::{
    TriggerKeys, custom_run_references_shipwright, decode_extra_fields, encode_extra_fields,
};

use super::ReconcileOutcome;
use crate::error::ReconcileError;
use crate::repository::ObjectStore;
use crate::service::BuildRunIssuer;

pub struct CustomRunReconciler {
    keys: TriggerKeys,
    store: Arc<dyn ObjectStore>,
    issuer: Arc<dyn BuildRunIssuer>,
}

impl CustomRunReconciler {
    pub fn new(
        keys: TriggerKeys,
        store: Arc<dyn ObjectStore>,
        issuer: Arc<dyn BuildRunIssuer>,
    ) -> Self {
        Self { keys, store, issuer }
    }

    /// Reconciles the CustomRun `key`
    ///
    /// Corrupt extra fields are returned as an error, nothing is issued.
    pub async fn reconcile(
        &self,
        key: &NamespacedName,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let custom_run = match self.store.get_custom_run(key).await {
            Ok(custom_run) => custom_run,
            Err(e) if e.is_not_found() => {
                debug!("CustomRun {} is gone", key);
                return Ok(ReconcileOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(build) = custom_run_references_shipwright(&self.keys, &custom_run) else {
            debug!("CustomRun {} does not reference a Shipwright Build", key);
            return Ok(ReconcileOutcome::Skipped);
        };

        if !custom_run.has_started() {
            debug!("CustomRun {} has not started yet", key);
            return Ok(ReconcileOutcome::Skipped);
        }

        match decode_extra_fields(&custom_run.status) {
            Ok(extra_fields) => {
                debug!(
                    "CustomRun {} already issued BuildRun {}",
                    key,
                    extra_fields.namespaced_name()
                );
                return Ok(ReconcileOutcome::UpToDate);
            }
            Err(e) if e.is_not_populated() => {}
            Err(e) if e.is_corrupt() => {
                warn!("CustomRun {} carries corrupt extra fields: {}", key, e);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }

        let owner = OwnerReference::new(TEKTON_API_V1ALPHA1, KIND_CUSTOM_RUN, key.name.clone());
        let build_run = self.issuer.issue(&build, &owner).await?;

        let mut status = custom_run.status.clone();
        encode_extra_fields(&mut status, &ExtraFields::new(&build_run))?;
        self.store.patch_custom_run_status(key, status).await?;

        info!("CustomRun {} issued BuildRun {}", key, build_run);

        Ok(ReconcileOutcome::Triggered(vec![build_run]))
    }
}
