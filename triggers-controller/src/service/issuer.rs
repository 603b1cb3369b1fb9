//! BuildRun issuer

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use triggers_core::constants::{KIND_CUSTOM_RUN, KIND_PIPELINE_RUN, KIND_RUN};
use triggers_core::domain::build_run::BuildRun;
use triggers_core::domain::meta::{NamespacedName, OwnerReference};
use triggers_filter::TriggerKeys;
use uuid::Uuid;

use crate::error::StoreError;
use crate::repository::ObjectStore;

/// Service trait for issuing BuildRuns
#[async_trait]
pub trait BuildRunIssuer: Send + Sync {
    /// Issues a BuildRun for `build`, owned by `owner`
    ///
    /// # Returns
    /// The identity of the created BuildRun
    async fn issue(
        &self,
        build: &NamespacedName,
        owner: &OwnerReference,
    ) -> Result<NamespacedName, StoreError>;
}

/// Issues BuildRuns by creating them in the object store
///
/// The build engine picks the created objects up from there.
pub struct StoreBuildRunIssuer {
    keys: TriggerKeys,
    store: Arc<dyn ObjectStore>,
}

impl StoreBuildRunIssuer {
    pub fn new(keys: TriggerKeys, store: Arc<dyn ObjectStore>) -> Self {
        Self { keys, store }
    }

    /// Generated BuildRun name, the Build name plus a random suffix
    fn generate_name(build: &NamespacedName) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", build.name, &suffix[..5])
    }

    fn build_run_for(&self, build: &NamespacedName, owner: &OwnerReference) -> BuildRun {
        let mut build_run = BuildRun::new(
            build.namespace.clone(),
            Self::generate_name(build),
            &build.name,
        )
        .with_owner(owner.clone());

        match owner.kind.as_str() {
            KIND_PIPELINE_RUN => {
                build_run
                    .metadata
                    .labels
                    .insert(self.keys.owned_by_pipelinerun.clone(), owner.name.clone());
            }
            KIND_RUN | KIND_CUSTOM_RUN => {
                build_run
                    .metadata
                    .annotations
                    .insert(self.keys.owned_by_run.clone(), owner.name.clone());
            }
            _ => {}
        }

        build_run
    }
}

#[async_trait]
impl BuildRunIssuer for StoreBuildRunIssuer {
    async fn issue(
        &self,
        build: &NamespacedName,
        owner: &OwnerReference,
    ) -> Result<NamespacedName, StoreError> {
        let build_run = self.build_run_for(build, owner);
        let created = self.store.create_build_run(build_run).await?;

        info!(
            "BuildRun {} issued for Build {} (owner {} {})",
            created.metadata.name, build, owner.kind, owner.name
        );

        Ok(created.namespaced_name())
    }
}
