//! Object store trait

use async_trait::async_trait;
use triggers_core::domain::build_run::BuildRun;
use triggers_core::domain::custom_run::{CustomRun, CustomRunStatus};
use triggers_core::domain::meta::NamespacedName;
use triggers_core::domain::pipeline_run::PipelineRun;

use crate::error::StoreError;

/// Repository trait for the objects the triggers read and write
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches a PipelineRun
    async fn get_pipeline_run(&self, key: &NamespacedName) -> Result<PipelineRun, StoreError>;

    /// Replaces a PipelineRun
    ///
    /// Fails with `StoreError::Conflict` when the stored resource version no
    /// longer matches `pipeline_run.metadata.resource_version`. Returns the
    /// stored object with its new version.
    async fn update_pipeline_run(
        &self,
        pipeline_run: &PipelineRun,
    ) -> Result<PipelineRun, StoreError>;

    /// Fetches a CustomRun
    async fn get_custom_run(&self, key: &NamespacedName) -> Result<CustomRun, StoreError>;

    /// Merge-patches the status of a CustomRun
    async fn patch_custom_run_status(
        &self,
        key: &NamespacedName,
        status: CustomRunStatus,
    ) -> Result<CustomRun, StoreError>;

    /// Fetches a BuildRun
    async fn get_build_run(&self, key: &NamespacedName) -> Result<BuildRun, StoreError>;

    /// Creates a BuildRun
    async fn create_build_run(&self, build_run: BuildRun) -> Result<BuildRun, StoreError>;
}
