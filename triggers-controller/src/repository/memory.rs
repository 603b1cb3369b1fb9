//! In-memory object store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use triggers_core::constants::{KIND_BUILD_RUN, KIND_CUSTOM_RUN, KIND_PIPELINE_RUN};
use triggers_core::domain::build_run::BuildRun;
use triggers_core::domain::custom_run::{CustomRun, CustomRunStatus};
use triggers_core::domain::meta::NamespacedName;
use triggers_core::domain::pipeline_run::PipelineRun;

use super::store::ObjectStore;
use crate::error::StoreError;

/// In-memory implementation of ObjectStore
///
/// Every write bumps the object's resource version, PipelineRun updates are
/// version-checked.
#[derive(Default)]
pub struct InMemoryStore {
    pipeline_runs: RwLock<HashMap<NamespacedName, PipelineRun>>,
    custom_runs: RwLock<HashMap<NamespacedName, CustomRun>>,
    build_runs: RwLock<HashMap<NamespacedName, BuildRun>>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a PipelineRun without version check
    pub async fn insert_pipeline_run(&self, mut pipeline_run: PipelineRun) -> PipelineRun {
        let mut pipeline_runs = self.pipeline_runs.write().await;
        let key = pipeline_run.namespaced_name();
        let version = pipeline_runs
            .get(&key)
            .map(|existing| existing.metadata.resource_version)
            .unwrap_or(0);
        pipeline_run.metadata.resource_version = version + 1;
        pipeline_runs.insert(key, pipeline_run.clone());
        pipeline_run
    }

    /// Inserts or replaces a CustomRun
    pub async fn insert_custom_run(&self, mut custom_run: CustomRun) -> CustomRun {
        let mut custom_runs = self.custom_runs.write().await;
        custom_run.metadata.resource_version += 1;
        custom_runs.insert(custom_run.namespaced_name(), custom_run.clone());
        custom_run
    }

    /// Lists the stored BuildRuns
    pub async fn list_build_runs(&self) -> Vec<BuildRun> {
        let mut build_runs: Vec<BuildRun> =
            self.build_runs.read().await.values().cloned().collect();
        build_runs.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        build_runs
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get_pipeline_run(&self, key: &NamespacedName) -> Result<PipelineRun, StoreError> {
        self.pipeline_runs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: KIND_PIPELINE_RUN,
                key: key.clone(),
            })
    }

    async fn update_pipeline_run(
        &self,
        pipeline_run: &PipelineRun,
    ) -> Result<PipelineRun, StoreError> {
        let key = pipeline_run.namespaced_name();
        let mut pipeline_runs = self.pipeline_runs.write().await;

        let stored = pipeline_runs.get_mut(&key).ok_or_else(|| StoreError::NotFound {
            kind: KIND_PIPELINE_RUN,
            key: key.clone(),
        })?;

        let found = stored.metadata.resource_version;
        let expected = pipeline_run.metadata.resource_version;
        if found != expected {
            return Err(StoreError::Conflict {
                kind: KIND_PIPELINE_RUN,
                key,
                expected,
                found,
            });
        }

        let mut updated = pipeline_run.clone();
        updated.metadata.resource_version = found + 1;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn get_custom_run(&self, key: &NamespacedName) -> Result<CustomRun, StoreError> {
        self.custom_runs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: KIND_CUSTOM_RUN,
                key: key.clone(),
            })
    }

    async fn patch_custom_run_status(
        &self,
        key: &NamespacedName,
        status: CustomRunStatus,
    ) -> Result<CustomRun, StoreError> {
        let mut custom_runs = self.custom_runs.write().await;
        let stored = custom_runs.get_mut(key).ok_or_else(|| StoreError::NotFound {
            kind: KIND_CUSTOM_RUN,
            key: key.clone(),
        })?;

        if status.start_time.is_some() {
            stored.status.start_time = status.start_time;
        }
        if status.extra_fields.is_some() {
            stored.status.extra_fields = status.extra_fields;
        }
        stored.metadata.resource_version += 1;
        Ok(stored.clone())
    }

    async fn get_build_run(&self, key: &NamespacedName) -> Result<BuildRun, StoreError> {
        self.build_runs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: KIND_BUILD_RUN,
                key: key.clone(),
            })
    }

    async fn create_build_run(&self, mut build_run: BuildRun) -> Result<BuildRun, StoreError> {
        let key = build_run.namespaced_name();
        let mut build_runs = self.build_runs.write().await;
        if build_runs.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind: KIND_BUILD_RUN,
                key,
            });
        }

        build_run.metadata.resource_version = 1;
        build_runs.insert(key, build_run.clone());
        Ok(build_run)
    }
}
