//! API group versions and kinds recognised by the triggers

/// Shipwright Build API version, used on `TaskRef`s pointing at Builds.
pub const SHIPWRIGHT_API_VERSION: &str = "shipwright.io/v1alpha1";

/// Tekton API version carried by `Run`/`CustomRun` owner references.
pub const TEKTON_API_V1ALPHA1: &str = "tekton.dev/v1alpha1";

/// Tekton API version of PipelineRuns.
pub const TEKTON_API_V1BETA1: &str = "tekton.dev/v1beta1";

pub const KIND_BUILD: &str = "Build";
pub const KIND_BUILD_RUN: &str = "BuildRun";
pub const KIND_PIPELINE_RUN: &str = "PipelineRun";
pub const KIND_RUN: &str = "Run";
pub const KIND_CUSTOM_RUN: &str = "CustomRun";
