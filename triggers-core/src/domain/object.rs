//! Heterogeneous watch payload

use super::build_run::BuildRun;
use super::custom_run::CustomRun;
use super::meta::ObjectMeta;
use super::pipeline_run::PipelineRun;

/// Any object delivered by the watches the controller subscribes to
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    PipelineRun(PipelineRun),
    CustomRun(CustomRun),
    BuildRun(BuildRun),
}

impl Object {
    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Object::PipelineRun(pr) => &pr.metadata,
            Object::CustomRun(cr) => &cr.metadata,
            Object::BuildRun(br) => &br.metadata,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Object::PipelineRun(_) => crate::constants::KIND_PIPELINE_RUN,
            Object::CustomRun(_) => crate::constants::KIND_CUSTOM_RUN,
            Object::BuildRun(_) => crate::constants::KIND_BUILD_RUN,
        }
    }

    pub fn as_pipeline_run(&self) -> Option<&PipelineRun> {
        match self {
            Object::PipelineRun(pr) => Some(pr),
            _ => None,
        }
    }

    pub fn as_build_run(&self) -> Option<&BuildRun> {
        match self {
            Object::BuildRun(br) => Some(br),
            _ => None,
        }
    }
}

impl From<PipelineRun> for Object {
    fn from(pr: PipelineRun) -> Self {
        Object::PipelineRun(pr)
    }
}

impl From<CustomRun> for Object {
    fn from(cr: CustomRun) -> Self {
        Object::CustomRun(cr)
    }
}

impl From<BuildRun> for Object {
    fn from(br: BuildRun) -> Self {
        Object::BuildRun(br)
    }
}
