//! Owner reference scans
//!
//! BuildRuns issued for a CustomRun are owned by it; following that owner back
//! lets BuildRun events wake the CustomRun up.

use triggers_core::constants::{KIND_BUILD, KIND_CUSTOM_RUN, KIND_RUN};
use triggers_core::domain::build_run::BuildRun;
use triggers_core::domain::custom_run::CustomRun;
use triggers_core::domain::meta::NamespacedName;
use triggers_core::domain::object::Object;

use crate::keys::TriggerKeys;

/// Returns the Tekton Run owning the BuildRun, if any
pub fn search_build_run_for_run_owner(
    keys: &TriggerKeys,
    build_run: &BuildRun,
) -> Option<NamespacedName> {
    build_run
        .metadata
        .owner_references
        .iter()
        .find(|owner| {
            owner.api_version == keys.tekton_run_api_version
                && (owner.kind == KIND_RUN || owner.kind == KIND_CUSTOM_RUN)
        })
        .map(|owner| NamespacedName::new(build_run.metadata.namespace.clone(), owner.name.clone()))
}

/// Event filter keeping only BuildRuns owned by a Tekton Run
pub fn build_run_owned_by_run(keys: &TriggerKeys, obj: &Object) -> bool {
    obj.as_build_run()
        .is_some_and(|build_run| search_build_run_for_run_owner(keys, build_run).is_some())
}

/// The Shipwright Build a CustomRun stands for, in the CustomRun namespace
pub fn custom_run_references_shipwright(
    keys: &TriggerKeys,
    custom_run: &CustomRun,
) -> Option<NamespacedName> {
    let custom_ref = custom_run.spec.custom_ref.as_ref()?;
    if custom_ref.api_version != keys.shipwright_api_version || custom_ref.kind != KIND_BUILD {
        return None;
    }
    Some(NamespacedName::new(
        custom_run.metadata.namespace.clone(),
        custom_ref.name.clone(),
    ))
}
