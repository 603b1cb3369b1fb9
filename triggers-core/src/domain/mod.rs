//! Core domain types
//!
//! This module contains the objects the triggers watch and write. They mirror
//! the subset of the Tekton and Shipwright resources the decision core reads;
//! persistence and watching belong to the caller.

pub mod build_run;
pub mod custom_run;
pub mod meta;
pub mod object;
pub mod pipeline_run;
