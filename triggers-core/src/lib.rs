//! Triggers Core
//!
//! Core types shared by the Shipwright triggers decision core and controller.
//!
//! This crate contains:
//! - Domain types: the watched objects (PipelineRun, CustomRun, BuildRun) and their metadata
//! - DTOs: values derived from those objects (ObjectRef, ExtraFields)
//! - Constants: API versions the triggers care about

pub mod constants;
pub mod domain;
pub mod dto;
