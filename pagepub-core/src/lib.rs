#![doc = "pagepub-core: core publishing pipeline for pagepub."]

//! This crate contains all the publishing logic, data models and the object
//! store contract for pagepub. Transport and CLI concerns are not included
//! here; the `pagepub` binary crate supplies the concrete store client.
//!
//! # Usage
//! Add this as a dependency for the publish pipeline, the store contract and
//! its mock, the directory walker and the publish configuration types.

pub mod bootstrap;
pub mod config;
pub mod contract;
pub mod error;
pub mod publish;
pub mod uploader;
pub mod walker;
