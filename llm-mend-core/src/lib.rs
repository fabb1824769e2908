#![doc = "llm-mend-core: core pipeline for llm-mend."]

//! This crate holds the fetch → transform → review → commit pipeline and the pieces it
//! is built from. It has no terminal or process concerns; the `llm-mend` CLI crate wires
//! it to stdin/stdout, the environment and a YAML config file.
//!
//! # Modules
//! - [`contract`]: traits and data types shared by every stage
//! - [`discovery`]: suffix-filtered recursive file listing
//! - [`store`]: filesystem [`contract::ContentStore`]
//! - [`transform`]: transformation client and the OpenAI-compatible service
//! - [`review`]: the per-item accept/guide/reject loop
//! - [`pipeline`]: concurrent fan-out over a directory
//! - [`bundle`]: pack a directory into one annotated document and back
//! - [`config`]: serde-backed run configuration

pub mod bundle;
pub mod config;
pub mod contract;
pub mod discovery;
pub mod pipeline;
pub mod review;
pub mod store;
pub mod transform;
