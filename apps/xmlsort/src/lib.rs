//! xmlsort core library.
//!
//! This crate exposes programmatic APIs for sorting XML documents into the
//! canonical order of a template document and for verifying that documents
//! already are in that order.
//!
//! High-level modules:
//! - `dom`: Arena document tree, parser and serializer.
//! - `sort_order`: Weight index built from a template; built-in templates.
//! - `wrapper`: Per-node ordering policies and their classification.
//! - `hierarchy`: The wrap, detach, sort and reattach pipeline.
//! - `verify`: Structural comparison reporting the first divergence.
//! - `sorter`: One configured sorter over strings and documents.
//! - `format` / `check`: File-level sort and verify runners.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `models`: Sort policy and verify output structs.
//! - `output`: Human/JSON printers for sort/verify.
//! - `error`: Error types.
//! - `utils`: Supporting helpers.
pub mod check;
pub mod cli;
pub mod config;
pub mod dom;
pub mod error;
pub mod format;
pub mod hierarchy;
pub mod models;
pub mod output;
pub mod sort_order;
pub mod sorter;
pub mod utils;
pub mod verify;
pub mod wrapper;
