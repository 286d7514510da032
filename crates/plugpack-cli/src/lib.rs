//! plugpack library - plugin discovery, build agenda and packaging pipeline
//!
//! The binary is a thin clap front end over these modules; integration tests
//! drive the same functions directly.

pub mod agenda;
pub mod builder;
pub mod commands;
pub mod common;
pub mod errors;
pub mod filter;
pub mod packager;
pub mod plugins;
pub mod receipts;

pub use common::GlobalOpts;
