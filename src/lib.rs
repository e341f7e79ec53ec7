//! stv: hierarchical checkbox tree with tri-state selection
//!
//! Layers, bottom-up:
//! - [`domain`]: node arena, selection propagation, search
//! - [`application`]: tree view with incremental rendering, filter and events
//! - [`infrastructure`]: UI/time boundary traits, in-memory DOM, JSON loading
//! - [`cli`]: the `stv` binary's commands

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
