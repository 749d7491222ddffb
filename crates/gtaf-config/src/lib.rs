//! # gtaf-config
//!
//! TOML configuration for the GTAF runtime gate.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use gtaf_config::GateConfig;
//!
//! let config = GateConfig::from_file(Path::new("gate.toml"))?;
//! let enforcer = config.enforcer();
//! ```
//!
//! The only policy-relevant knob is the set of protocol versions the gate
//! accepts. Everything else about a decision comes from the DRC and its
//! artifacts, never from configuration.

pub mod config;

pub use config::{GateConfig, GateSection, LoggingSection};

// ── Tests ─────────────────────────────────────────────────────────────────────
