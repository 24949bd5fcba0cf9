//! # cbtool - Compiler registry and build-option resolution
//!
//! cbtool keeps a registry of C/C++ toolchains ("compilers"), lets users
//! derive their own copies of them, finds installations on the host, and
//! assembles the effective command-line options for a project or target.
//!
//! ## Quick Start
//!
//! ```bash
//! # See what was detected
//! cbt compiler list
//!
//! # Derive a custom GCC and make it the default
//! cbt compiler copy gcc --name "GCC (static)"
//! cbt compiler default gcc-copy
//!
//! # Print the options a target builds with
//! cbt resolve --target debug
//! ```
//!
//! ## Module Organization
//!
//! - [`toolchain`] - Compiler descriptors, registry, lineage, persistence, detection
//! - [`build`] - Option sets, projects and the option resolver
//! - [`settings`] - Hierarchical key-value settings store
//! - [`config`] - Project manifest parsing (`cbt.toml`)
//! - [`commands`] - CLI command handlers

/// Build options, projects and option resolution.
pub mod build;

/// CLI command handlers.
pub mod commands;

/// Project manifest parsing (`cbt.toml`).
pub mod config;

/// Logger setup for the binary.
pub mod logging;

/// Persistent settings store.
pub mod settings;

/// Compiler registry and toolchain detection.
pub mod toolchain;

/// Terminal UI utilities.
pub mod ui;
