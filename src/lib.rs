//! Courier is an outbound HTTP client that calls services by logical name.
//!
//! A configuration maps each remote name to a list of base addresses and,
//! optionally, per-path timeouts. Every call picks one address at random,
//! applies the most specific configured timeout, sends one of six verbs
//! and normalizes whatever comes back into a [`Response`](client::Response).
//! A call that never reaches the upstream yields the synthetic
//! `{"status": 900, ...}` body with HTTP 502 instead of an error.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`client`] -- Registry, timeout policy, request builder, transport,
//!   response normalizer and the [`Courier`](client::Courier) facade.
//! - [`cmd`] -- Subcommand dispatch and execution (call, validate, init).
//! - [`config`] -- Configuration model, file sources and validation via the
//!   [`ConfigSource`](config::ConfigSource) trait.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod client;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
