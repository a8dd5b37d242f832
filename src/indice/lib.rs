//! # Indice Architecture
//!
//! Indice keeps a generated outline of a folder inside "index" documents of a
//! markdown vault. An index document is marked with the `#indice` tag and holds
//! a region between two HTML comment markers; everything inside the region is
//! regenerated from the folder tree and the headings of its documents, and
//! everything outside it is left alone.
//!
//! Indice is a library that happens to have a CLI client, not the other way
//! around.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints results, runs the watch loop    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Owns the reconciler (and its change ledger) per session  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Turns reconciler outcomes into CmdResult messages        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (reconcile, outline, region, headings, ledger, tags)  │
//! │  - Decides what to rebuild and renders the outline text     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract VaultStore trait                                │
//! │  - FsVault (production), MemVault (testing)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns Rust types. It
//! never prints and never exits the process. Diagnostics go through `tracing`;
//! installing a subscriber is the client's job.
//!
//! ## Testing Strategy
//!
//! 1. **Core and commands**: unit tests against [`store::memory::MemVault`].
//!    This is where most of the testing lives.
//! 2. **Stores and watcher**: tests against temporary directories.
//! 3. **CLI**: integration tests in `tests/` driving the binary.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Per-command logic producing `CmdResult`s
//! - [`reconcile`]: Event handling and index rebuild decisions
//! - [`outline`]: Outline rendering for a folder
//! - [`region`]: Locating and rewriting the generated region
//! - [`headings`]: Heading extraction from markdown
//! - [`ledger`]: Last-seen headings per document
//! - [`tags`]: Tag extraction and index document detection
//! - [`editor`]: The editing surface an index is written through
//! - [`events`]: Vault lifecycle events
//! - [`watch`]: Filesystem notifications turned into vault events
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Vault paths, documents and folders
//! - [`config`]: Configuration management
//! - [`init`]: Vault discovery and session setup
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod headings;
pub mod init;
pub mod ledger;
pub mod model;
pub mod outline;
pub mod reconcile;
pub mod region;
pub mod store;
pub mod tags;
pub mod watch;
