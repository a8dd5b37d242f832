//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for indice operations, whatever drives them: the CLI, the
//! watch loop, or an editor integration.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns** the [`Reconciler`], and through it the vault store and the
//!   change ledger, for the lifetime of the session, plus the vault's
//!   [`ConfigPaths`]
//! - **Dispatches** to the appropriate command function
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs` and [`crate::reconcile`]
//! - **Terminal I/O**: No stdout, stderr, or formatting
//!
//! ## Generic Over VaultStore
//!
//! `IndiceApi<S: VaultStore>` is generic over the storage backend:
//! - Production: `IndiceApi<FsVault>`
//! - Testing: `IndiceApi<MemVault>`

use crate::commands;
use crate::config::ConfigPaths;
use crate::editor::Position;
use crate::error::Result;
use crate::events::VaultEvent;
use crate::reconcile::Reconciler;
use crate::store::VaultStore;

pub struct IndiceApi<S: VaultStore> {
    reconciler: Reconciler<S>,
    config_paths: ConfigPaths,
}

impl<S: VaultStore> IndiceApi<S> {
    pub fn new(store: S, config_paths: ConfigPaths) -> Self {
        Self {
            reconciler: Reconciler::new(store),
            config_paths,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.reconciler = self.reconciler.with_max_depth(max_depth);
        self
    }

    /// Builds the index of `path`'s folder into `path`, at `cursor` when the
    /// document has no region yet.
    pub fn build_index(&self, path: &str, cursor: Option<Position>) -> Result<commands::CmdResult> {
        commands::build::run(&self.reconciler, path, cursor)
    }

    /// Rebuilds the index documents governing a document or folder.
    pub fn refresh(&self, path: &str) -> Result<commands::CmdResult> {
        commands::refresh::run(&self.reconciler, path)
    }

    pub fn rebuild_all(&mut self) -> Result<commands::CmdResult> {
        commands::all::run(&mut self.reconciler)
    }

    pub fn outline(&self, folder: &str) -> Result<commands::CmdResult> {
        commands::outline::run(&self.reconciler, folder)
    }

    pub fn handle_event(&mut self, event: &VaultEvent) -> Result<commands::CmdResult> {
        commands::watch::apply(&mut self.reconciler, event)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.config_paths, action)
    }

    pub fn store(&self) -> &S {
        self.reconciler.store()
    }

    pub fn config_paths(&self) -> &ConfigPaths {
        &self.config_paths
    }

    /// Ends the session: the change ledger is discarded.
    pub fn teardown(&mut self) {
        self.reconciler.teardown();
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};
