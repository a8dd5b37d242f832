use crate::api::IndiceApi;
use crate::config::{ConfigPaths, IndiceConfig, CONFIG_DIR};
use crate::error::Result;
use crate::store::fs::FsVault;
use std::path::{Path, PathBuf};

/// Folders that mark the root of a vault.
const VAULT_MARKERS: [&str; 2] = [".obsidian", CONFIG_DIR];

pub struct IndiceContext {
    pub api: IndiceApi<FsVault>,
    pub config: IndiceConfig,
    pub root: PathBuf,
}

/// Find the vault root by walking up from `cwd` looking for a directory that
/// holds `.obsidian` or `.indice`. Returns None when no ancestor qualifies.
pub fn find_vault_root(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| VAULT_MARKERS.iter().any(|marker| dir.join(marker).is_dir()))
        .map(Path::to_path_buf)
}

/// Builds the session for a vault: an explicit root wins, then the nearest
/// marked ancestor of `cwd`, then `cwd` itself.
pub fn initialize(cwd: &Path, vault: Option<PathBuf>) -> Result<IndiceContext> {
    let root = vault
        .or_else(|| find_vault_root(cwd))
        .unwrap_or_else(|| cwd.to_path_buf());
    let root = root.canonicalize().unwrap_or(root);

    let paths = ConfigPaths::for_vault(&root);
    let config = paths.resolve()?;
    let store = FsVault::from_config(&root, &config);
    let api = IndiceApi::new(store, paths).with_max_depth(config.max_depth);

    Ok(IndiceContext { api, config, root })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_marked_ancestor() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        let nested = dir.path().join("Projects/Sub");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_vault_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn explicit_vault_wins() {
        let dir = tempdir().unwrap();
        let vault = dir.path().join("vault");
        fs::create_dir_all(&vault).unwrap();

        let ctx = initialize(dir.path(), Some(vault.clone())).unwrap();
        assert_eq!(ctx.root, vault.canonicalize().unwrap());
        assert_eq!(ctx.api.store().root(), ctx.root.as_path());
    }

    #[test]
    fn vault_config_is_applied() {
        let dir = tempdir().unwrap();
        let mut config = IndiceConfig::default();
        config.set("extensions", "txt").unwrap();
        config.save(dir.path().join(CONFIG_DIR)).unwrap();

        let ctx = initialize(dir.path(), None).unwrap();
        assert_eq!(ctx.config.extensions(), vec!["txt"]);
        assert!(ctx.api.store().is_document_name("note.txt"));
        assert!(!ctx.api.store().is_document_name("note.md"));
    }
}
