//! Vault lifecycle events, expressed in vault paths.
//!
//! Events carry paths rather than resolved entities: by the time an event is
//! handled the entity may have moved again, so the reconciler resolves each
//! path against the store when it processes the event.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VaultEvent {
    Created(String),
    Renamed { from: String, to: String },
    Modified(String),
    Deleted(String),
}

impl VaultEvent {
    /// The path the event leaves behind (the destination for renames).
    pub fn path(&self) -> &str {
        match self {
            VaultEvent::Created(path) | VaultEvent::Modified(path) | VaultEvent::Deleted(path) => {
                path
            }
            VaultEvent::Renamed { to, .. } => to,
        }
    }
}

impl std::fmt::Display for VaultEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultEvent::Created(path) => write!(f, "created {}", path),
            VaultEvent::Renamed { from, to } => write!(f, "renamed {} -> {}", from, to),
            VaultEvent::Modified(path) => write!(f, "modified {}", path),
            VaultEvent::Deleted(path) => write!(f, "deleted {}", path),
        }
    }
}
