//! Read-only facts about the invoking process.

use serde::{Deserialize, Serialize};

/// Effective user and group of the invoking process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIds {
    /// Effective UID.
    pub uid: u32,
    /// Effective GID.
    pub gid: u32,
}

impl HostIds {
    /// Reads the effective UID and GID of the current process.
    #[must_use]
    pub fn current() -> Self {
        Self {
            uid: nix::unistd::geteuid().as_raw(),
            gid: nix::unistd::getegid().as_raw(),
        }
    }

    /// Returns `true` when the effective UID is root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.uid == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_matches_nix() {
        let ids = HostIds::current();
        assert_eq!(ids.uid, nix::unistd::geteuid().as_raw());
        assert_eq!(ids.is_root(), nix::unistd::geteuid().is_root());
    }
}
