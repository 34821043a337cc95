//! Mount descriptors handed to the mount-setup collaborator.

use serde::{Deserialize, Serialize};

/// Copy the lower directory's contents into a fresh tmpfs mount.
pub const EXT_COPYUP: u32 = 1;

/// A single mount, with options already resolved to kernel flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    /// Source device or path.
    pub source: String,
    /// Destination inside the container, as declared.
    pub destination: String,
    /// Filesystem type.
    pub device: String,
    /// `MS_*` flags for the initial `mount(2)`.
    pub flags: u64,
    /// Propagation flags, each applied with its own `mount(2)` call.
    pub propagation_flags: Vec<u64>,
    /// Filesystem-specific options, comma separated.
    pub data: String,
    /// Runtime extensions (`EXT_*`).
    pub extensions: u32,
}

impl Mount {
    /// Iterates over the comma separated entries of `data`.
    pub fn data_options(&self) -> impl Iterator<Item = &str> {
        self.data.split(',').filter(|opt| !opt.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_options_skips_empty_entries() {
        let mount = Mount {
            data: "mode=755,,size=65536k".into(),
            ..Mount::default()
        };
        assert_eq!(mount.data_options().collect::<Vec<_>>(), ["mode=755", "size=65536k"]);
    }
}
