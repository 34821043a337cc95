//! Device nodes and device cgroup rules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Matches any major or minor number in a [`DeviceRule`].
pub const WILDCARD: i64 = -1;

/// Kind of device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// Every kind (rules only).
    All,
    /// Block device.
    Block,
    /// Character device.
    Char,
    /// Named pipe.
    Fifo,
}

impl DeviceType {
    /// Single-letter code used by the devices controller and `mknod`.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::All => 'a',
            Self::Block => 'b',
            Self::Char => 'c',
            Self::Fifo => 'p',
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A device node to create inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Path inside the container.
    pub path: String,
    /// Kind of node.
    pub kind: DeviceType,
    /// Major number.
    pub major: i64,
    /// Minor number.
    pub minor: i64,
    /// Permission bits.
    pub file_mode: u32,
    /// Owner.
    pub uid: u32,
    /// Group.
    pub gid: u32,
}

/// An allow or deny entry for the devices controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRule {
    /// Kind of device matched.
    pub kind: DeviceType,
    /// Major number, or [`WILDCARD`].
    pub major: i64,
    /// Minor number, or [`WILDCARD`].
    pub minor: i64,
    /// Access string, a subset of `rwm`.
    pub permissions: String,
    /// Allow or deny.
    pub allow: bool,
}

impl fmt::Display for DeviceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = |n: i64| {
            if n == WILDCARD {
                "*".to_string()
            } else {
                n.to_string()
            }
        };
        write!(
            f,
            "{} {}:{} {}",
            self.kind,
            num(self.major),
            num(self.minor),
            self.permissions
        )
    }
}

fn char_node(path: &str, major: i64, minor: i64) -> Device {
    Device {
        path: path.into(),
        kind: DeviceType::Char,
        major,
        minor,
        file_mode: 0o666,
        uid: 0,
        gid: 0,
    }
}

fn allow(kind: DeviceType, major: i64, minor: i64, permissions: &str) -> DeviceRule {
    DeviceRule {
        kind,
        major,
        minor,
        permissions: permissions.into(),
        allow: true,
    }
}

/// Device nodes every container gets.
#[must_use]
pub fn default_nodes() -> Vec<Device> {
    vec![
        char_node("/dev/null", 1, 3),
        char_node("/dev/random", 1, 8),
        char_node("/dev/full", 1, 7),
        char_node("/dev/tty", 5, 0),
        char_node("/dev/zero", 1, 5),
        char_node("/dev/urandom", 1, 9),
    ]
}

/// Device rules appended after the rules a specification declares.
#[must_use]
pub fn default_allow_rules() -> Vec<DeviceRule> {
    vec![
        // mknod of any device; access is still governed by the rules below
        allow(DeviceType::Char, WILDCARD, WILDCARD, "m"),
        allow(DeviceType::Block, WILDCARD, WILDCARD, "m"),
        allow(DeviceType::Char, 1, 3, "rwm"),
        allow(DeviceType::Char, 1, 8, "rwm"),
        allow(DeviceType::Char, 1, 7, "rwm"),
        allow(DeviceType::Char, 5, 0, "rwm"),
        allow(DeviceType::Char, 1, 5, "rwm"),
        allow(DeviceType::Char, 1, 9, "rwm"),
        // /dev/console
        allow(DeviceType::Char, 5, 1, "rwm"),
        // /dev/pts/*
        allow(DeviceType::Char, 136, WILDCARD, "rwm"),
        // /dev/ptmx
        allow(DeviceType::Char, 5, 2, "rwm"),
        // /dev/net/tun
        allow(DeviceType::Char, 10, 200, "rwm"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_display_uses_star_for_wildcards() {
        let rule = allow(DeviceType::Char, 136, WILDCARD, "rwm");
        assert_eq!(rule.to_string(), "c 136:* rwm");
    }

    #[test]
    fn every_default_node_is_allowed() {
        let rules = default_allow_rules();
        for node in default_nodes() {
            assert!(
                rules
                    .iter()
                    .any(|r| r.major == node.major && r.minor == node.minor && r.permissions == "rwm"),
                "no rule for {}",
                node.path
            );
        }
    }
}
