//! Adjustments for containers started without host root.

use corral_common::host::HostIds;
use corral_config::namespace::{Namespace, NamespaceType};
use corral_config::{Config, IdMap};

/// Forces a user namespace and, when the specification maps nothing, maps
/// the declared process IDs onto the invoking user's IDs. A joined user
/// namespace brings its own mappings and is left alone.
pub fn adjust(config: &mut Config, ids: HostIds, container_uid: u32, container_gid: u32) {
    if !config.namespaces.contains(NamespaceType::User) {
        config.namespaces.add(Namespace::new(NamespaceType::User));
    }
    let joined = config.namespaces.path_of(NamespaceType::User).is_some();

    if !joined && config.uid_mappings.is_empty() {
        config.uid_mappings.push(IdMap {
            container_id: container_uid,
            host_id: ids.uid,
            size: 1,
        });
    }
    if !joined && config.gid_mappings.is_empty() {
        config.gid_mappings.push(IdMap {
            container_id: container_gid,
            host_id: ids.gid,
            size: 1,
        });
    }
    config.rootless_euid = true;

    tracing::debug!(
        uid = ids.uid,
        gid = ids.gid,
        root = ids.is_root(),
        uid_mappings = config.uid_mappings.len(),
        gid_mappings = config.gid_mappings.len(),
        "applied rootless adjustments"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: HostIds = HostIds {
        uid: 1000,
        gid: 1001,
    };

    #[test]
    fn adds_user_namespace_and_identity_mapping() {
        let mut config = Config::default();
        adjust(&mut config, USER, 0, 0);
        assert!(config.namespaces.contains(NamespaceType::User));
        assert!(config.rootless_euid);
        assert_eq!(
            config.uid_mappings,
            [IdMap {
                container_id: 0,
                host_id: 1000,
                size: 1
            }]
        );
        assert_eq!(config.gid_mappings[0].host_id, 1001);
    }

    #[test]
    fn declared_mappings_are_kept() {
        let declared = IdMap {
            container_id: 0,
            host_id: 100_000,
            size: 65536,
        };
        let mut config = Config {
            uid_mappings: vec![declared],
            ..Config::default()
        };
        adjust(&mut config, USER, 0, 0);
        assert_eq!(config.uid_mappings, [declared]);
        assert_eq!(config.gid_mappings.len(), 1);
    }

    #[test]
    fn maps_declared_process_ids() {
        let mut config = Config::default();
        adjust(&mut config, USER, 42, 43);
        assert_eq!(config.uid_mappings[0].container_id, 42);
        assert_eq!(config.gid_mappings[0].container_id, 43);
    }

    #[test]
    fn root_caller_is_mapped_like_any_other() {
        let root = HostIds { uid: 0, gid: 0 };
        assert!(root.is_root());
        let mut config = Config::default();
        adjust(&mut config, root, 0, 0);
        assert_eq!(config.uid_mappings[0].host_id, 0);
        assert_eq!(config.gid_mappings[0].host_id, 0);
    }

    #[test]
    fn joined_user_namespace_gets_no_mappings() {
        let mut config = Config::default();
        config
            .namespaces
            .add(Namespace::join(NamespaceType::User, "/proc/1234/ns/user"));
        adjust(&mut config, USER, 0, 0);
        assert!(config.uid_mappings.is_empty());
        assert!(config.gid_mappings.is_empty());
    }
}
