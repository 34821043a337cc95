//! Device nodes created inside the container.

use corral_common::error::{CorralError, Result};
use corral_config::device::{self, Device, DeviceType};
use corral_spec::linux as spec;

fn node_type(kind: &str) -> Result<DeviceType> {
    match kind {
        "c" | "u" => Ok(DeviceType::Char),
        "b" => Ok(DeviceType::Block),
        "p" => Ok(DeviceType::Fifo),
        other => Err(CorralError::malformed(format!("invalid device type {other:?}"))),
    }
}

/// Converts one declared node. Mode defaults to `0666` and ownership to
/// root.
///
/// # Errors
///
/// Returns [`CorralError::MalformedSpec`] for unknown node types.
pub fn create_device(declared: &spec::Device) -> Result<Device> {
    Ok(Device {
        path: declared.path.clone(),
        kind: node_type(&declared.kind)?,
        major: declared.major,
        minor: declared.minor,
        file_mode: declared.file_mode.unwrap_or(0o666),
        uid: declared.uid.unwrap_or(0),
        gid: declared.gid.unwrap_or(0),
    })
}

/// The default nodes followed by the declared ones. A declared node
/// replaces a default with the same path.
///
/// # Errors
///
/// Propagates [`create_device`] errors.
pub fn create_devices(declared: &[spec::Device]) -> Result<Vec<Device>> {
    let mut out: Vec<Device> = device::default_nodes()
        .into_iter()
        .filter(|d| declared.iter().all(|n| n.path != d.path))
        .collect();
    for node in declared {
        out.push(create_device(node)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuse() -> spec::Device {
        spec::Device {
            path: "/dev/fuse".into(),
            kind: "c".into(),
            major: 10,
            minor: 229,
            ..spec::Device::default()
        }
    }

    #[test]
    fn declared_nodes_follow_defaults() {
        let nodes = create_devices(&[fuse()]).unwrap();
        assert_eq!(nodes.len(), device::default_nodes().len() + 1);
        let last = nodes.last().unwrap();
        assert_eq!(last.path, "/dev/fuse");
        assert_eq!(last.file_mode, 0o666);
        assert_eq!(last.kind, DeviceType::Char);
    }

    #[test]
    fn declared_node_replaces_default() {
        let null = spec::Device {
            path: "/dev/null".into(),
            kind: "c".into(),
            major: 1,
            minor: 3,
            file_mode: Some(0o600),
            ..spec::Device::default()
        };
        let nodes = create_devices(&[null]).unwrap();
        let nulls: Vec<_> = nodes.iter().filter(|d| d.path == "/dev/null").collect();
        assert_eq!(nulls.len(), 1);
        assert_eq!(nulls[0].file_mode, 0o600);
    }

    #[test]
    fn unknown_node_type_fails() {
        let mut node = fuse();
        node.kind = "x".into();
        assert!(create_devices(&[node]).is_err());
    }
}
