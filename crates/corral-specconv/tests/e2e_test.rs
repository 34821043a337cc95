//! End-to-end tests: specification document in, validated configuration out.
//!
//! Each test drives the same pipeline a runtime would:
//! 1. Load or build a specification
//! 2. Translate it into a configuration
//! 3. Validate the configuration

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use corral_common::config::TranslateOptions;
use corral_common::constants::SELF_USER_NS;
use corral_common::host::HostIds;
use corral_config::cgroup::PropertyValue;
use corral_config::namespace::NamespaceType;
use corral_config::validate::validate;
use corral_spec::rootless::to_rootless;
use corral_spec::{Root, Spec};
use corral_specconv::{HostContext, create_config_with};

fn host_spec() -> Spec {
    let mut spec = Spec::example();
    spec.root = Some(Root {
        path: "/".into(),
        readonly: true,
    });
    spec
}

fn host() -> HostContext {
    HostContext {
        bundle: PathBuf::from("/"),
        ids: HostIds::current(),
    }
}

fn opts() -> TranslateOptions {
    TranslateOptions::new("ContainerID")
}

// ── Default spec ─────────────────────────────────────────────────────

#[test]
fn pipeline_example_spec_validates() {
    let config = create_config_with(&host_spec(), &opts(), &host()).expect("should translate");
    assert_eq!(config.rootfs, Path::new("/"));
    validate(&config).expect("example spec should validate");
}

#[test]
fn pipeline_null_process_validates() {
    let mut spec = host_spec();
    spec.process = None;
    let config = create_config_with(&spec, &opts(), &host()).expect("should translate");
    validate(&config).expect("null process should validate");
}

#[test]
fn pipeline_loads_spec_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&host_spec()).unwrap()).unwrap();

    let spec = Spec::load(&path).expect("should load");
    assert_eq!(spec, host_spec());

    let config = create_config_with(&spec, &opts(), &host()).expect("should translate");
    validate(&config).expect("loaded spec should validate");
}

#[test]
fn pipeline_missing_spec_file_reports_path() {
    let err = Spec::load(Path::new("/nonexistent/config.json")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/config.json"), "got: {err}");
}

// ── Rootless ─────────────────────────────────────────────────────────

#[test]
fn pipeline_rootless_spec_validates() {
    if !Path::new(SELF_USER_NS).exists() {
        return;
    }
    let ids = HostIds::current();
    let mut spec = host_spec();
    to_rootless(&mut spec, ids);

    let opts = TranslateOptions {
        rootless_euid: true,
        rootless_cgroups: true,
        ..opts()
    };
    let config = create_config_with(&spec, &opts, &host()).expect("should translate");
    assert!(config.namespaces.contains(NamespaceType::User));
    assert!(!config.namespaces.contains(NamespaceType::Net));
    assert_eq!(config.uid_mappings[0].host_id, ids.uid);
    validate(&config).expect("rootless spec should validate");
}

#[test]
fn pipeline_rootless_joined_user_namespace_validates() {
    if !Path::new(SELF_USER_NS).exists() {
        return;
    }
    let mut spec = host_spec();
    if let Some(linux) = spec.linux.as_mut() {
        linux.namespaces.push(corral_spec::linux::Namespace {
            kind: "user".into(),
            path: SELF_USER_NS.into(),
        });
    }
    let opts = TranslateOptions {
        rootless_euid: true,
        ..opts()
    };
    let config = create_config_with(&spec, &opts, &host()).expect("should translate");
    assert_eq!(
        config.namespaces.path_of(NamespaceType::User),
        Some(Path::new(SELF_USER_NS))
    );
    assert!(config.uid_mappings.is_empty());
    assert!(config.gid_mappings.is_empty());
    validate(&config).expect("joined user namespace should validate");
}

// ── Cgroups ──────────────────────────────────────────────────────────

#[test]
fn pipeline_systemd_placement_and_properties() {
    let mut spec = host_spec();
    if let Some(linux) = spec.linux.as_mut() {
        linux.cgroups_path = "system.slice:corral:c1".into();
    }
    let _ = spec.annotations.insert(
        "org.systemd.property.TimeoutStopSec".into(),
        "1.5".into(),
    );
    let opts = TranslateOptions {
        use_systemd_cgroup: true,
        ..opts()
    };

    let config = create_config_with(&spec, &opts, &host()).expect("should translate");
    assert_eq!(config.cgroups.parent, "system.slice");
    assert_eq!(config.cgroups.scope_prefix, "corral");
    assert_eq!(config.cgroups.name, "c1");
    assert_eq!(config.cgroups.systemd_props[0].name, "TimeoutStopUSec");
    assert_eq!(
        config.cgroups.systemd_props[0].value,
        PropertyValue::Uint64(1_500_000)
    );
    validate(&config).expect("systemd placement should validate");
}

#[test]
fn pipeline_bad_systemd_path_fails_translation() {
    let mut spec = host_spec();
    if let Some(linux) = spec.linux.as_mut() {
        linux.cgroups_path = "/user/cgroups/path/id".into();
    }
    let opts = TranslateOptions {
        use_systemd_cgroup: true,
        ..opts()
    };
    assert!(create_config_with(&spec, &opts, &host()).is_err());
}

// ── Validation failures ──────────────────────────────────────────────

#[test]
fn pipeline_host_global_sysctl_is_rejected() {
    let mut spec = host_spec();
    if let Some(linux) = spec.linux.as_mut() {
        let _ = linux.sysctl.insert("kernel.ctl".into(), "1".into());
    }
    let config = create_config_with(&spec, &opts(), &host()).expect("should translate");
    let msg = validate(&config).unwrap_err().to_string();
    assert!(msg.contains("sysctl"), "got: {msg}");
}

#[test]
fn pipeline_hostname_without_uts_is_rejected() {
    let mut spec = host_spec();
    if let Some(linux) = spec.linux.as_mut() {
        linux.namespaces.retain(|ns| ns.kind != "uts");
    }
    let config = create_config_with(&spec, &opts(), &host()).expect("should translate");
    let msg = validate(&config).unwrap_err().to_string();
    assert!(msg.contains("hostname"), "got: {msg}");
}

#[test]
fn pipeline_mappings_without_user_namespace_are_rejected() {
    let mut spec = host_spec();
    if let Some(linux) = spec.linux.as_mut() {
        linux.uid_mappings.push(corral_spec::linux::IdMapping {
            container_id: 0,
            host_id: 1000,
            size: 1,
        });
    }
    let config = create_config_with(&spec, &opts(), &host()).expect("should translate");
    let msg = validate(&config).unwrap_err().to_string();
    assert!(msg.contains("usernamespace"), "got: {msg}");
}
