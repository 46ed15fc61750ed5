//! End-to-end deletes against the file-backed runtime, mapping and real
//! post-stop hook processes.

#![cfg(unix)]

use reaper_core::{DeleteError, Deleter, ReaperConfig};
use reaper_runtime::{
    ContainerStatus, FsIdMapping, FsRuntime, IdMapping, RunState, SandboxRuntime, SandboxStatus,
    BUNDLE_PATH_KEY, CONFIG_JSON_KEY, CONTAINER_TYPE_KEY,
};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

struct Fixture {
    _tmp: tempfile::TempDir,
    root: std::path::PathBuf,
    runtime: FsRuntime,
    mapping: FsIdMapping,
    deleter: Deleter,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let config = ReaperConfig::builder()
            .root(&root)
            .hook_timeout(Duration::from_secs(5))
            .build()
            .expect("config should build");

        Self {
            runtime: FsRuntime::new(&root),
            mapping: FsIdMapping::new(&root),
            deleter: Deleter::from_config(&config),
            root,
            _tmp: tmp,
        }
    }

    async fn sandbox(&self, id: &str, state: RunState, members: &[&str]) {
        self.runtime
            .save_sandbox(&SandboxStatus {
                id: id.into(),
                state,
                pid: None,
                containers: members.iter().map(|m| m.to_string()).collect(),
            })
            .await
            .unwrap();
    }

    async fn container(&self, sandbox: &str, id: &str, kind: &str, state: RunState, spec: &str) {
        let annotations = HashMap::from([
            (CONTAINER_TYPE_KEY.to_string(), kind.to_string()),
            (
                BUNDLE_PATH_KEY.to_string(),
                self.root.join("bundles").join(id).display().to_string(),
            ),
            (CONFIG_JSON_KEY.to_string(), spec.to_string()),
        ]);
        self.runtime
            .save_container(
                sandbox,
                &ContainerStatus {
                    id: id.into(),
                    state,
                    pid: None,
                    annotations,
                },
            )
            .await
            .unwrap();
        self.mapping.add(id, sandbox).await.unwrap();
    }
}

fn spec_with_marker_hook(marker: &Path) -> String {
    serde_json::json!({
        "ociVersion": "1.0.2",
        "hooks": {
            "poststop": [{
                "path": "/bin/sh",
                "args": ["sh", "-c", format!("cat > {}", marker.display())],
                "env": ["PATH=/usr/bin:/bin"]
            }]
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_delete_stopped_member_container() {
    let fx = Fixture::new();
    let marker = fx.root.join("hook-state.json");
    fx.sandbox("sb", RunState::Running, &["sb", "c1"]).await;
    fx.container("sb", "sb", "pod_sandbox", RunState::Running, r#"{"ociVersion":"1.0.2"}"#)
        .await;
    fx.container("sb", "c1", "pod_container", RunState::Stopped, &spec_with_marker_hook(&marker))
        .await;

    fx.deleter.delete_all(&["c1"], false).await.unwrap();

    assert!(fx
        .runtime
        .status_container("sb", "c1")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(fx.mapping.fetch("c1").await.unwrap_err().is_not_found());
    assert_eq!(
        fx.runtime.status_sandbox("sb").await.unwrap().containers,
        vec!["sb".to_string()]
    );

    let state: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&marker).unwrap()).unwrap();
    assert_eq!(state["id"], "sb");
    assert!(state["bundle"].as_str().unwrap().ends_with("bundles/c1"));
}

#[tokio::test]
async fn test_force_delete_running_sandbox() {
    let fx = Fixture::new();
    fx.sandbox("sb", RunState::Running, &["sb"]).await;
    fx.container("sb", "sb", "pod_sandbox", RunState::Running, r#"{"ociVersion":"1.0.2"}"#)
        .await;

    fx.deleter.delete("sb", true).await.unwrap();

    assert!(!fx.runtime.sandbox_dir("sb").unwrap().exists());
    assert!(fx.mapping.fetch("sb").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_running_container_is_left_alone_without_force() {
    let fx = Fixture::new();
    fx.sandbox("sb", RunState::Running, &["c1"]).await;
    fx.container("sb", "c1", "pod_container", RunState::Running, r#"{"ociVersion":"1.0.2"}"#)
        .await;

    let err = fx.deleter.delete("c1", false).await.unwrap_err();

    assert!(matches!(err, DeleteError::Precondition { .. }));
    assert_eq!(
        fx.runtime.status_container("sb", "c1").await.unwrap().state,
        RunState::Running
    );
    assert!(fx.mapping.fetch("c1").await.is_ok());
}

#[tokio::test]
async fn test_delete_by_unique_prefix() {
    let fx = Fixture::new();
    fx.sandbox("sb", RunState::Running, &["c1-0123456789"]).await;
    fx.container(
        "sb",
        "c1-0123456789",
        "pod_container",
        RunState::Stopped,
        r#"{"ociVersion":"1.0.2"}"#,
    )
    .await;

    fx.deleter.delete("c1-01", false).await.unwrap();

    assert!(fx
        .mapping
        .fetch("c1-0123456789")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_force_delete_of_unknown_id_succeeds() {
    let fx = Fixture::new();
    fx.deleter.delete_all(&["ghost"], true).await.unwrap();

    let err = fx.deleter.delete_all(&["ghost"], false).await.unwrap_err();
    assert!(matches!(err, DeleteError::Resolution(_)));
}

#[tokio::test]
async fn test_failing_hook_keeps_mapping() {
    let fx = Fixture::new();
    let spec = serde_json::json!({
        "ociVersion": "1.0.2",
        "hooks": {"poststop": [{"path": "/bin/sh", "args": ["sh", "-c", "exit 7"]}]}
    })
    .to_string();
    fx.sandbox("sb", RunState::Running, &["c1"]).await;
    fx.container("sb", "c1", "pod_container", RunState::Stopped, &spec)
        .await;

    let err = fx.deleter.delete("c1", false).await.unwrap_err();

    assert!(matches!(err, DeleteError::Hook(_)));
    // The container is gone but its mapping survives.
    assert!(fx
        .runtime
        .status_container("sb", "c1")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(fx.mapping.fetch("c1").await.is_ok());
}
