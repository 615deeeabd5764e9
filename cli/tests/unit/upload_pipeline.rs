//! Upload phase driven end to end with real glob expansion and fake hosts.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use clusterfiles_cli::application::services::UploadFiles;
use clusterfiles_cli::application::{PhaseOutcome, run_phase};
use clusterfiles_cli::domain::DistributionError;
use clusterfiles_cli::infra::GlobMatcher;
use clusterfiles_common::{ClusterConfig, ClusterSpec, FileSpec, HostSpec, Metadata, SshSpec};

use crate::mocks::{CollectingReporter, RecordingConnector};

fn fixture(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in names {
        std::fs::write(dir.path().join(name), name.as_bytes()).expect("write");
    }
    dir
}

fn file(src: String, dst: &str, dst_dir: &str, perm: &str) -> FileSpec {
    FileSpec {
        name: String::new(),
        src,
        dst: dst.to_string(),
        dst_dir: dst_dir.to_string(),
        perm: perm.to_string(),
    }
}

fn cluster(hosts: Vec<(&str, Vec<FileSpec>)>) -> ClusterConfig {
    ClusterConfig {
        api_version: "clusterfiles/v1".into(),
        kind: "Cluster".into(),
        metadata: Metadata::default(),
        spec: ClusterSpec {
            hosts: hosts
                .into_iter()
                .map(|(addr, files)| HostSpec {
                    ssh: SshSpec::new(addr),
                    files,
                })
                .collect(),
        },
    }
}

fn pattern(dir: &Path, glob: &str) -> String {
    format!("{}/{glob}", dir.display())
}

#[tokio::test]
async fn test_glob_matches_install_in_sorted_order() {
    let dir = fixture(&["b.conf", "a.conf", "skip.txt"]);
    let config = cluster(vec![(
        "h1",
        vec![file(pattern(dir.path(), "*.conf"), "", "/etc/app", "0640")],
    )]);
    let connector = RecordingConnector::default();
    let reporter = CollectingReporter::default();

    let mut phase = UploadFiles::new(&connector, GlobMatcher, &reporter);
    let outcome = run_phase(&mut phase, &config, &reporter).await.expect("run");
    assert_eq!(outcome, PhaseOutcome::Completed);

    let a = dir.path().join("a.conf").display().to_string();
    let b = dir.path().join("b.conf").display().to_string();
    assert_eq!(
        connector.entries(),
        [
            "h1: mktemp /tmp/scratch.1".to_string(),
            format!("h1: upload {a} -> /tmp/scratch.1"),
            "h1: Root install -m 0640 -D /tmp/scratch.1 /etc/app/a.conf".to_string(),
            "h1: User rm -f -- /tmp/scratch.1".to_string(),
            "h1: mktemp /tmp/scratch.2".to_string(),
            format!("h1: upload {b} -> /tmp/scratch.2"),
            "h1: Root install -m 0640 -D /tmp/scratch.2 /etc/app/b.conf".to_string(),
            "h1: User rm -f -- /tmp/scratch.2".to_string(),
        ]
    );
    let messages = reporter.messages.borrow();
    assert!(messages.contains(&"success [ssh] h1:22: 2 file(s) installed".to_string()));
}

#[tokio::test]
async fn test_url_and_local_file_share_one_host() {
    let dir = fixture(&["tool"]);
    let config = cluster(vec![(
        "h1",
        vec![
            file(
                "https://example.com/agent.tar.gz".into(),
                "",
                "/opt/agent",
                "0644",
            ),
            file(pattern(dir.path(), "tool"), "/usr/local/bin/tool", "", "0755"),
        ],
    )]);
    let connector = RecordingConnector::default();
    let reporter = CollectingReporter::default();

    let mut phase = UploadFiles::new(&connector, GlobMatcher, &reporter);
    run_phase(&mut phase, &config, &reporter).await.expect("run");

    let entries = connector.entries();
    assert_eq!(
        entries[1],
        "h1: download https://example.com/agent.tar.gz -> /tmp/scratch.1"
    );
    assert_eq!(
        entries[2],
        "h1: Root install -m 0644 -D /tmp/scratch.1 /opt/agent/agent.tar.gz"
    );
    assert_eq!(
        entries[6],
        "h1: Root install -m 0755 -D /tmp/scratch.2 /usr/local/bin/tool"
    );
}

#[tokio::test]
async fn test_failing_host_does_not_stop_healthy_host() {
    let dir = fixture(&["a.conf"]);
    let spec = || vec![file(pattern(dir.path(), "a.conf"), "", "/etc", "0644")];
    let config = cluster(vec![("good", spec()), ("bad", spec())]);
    let connector = RecordingConnector {
        failures: vec![("bad".into(), "install".into())],
        ..Default::default()
    };
    let reporter = CollectingReporter::default();

    let mut phase = UploadFiles::new(&connector, GlobMatcher, &reporter);
    let err = run_phase(&mut phase, &config, &reporter)
        .await
        .unwrap_err();

    let dist = err
        .downcast_ref::<DistributionError>()
        .expect("distribution error");
    assert_eq!(dist.failures.len(), 1);
    let failure = dist.for_host("[ssh] bad:22").expect("bad host failure");
    assert!(format!("{failure:#}").contains("permission denied"));

    let entries = connector.entries();
    assert!(entries.contains(&"good: Root install -m 0644 -D /tmp/scratch.1 /etc/a.conf".to_string()));
    assert!(
        entries.contains(&"bad: User rm -f -- /tmp/scratch.1".to_string()),
        "scratch removed after failed install"
    );
}

#[tokio::test]
async fn test_ambiguous_destination_fails_before_any_remote_call() {
    let dir = fixture(&["a.conf", "b.conf"]);
    let config = cluster(vec![(
        "h1",
        vec![file(pattern(dir.path(), "*.conf"), "/etc/one.conf", "", "0644")],
    )]);
    let connector = RecordingConnector::default();
    let reporter = CollectingReporter::default();

    let mut phase = UploadFiles::new(&connector, GlobMatcher, &reporter);
    let err = run_phase(&mut phase, &config, &reporter)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("multiple files (2)"));
    assert!(connector.entries().is_empty());
}
