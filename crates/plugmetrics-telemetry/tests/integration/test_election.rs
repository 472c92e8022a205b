//! Integration tests for leader election across reporter instances
//!
//! - Exactly one leader among sequentially started instances
//! - The marker survives restarts and keeps the role with the same plugin
//! - A stale marker (unloaded or unknown plugin) is taken over
//! - Concurrent starts always end with every instance attached to a leader

use std::sync::{Arc, Barrier};

use plugmetrics_core::domain::ReporterState;
use plugmetrics_telemetry::{LeaderMarker, MetricsReporter};

use crate::common::{self, Harness};

#[test]
fn test_one_leader_among_many_instances() {
    let plugins = tempfile::tempdir().unwrap();
    let harness = Harness::offline();

    let reporters: Vec<Arc<MetricsReporter>> = (0..6)
        .map(|i| harness.start(common::plugin(&format!("Plugin{i}"), "1.0", plugins.path())))
        .collect();

    let leaders: Vec<_> = reporters
        .iter()
        .filter(|r| r.state().is_active_sender())
        .collect();
    assert_eq!(leaders.len(), 1);
    assert_eq!(
        reporters
            .iter()
            .filter(|r| r.state() == ReporterState::Follower)
            .count(),
        5
    );
    assert_eq!(harness.scheduler.scheduled(), 1);

    // Every instance, the leader included, ends up as a data source.
    assert_eq!(leaders[0].registered_count(), 6);
    assert_eq!(
        leaders[0].registered_ids(),
        (0..6)
            .map(|i| format!("Plugin{i}/plugmetrics"))
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_marker_names_first_instance() {
    let plugins = tempfile::tempdir().unwrap();
    let harness = Harness::offline();

    let alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));
    let _beta = harness.start(common::plugin("Beta", "1.0", plugins.path()));

    let marker = LeaderMarker::new(alpha.paths().marker_file.clone());
    assert_eq!(marker.read().unwrap().as_deref(), Some("Alpha/plugmetrics"));
}

#[test]
fn test_restart_keeps_leader_with_same_plugin() {
    let plugins = tempfile::tempdir().unwrap();

    {
        let harness = Harness::offline();
        let _alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));
        let _beta = harness.start(common::plugin("Beta", "1.0", plugins.path()));
    }

    let harness = Harness::offline();
    let alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));
    let beta = harness.start(common::plugin("Beta", "1.0", plugins.path()));

    assert_eq!(alpha.state(), ReporterState::Submitting);
    assert_eq!(beta.state(), ReporterState::Follower);
    let marker = LeaderMarker::new(alpha.paths().marker_file.clone());
    assert_eq!(marker.read().unwrap().as_deref(), Some("Alpha/plugmetrics"));
}

#[test]
fn test_restart_in_other_order_moves_leadership() {
    let plugins = tempfile::tempdir().unwrap();

    {
        let harness = Harness::offline();
        let _alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));
    }

    // The marker still names Alpha, which is not loaded yet in this process.
    let harness = Harness::offline();
    let beta = harness.start(common::plugin("Beta", "1.0", plugins.path()));
    let alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));

    assert_eq!(beta.state(), ReporterState::Submitting);
    assert_eq!(alpha.state(), ReporterState::Follower);
    assert_eq!(beta.registered_count(), 2);
    let marker = LeaderMarker::new(beta.paths().marker_file.clone());
    assert_eq!(marker.read().unwrap().as_deref(), Some("Beta/plugmetrics"));
}

#[test]
fn test_stale_marker_is_taken_over() {
    let plugins = tempfile::tempdir().unwrap();
    let marker_file = plugins.path().join("plugmetrics/leader.txt");
    LeaderMarker::new(marker_file.clone())
        .write("Uninstalled/plugmetrics")
        .unwrap();

    let harness = Harness::offline();
    let alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));
    let beta = harness.start(common::plugin("Beta", "1.0", plugins.path()));

    assert_eq!(alpha.state(), ReporterState::Submitting);
    assert_eq!(beta.state(), ReporterState::Follower);
    assert_eq!(
        LeaderMarker::new(marker_file).read().unwrap().as_deref(),
        Some("Alpha/plugmetrics")
    );
}

#[test]
fn test_concurrent_starts_attach_every_instance_to_a_leader() {
    const INSTANCES: usize = 8;

    for _round in 0..20 {
        let plugins = tempfile::tempdir().unwrap();
        common::write_config(plugins.path(), true, false);
        let harness = Harness::offline();
        let barrier = Barrier::new(INSTANCES);

        let reporters: Vec<Arc<MetricsReporter>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..INSTANCES)
                .map(|i| {
                    let (harness, barrier, dir) = (&harness, &barrier, plugins.path());
                    scope.spawn(move || {
                        let host = common::plugin(&format!("Plugin{i}"), "1.0", dir);
                        barrier.wait();
                        harness.start(host)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // Two leaders can appear when claims interleave; every instance
        // still ends up counted by exactly one of them.
        let leaders: Vec<_> = reporters
            .iter()
            .filter(|r| r.state().is_active_sender())
            .collect();
        assert!(!leaders.is_empty());
        assert!(reporters
            .iter()
            .all(|r| r.state().is_active_sender() || r.state() == ReporterState::Follower));
        assert_eq!(
            leaders.iter().map(|l| l.registered_count()).sum::<usize>(),
            INSTANCES
        );
        assert_eq!(harness.scheduler.scheduled(), leaders.len());
    }
}
