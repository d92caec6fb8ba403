use std::time::Duration;

use pingr_common::network::{
    host::Host,
    outcome::{ProbeError, ProbeOutcome},
};
use pingr_core::scheduler::{ProbeScheduler, SchedulerSummary};
use tokio::time::timeout;

use crate::utils::{Fake, PanickingProber, ScriptedProber, host_set, hosts, shared};

const HANG_GUARD: Duration = Duration::from_secs(5);

#[tokio::test]
async fn mixed_outcomes_yield_only_reachable_host() {
    let prober = shared(
        ScriptedProber::new()
            .host("10.0.0.1", Fake::Reachable)
            .host("10.0.0.2", Fake::Unreachable)
            .host("badhost", Fake::ResolutionFailure),
    );
    let scheduler = ProbeScheduler::new(prober.clone());

    let (found, summary) = scheduler
        .collect(hosts(&["10.0.0.1", "10.0.0.2", "badhost"]))
        .await;

    assert_eq!(host_set(found), host_set(hosts(&["10.0.0.1"])));
    assert_eq!(
        summary,
        SchedulerSummary {
            dispatched: 3,
            reachable: 1,
            unreachable: 1,
            errors: 1,
            ..summary
        }
    );
    assert_eq!(prober.calls(), 3);
}

#[tokio::test]
async fn every_host_is_dispatched_and_reported() {
    let names: Vec<String> = (0..50).map(|i| format!("10.1.0.{i}")).collect();
    let input: Vec<Host> = names.iter().map(|n| Host::from(n.as_str())).collect();
    let prober = shared(ScriptedProber::new());
    let scheduler = ProbeScheduler::new(prober.clone());

    let mut stream = scheduler.run_outcomes(input);
    let mut reports = 0;
    while let Some(_report) = stream.recv().await {
        reports += 1;
    }

    assert_eq!(reports, 50);
    assert_eq!(prober.calls(), 50);
    assert_eq!(stream.summary().dispatched, 50);
    assert_eq!(stream.summary().completed(), 50);
}

#[tokio::test]
async fn output_is_subset_of_input_and_keeps_duplicates() {
    let prober = shared(
        ScriptedProber::new()
            .host("a", Fake::Reachable)
            .host("b", Fake::Unreachable)
            .host("", Fake::ResolutionFailure),
    );
    let scheduler = ProbeScheduler::new(prober);
    let input = hosts(&["a", "b", "a", "", "c", "a"]);

    let (found, _) = scheduler.collect(input.clone()).await;

    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|h| input.contains(h)));
    assert!(found.iter().all(|h| h.as_str() == "a"));
}

#[tokio::test]
async fn transport_error_is_omitted_and_counted() {
    let prober = shared(
        ScriptedProber::new()
            .host("10.0.0.1", Fake::PermissionDenied)
            .host("10.0.0.2", Fake::Reachable),
    );
    let scheduler = ProbeScheduler::new(prober);

    let mut stream = scheduler.run_outcomes(hosts(&["10.0.0.1", "10.0.0.2"]));
    let mut saw_permission_error = false;
    while let Some(report) = stream.recv().await {
        if let ProbeOutcome::Error(ProbeError::Permission(_)) = report.outcome {
            assert_eq!(report.host.as_str(), "10.0.0.1");
            saw_permission_error = true;
        }
    }
    assert!(saw_permission_error);

    let (found, summary) = scheduler.collect(hosts(&["10.0.0.1", "10.0.0.2"])).await;
    assert_eq!(found, hosts(&["10.0.0.2"]));
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.transport_errors, 1);
    assert_eq!(summary.construction_errors, 0);
}

#[tokio::test]
async fn repeated_runs_yield_same_set() {
    let prober = shared(
        ScriptedProber::new()
            .host("alpha", Fake::Reachable)
            .host_after("beta", Fake::Reachable, Duration::from_millis(20))
            .host("gamma", Fake::Unreachable)
            .host("delta", Fake::ResolutionFailure),
    );
    let scheduler = ProbeScheduler::new(prober);
    let input = hosts(&["alpha", "beta", "gamma", "delta"]);

    let (first, _) = scheduler.collect(input.clone()).await;
    let (second, _) = scheduler.collect(input).await;

    assert_eq!(host_set(first), host_set(second));
}

#[tokio::test]
async fn empty_input_closes_without_dispatching() {
    let prober = shared(ScriptedProber::new());
    let scheduler = ProbeScheduler::new(prober.clone());

    let mut stream = scheduler.run(Vec::new());
    let next = timeout(HANG_GUARD, stream.recv()).await.expect("stream hung");

    assert_eq!(next, None);
    assert_eq!(prober.calls(), 0);
    assert_eq!(stream.summary().dispatched, 0);
}

#[tokio::test]
async fn all_reachable_emits_each_host_once() {
    let names = ["h1", "h2", "h3", "h4", "h5"];
    let prober = names
        .iter()
        .fold(ScriptedProber::new(), |p, name| p.host(name, Fake::Reachable));
    let scheduler = ProbeScheduler::new(shared(prober));

    let mut stream = scheduler.run(hosts(&names));
    let mut emitted: Vec<Host> = Vec::new();
    while let Some(host) = timeout(HANG_GUARD, stream.recv()).await.expect("stream hung") {
        emitted.push(host);
    }

    assert_eq!(emitted.len(), 5);
    assert_eq!(host_set(emitted), host_set(hosts(&names)));
}

#[tokio::test]
async fn results_arrive_in_completion_order() {
    let prober = shared(
        ScriptedProber::new()
            .host_after("slow", Fake::Reachable, Duration::from_millis(400))
            .host_after("medium", Fake::Reachable, Duration::from_millis(200))
            .host("fast", Fake::Reachable),
    );
    let scheduler = ProbeScheduler::new(prober);

    let (found, _) = scheduler.collect(hosts(&["slow", "medium", "fast"])).await;

    assert_eq!(found, hosts(&["fast", "medium", "slow"]));
}

#[tokio::test]
async fn panicking_probe_still_reports_and_closes() {
    let scheduler = ProbeScheduler::new(shared(PanickingProber));

    let mut stream = scheduler.run_outcomes(hosts(&["ok", "boom"]));
    let mut failed: Vec<Host> = Vec::new();
    let mut reports = 0;
    while let Some(report) = timeout(HANG_GUARD, stream.recv()).await.expect("stream hung") {
        reports += 1;
        if let ProbeOutcome::Error(ProbeError::TaskFailed(_)) = report.outcome {
            failed.push(report.host);
        }
    }

    assert_eq!(reports, 2);
    assert_eq!(failed, hosts(&["boom"]));
    assert_eq!(stream.summary().errors, 1);
    assert_eq!(stream.summary().task_failures, 1);
    assert_eq!(stream.summary().reachable, 1);
}
