use super::*;
use crate::sim::{SimHost, TerrainBox};
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

fn host() -> SimHost {
    let mut host = SimHost::new("Town_01");
    host.add_marker("Town_01", "Bench_A", Vec2::new(10.0, 5.0));
    host.add_marker("Cave_01", "Bench_C", Vec2::new(-40.0, 12.0));
    host.add_transition("Cave_01", "left1", false);
    host.add_transition("Cave_01", "door_cave", false);
    host
}

/// Tick once per frame until the run ends, returning the outcome and the tick count.
fn run_to_end(
    orch: &mut TeleportOrchestrator,
    host: &mut SimHost,
    start: Instant,
) -> (TeleportOutcome, usize) {
    let mut now = start;
    for ticks in 1..2000 {
        host.advance_frame();
        if let Some(outcome) = orch.tick(host, now) {
            return (outcome, ticks);
        }
        now += FRAME;
    }
    panic!("teleport never finished; phase {:?}", orch.phase());
}

#[test]
fn test_same_scene_positions_then_double_checks() {
    let mut host = host();
    let mut orch = TeleportOrchestrator::new(TeleportConfig::default());
    let t0 = Instant::now();

    orch.request(TeleportRequest::to_marker("Town_01", "Bench_A"), t0).unwrap();
    assert_eq!(orch.phase(), TeleportPhase::Requested);

    assert!(orch.tick(&mut host, t0).is_none());
    assert_eq!(host.player_position, Some(Vec2::new(10.0, 5.0)));
    assert_eq!(orch.phase(), TeleportPhase::SafetyCheck { second_pass: true });
    assert_eq!(host.motion_clears, 1);
    assert!(host.camera_snaps >= 1);

    let outcome = orch.tick(&mut host, t0 + FRAME).unwrap();
    assert_eq!(
        outcome,
        TeleportOutcome::Arrived {
            scene: "Town_01".into(),
            position: Vec2::new(10.0, 5.0),
            adjusted: false,
        }
    );
    assert!(orch.is_idle());
    assert!(host.transition_requests.is_empty());
    assert!(!host.input_blocked);
}

#[test]
fn test_sitting_player_stands_before_moving() {
    let mut host = host();
    host.sitting = true;
    let mut orch = TeleportOrchestrator::new(TeleportConfig::default());
    let t0 = Instant::now();
    orch.request(TeleportRequest::to_marker("Town_01", "Bench_A"), t0).unwrap();

    assert!(orch.tick(&mut host, t0).is_none());
    assert_eq!(host.force_stands, 1);
    assert_eq!(host.player_position, Some(Vec2::ZERO));

    assert!(orch.tick(&mut host, t0 + FRAME).is_none());
    assert_eq!(host.player_position, Some(Vec2::new(10.0, 5.0)));
}

#[test]
fn test_busy_while_running() {
    let mut orch = TeleportOrchestrator::new(TeleportConfig::default());
    let t0 = Instant::now();
    orch.request(TeleportRequest::to_marker("Town_01", "Bench_A"), t0).unwrap();
    assert_eq!(
        orch.request(TeleportRequest::to_marker("Town_01", "Bench_A"), t0),
        Err(BenchError::Busy)
    );
}

#[test]
fn test_cross_scene_loads_waits_and_arrives() {
    let mut host = host();
    host.load_frames = Some(3);
    host.ready_frames = 2;
    let mut orch = TeleportOrchestrator::new(TeleportConfig::default());
    let t0 = Instant::now();

    orch.request(TeleportRequest::to_marker("Cave_01", "Bench_C"), t0).unwrap();
    assert!(orch.tick(&mut host, t0).is_none());
    assert!(host.input_blocked);
    assert_eq!(
        host.transition_requests,
        vec![("Cave_01".to_string(), "door_cave".to_string())]
    );
    assert!(matches!(orch.phase(), TeleportPhase::SceneLoading { .. }));

    let (outcome, ticks) = run_to_end(&mut orch, &mut host, t0 + FRAME);
    assert_eq!(
        outcome,
        TeleportOutcome::Arrived {
            scene: "Cave_01".into(),
            position: Vec2::new(-40.0, 12.0),
            adjusted: false,
        }
    );
    // Arrival settle alone is 200ms of 16ms frames
    assert!(ticks > 12, "arrived after only {} ticks", ticks);
    assert_eq!(host.active, "Cave_01");
    assert!(!host.input_blocked);
}

#[test]
fn test_explicit_entry_point_is_used() {
    let mut host = host();
    let mut orch = TeleportOrchestrator::new(TeleportConfig::default());
    let t0 = Instant::now();
    orch.request(
        TeleportRequest::to_marker("Cave_01", "Bench_C").with_entry("left1"),
        t0,
    )
    .unwrap();
    orch.tick(&mut host, t0);
    assert_eq!(host.transition_requests[0].1, "left1");
}

#[test]
fn test_scene_load_timeout_aborts_and_unblocks() {
    let mut host = host();
    host.load_frames = None;
    let config = TeleportConfig {
        scene_load_timeout_ms: 100,
        ..TeleportConfig::default()
    };
    let mut orch = TeleportOrchestrator::new(config);
    let t0 = Instant::now();
    orch.request(TeleportRequest::to_marker("Cave_01", "Bench_C"), t0).unwrap();

    let (outcome, _) = run_to_end(&mut orch, &mut host, t0);
    match outcome {
        TeleportOutcome::Aborted(BenchError::Timeout { stage, waited_ms }) => {
            assert_eq!(stage, "scene load");
            assert!(waited_ms >= 100);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(orch.is_idle());
    assert!(!host.input_blocked);
    assert_eq!(host.active, "Town_01");
    assert_eq!(host.player_position, Some(Vec2::ZERO));
}

#[test]
fn test_player_ready_timeout_positions_anyway() {
    let mut host = host();
    host.ready_frames = 10_000;
    let config = TeleportConfig {
        player_ready_timeout_ms: 100,
        ..TeleportConfig::default()
    };
    let mut orch = TeleportOrchestrator::new(config);
    let t0 = Instant::now();
    orch.request(TeleportRequest::to_marker("Cave_01", "Bench_C"), t0).unwrap();

    let (outcome, _) = run_to_end(&mut orch, &mut host, t0);
    assert!(matches!(outcome, TeleportOutcome::Arrived { .. }));
    assert_eq!(host.player_position, Some(Vec2::new(-40.0, 12.0)));
}

#[test]
fn test_missing_marker_aborts_without_moving() {
    let mut host = host();
    let mut orch = TeleportOrchestrator::new(TeleportConfig::default());
    let t0 = Instant::now();
    orch.request(TeleportRequest::to_marker("Town_01", "Nowhere"), t0).unwrap();

    let outcome = orch.tick(&mut host, t0).unwrap();
    assert_eq!(
        outcome,
        TeleportOutcome::Aborted(BenchError::lookup("marker", "Nowhere"))
    );
    let notice = outcome.notice();
    assert_eq!(notice.kind, NoticeKind::TeleportFailed);
    assert_eq!(notice.severity, crate::error::ErrorSeverity::Warning);
    assert_eq!(notice.text, "Teleport failed: marker not found");
    assert_eq!(host.player_position, Some(Vec2::ZERO));
    assert!(orch.is_idle());
}

#[test]
fn test_overlap_is_corrected() {
    let mut host = host();
    // Ledge top at y = 5.5, the marker sits half inside it
    host.add_terrain(
        "Town_01",
        TerrainBox::new(Vec2::new(0.0, 0.0), Vec2::new(20.0, 5.5)),
    );
    let mut orch = TeleportOrchestrator::new(TeleportConfig::default());
    let t0 = Instant::now();
    orch.request(TeleportRequest::to_marker("Town_01", "Bench_A"), t0).unwrap();

    let (outcome, _) = run_to_end(&mut orch, &mut host, t0);
    assert_eq!(
        outcome,
        TeleportOutcome::Arrived {
            scene: "Town_01".into(),
            position: Vec2::new(10.0, 7.0),
            adjusted: true,
        }
    );
    assert_eq!(outcome.notice().kind, NoticeKind::Teleported);
}

#[test]
fn test_second_pass_catches_late_overlap() {
    let mut host = host();
    let mut orch = TeleportOrchestrator::new(TeleportConfig::default());
    let t0 = Instant::now();
    orch.request(TeleportRequest::to_marker("Town_01", "Bench_A"), t0).unwrap();
    assert!(orch.tick(&mut host, t0).is_none());

    // Terrain streams in after the first pass
    host.add_terrain(
        "Town_01",
        TerrainBox::new(Vec2::new(0.0, 0.0), Vec2::new(20.0, 5.5)),
    );
    match orch.tick(&mut host, t0 + FRAME) {
        Some(TeleportOutcome::Arrived { adjusted, .. }) => assert!(adjusted),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_anchored_target_uses_live_anchor_or_fallback() {
    let mut host = host();
    host.move_marker("Town_01", "Bench_A", Vec2::new(12.0, 5.0));
    let mut orch = TeleportOrchestrator::new(TeleportConfig::default());
    let t0 = Instant::now();

    let anchored = |anchor: &str| TeleportRequest {
        scene: "Town_01".into(),
        point: TargetPoint::Anchored {
            anchor: anchor.into(),
            offset: Vec2::new(1.0, 0.5),
            fallback: Vec2::new(3.0, 3.0),
        },
        entry: None,
    };

    orch.request(anchored("Bench_A"), t0).unwrap();
    let (outcome, _) = run_to_end(&mut orch, &mut host, t0);
    assert!(matches!(
        outcome,
        TeleportOutcome::Arrived { position, .. } if position == Vec2::new(13.0, 5.5)
    ));

    orch.request(anchored("Gone"), t0).unwrap();
    let (outcome, _) = run_to_end(&mut orch, &mut host, t0);
    assert!(matches!(
        outcome,
        TeleportOutcome::Arrived { position, .. } if position == Vec2::new(3.0, 3.0)
    ));
}
