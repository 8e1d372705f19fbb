//! Teleport state machine
//!
//! ```text
//! Idle → Requested ─ same scene ──────────────────────────────────▶ Positioning
//!                  └ cross scene → SceneLoading → WaitingPlayerReady ─┘     │
//!                                                                  SafetyCheck (2 passes) → Idle
//! ```
//!
//! Driven by [`TeleportOrchestrator::tick`]; one run at a time. Only this
//! type writes the player's position.

use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::TeleportConfig;
use crate::error::{BenchError, Result};
use crate::geometry::Vec2;
use crate::host::{Notice, NoticeKind, PlayerControl, SceneControl, WorldQuery};
use crate::logging;
use crate::teleport::{choose_entry_point, find_safe_position, resolve_marker};

/// Where in the target scene to put the player.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetPoint {
    /// A named marker, resolved once the scene is active.
    Marker(String),
    Absolute(Vec2),
    /// `offset` from the anchor's live position; `fallback` if the anchor is gone.
    Anchored {
        anchor: String,
        offset: Vec2,
        fallback: Vec2,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeleportRequest {
    pub scene: String,
    pub point: TargetPoint,
    /// Transition to enter through; chosen heuristically when `None`.
    pub entry: Option<String>,
}

impl TeleportRequest {
    pub fn to_marker(scene: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            point: TargetPoint::Marker(marker.into()),
            entry: None,
        }
    }

    pub fn to_position(scene: impl Into<String>, position: Vec2) -> Self {
        Self {
            scene: scene.into(),
            point: TargetPoint::Absolute(position),
            entry: None,
        }
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    fn target_label(&self) -> String {
        match &self.point {
            TargetPoint::Marker(marker) => marker.clone(),
            TargetPoint::Absolute(p) => p.to_string(),
            TargetPoint::Anchored { anchor, offset, .. } => format!("{} {}", anchor, offset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeleportPhase {
    Idle,
    Requested,
    SceneLoading {
        deadline: Instant,
    },
    WaitingPlayerReady {
        deadline: Instant,
        /// Set once the player is ready; positioning waits until then.
        settle_until: Option<Instant>,
    },
    Positioning {
        stood_up: bool,
    },
    SafetyCheck {
        second_pass: bool,
    },
}

impl TeleportPhase {
    pub fn name(&self) -> &'static str {
        match self {
            TeleportPhase::Idle => "idle",
            TeleportPhase::Requested => "requested",
            TeleportPhase::SceneLoading { .. } => "scene_loading",
            TeleportPhase::WaitingPlayerReady { .. } => "waiting_player_ready",
            TeleportPhase::Positioning { .. } => "positioning",
            TeleportPhase::SafetyCheck { .. } => "safety_check",
        }
    }
}

/// How a run ended. Reported exactly once per run.
#[derive(Debug, Clone, PartialEq)]
pub enum TeleportOutcome {
    Arrived {
        scene: String,
        position: Vec2,
        /// The safety probe moved the player off the resolved point.
        adjusted: bool,
    },
    Aborted(BenchError),
}

impl TeleportOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            TeleportOutcome::Arrived { .. } => Notice::of(NoticeKind::Teleported),
            TeleportOutcome::Aborted(e) => Notice::from_error(NoticeKind::TeleportFailed, e),
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveRun {
    request: TeleportRequest,
    cross_scene: bool,
    started: Instant,
    landed: Option<Vec2>,
    adjusted: bool,
}

enum Step {
    /// Evaluate the next phase in the same tick.
    Continue,
    /// Wait for the next tick.
    Yield,
    Done(TeleportOutcome),
}

#[derive(Debug)]
pub struct TeleportOrchestrator {
    config: TeleportConfig,
    phase: TeleportPhase,
    run: Option<ActiveRun>,
}

impl TeleportOrchestrator {
    pub fn new(config: TeleportConfig) -> Self {
        Self {
            config,
            phase: TeleportPhase::Idle,
            run: None,
        }
    }

    pub fn phase(&self) -> TeleportPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TeleportPhase::Idle
    }

    /// Start a run. Refused with [`BenchError::Busy`] unless idle.
    pub fn request(&mut self, request: TeleportRequest, now: Instant) -> Result<()> {
        if !self.is_idle() {
            debug!(scene = %request.scene, phase = self.phase.name(), "Teleport refused, busy");
            return Err(BenchError::Busy);
        }
        logging::log_teleport_event("requested", &request.scene, Some(&request.target_label()));
        self.run = Some(ActiveRun {
            request,
            cross_scene: false,
            started: now,
            landed: None,
            adjusted: false,
        });
        self.phase = TeleportPhase::Requested;
        Ok(())
    }

    /// Advance the run. Returns the outcome on the tick the run ends.
    pub fn tick<H>(&mut self, host: &mut H, now: Instant) -> Option<TeleportOutcome>
    where
        H: WorldQuery + PlayerControl + SceneControl,
    {
        loop {
            let step = match self.run.as_mut() {
                None => return None,
                Some(run) => Self::step(&self.config, &mut self.phase, run, host, now),
            };
            match step {
                Step::Continue => continue,
                Step::Yield => return None,
                Step::Done(outcome) => {
                    self.finish(host, &outcome, now);
                    return Some(outcome);
                }
            }
        }
    }

    fn step<H>(
        config: &TeleportConfig,
        phase: &mut TeleportPhase,
        run: &mut ActiveRun,
        host: &mut H,
        now: Instant,
    ) -> Step
    where
        H: WorldQuery + PlayerControl + SceneControl,
    {
        let scene = run.request.scene.clone();
        match *phase {
            TeleportPhase::Idle => Step::Yield,

            TeleportPhase::Requested => {
                if host.active_scene() == scene {
                    *phase = TeleportPhase::Positioning { stood_up: false };
                    return Step::Continue;
                }
                let entry = run
                    .request
                    .entry
                    .clone()
                    .unwrap_or_else(|| choose_entry_point(&host.transition_points(&scene)));
                run.cross_scene = true;
                host.set_input_blocked(true);
                host.begin_transition(&scene, &entry);
                logging::log_teleport_event("scene_loading", &scene, Some(&entry));
                *phase = TeleportPhase::SceneLoading {
                    deadline: now + config.scene_load_timeout(),
                };
                Step::Yield
            }

            TeleportPhase::SceneLoading { deadline } => {
                if host.active_scene() == scene {
                    debug!(scene = %scene, "Target scene active");
                    *phase = TeleportPhase::WaitingPlayerReady {
                        deadline: now + config.player_ready_timeout(),
                        settle_until: None,
                    };
                    return Step::Continue;
                }
                if now >= deadline {
                    return Step::Done(TeleportOutcome::Aborted(BenchError::Timeout {
                        stage: "scene load",
                        waited_ms: now.saturating_duration_since(run.started).as_millis() as u64,
                    }));
                }
                Step::Yield
            }

            TeleportPhase::WaitingPlayerReady {
                deadline,
                settle_until,
            } => match settle_until {
                Some(until) if now >= until => {
                    *phase = TeleportPhase::Positioning { stood_up: false };
                    Step::Continue
                }
                Some(_) => Step::Yield,
                None if host.player_input_ready() => {
                    *phase = TeleportPhase::WaitingPlayerReady {
                        deadline,
                        settle_until: Some(now + config.arrival_settle()),
                    };
                    Step::Continue
                }
                None if now >= deadline => {
                    warn!(scene = %scene, "Player not ready before timeout, positioning anyway");
                    *phase = TeleportPhase::Positioning { stood_up: false };
                    Step::Continue
                }
                None => Step::Yield,
            },

            TeleportPhase::Positioning { stood_up } => {
                if !stood_up && host.is_sitting() {
                    host.force_stand();
                    *phase = TeleportPhase::Positioning { stood_up: true };
                    return Step::Yield;
                }

                let Some(target) = Self::resolve_target(config, &run.request.point, &*host) else {
                    let name = run.request.target_label();
                    return Step::Done(TeleportOutcome::Aborted(BenchError::lookup("marker", name)));
                };
                let position = host.ground_point(target).unwrap_or(target);

                host.set_player_position(position);
                host.clear_motion();
                host.snap_camera();
                run.landed = Some(position);
                logging::log_teleport_event("positioned", &scene, Some(&position.to_string()));

                *phase = TeleportPhase::SafetyCheck { second_pass: false };
                Step::Continue
            }

            TeleportPhase::SafetyCheck { second_pass } => {
                let current = host.player_position().or(run.landed);
                if let (Some(current), Some(size)) = (current, host.player_bounds()) {
                    let (safe, moved) =
                        find_safe_position(&*host, current, size, config.last_resort_lift);
                    if moved {
                        debug!(from = %current, to = %safe, second_pass, "Safety probe moved player");
                        host.set_player_position(safe);
                        host.snap_camera();
                        run.landed = Some(safe);
                        run.adjusted = true;
                    }
                }
                if !second_pass {
                    *phase = TeleportPhase::SafetyCheck { second_pass: true };
                    return Step::Yield;
                }
                Step::Done(TeleportOutcome::Arrived {
                    scene,
                    position: run.landed.unwrap_or_default(),
                    adjusted: run.adjusted,
                })
            }
        }
    }

    fn resolve_target(
        config: &TeleportConfig,
        point: &TargetPoint,
        world: &dyn WorldQuery,
    ) -> Option<Vec2> {
        match point {
            TargetPoint::Marker(marker) => resolve_marker(world, marker, config.nearby_rest_radius),
            TargetPoint::Absolute(position) => Some(*position),
            TargetPoint::Anchored {
                anchor,
                offset,
                fallback,
            } => Some(
                world
                    .marker_position(anchor)
                    .map(|a| a + *offset)
                    .unwrap_or(*fallback),
            ),
        }
    }

    fn finish<H: PlayerControl>(&mut self, host: &mut H, outcome: &TeleportOutcome, now: Instant) {
        let Some(run) = self.run.take() else {
            return;
        };
        self.phase = TeleportPhase::Idle;
        if run.cross_scene {
            host.set_input_blocked(false);
        }

        let elapsed_ms = now.saturating_duration_since(run.started).as_millis() as u64;
        match outcome {
            TeleportOutcome::Arrived {
                scene,
                position,
                adjusted,
            } => {
                info!(
                    event_type = "teleport",
                    scene = %scene,
                    position = %position,
                    adjusted,
                    cross_scene = run.cross_scene,
                    elapsed_ms,
                    "Teleport finished"
                );
            }
            TeleportOutcome::Aborted(error) => {
                warn!(
                    event_type = "teleport",
                    scene = %run.request.scene,
                    error = %error,
                    elapsed_ms,
                    "Teleport aborted"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
