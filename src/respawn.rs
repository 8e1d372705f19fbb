//! Quick rest: a player-armed respawn override.
//!
//! Arming captures the player's spot as an anchor plus offset. After the next
//! death, once the respawn scene has settled, the player is teleported there.
//! The override stays armed until the player disarms it; it fires at most
//! once per death.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{BenchError, Result, ResultExt};
use crate::geometry::Vec2;
use crate::host::{Notice, NoticeKind, Notifier, PersistenceStore, PlayerControl, SceneControl, WorldQuery};
use crate::teleport::{nearest_anchor, TargetPoint, TeleportRequest};

pub const QUICK_REST_KEY: &str = "quickRest";

/// The armed spot. `offset` is relative to `anchor` when one was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickRestPoint {
    pub scene: String,
    pub position: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default)]
    pub offset: Vec2,
}

impl QuickRestPoint {
    pub fn teleport_request(&self) -> TeleportRequest {
        let point = match &self.anchor {
            Some(anchor) => TargetPoint::Anchored {
                anchor: anchor.clone(),
                offset: self.offset,
                fallback: self.position,
            },
            None => TargetPoint::Absolute(self.position),
        };
        TeleportRequest {
            scene: self.scene.clone(),
            point,
            entry: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RespawnOverride {
    armed: Option<QuickRestPoint>,
    just_died: bool,
    settle: Duration,
}

impl RespawnOverride {
    pub fn new(settle: Duration) -> Self {
        Self {
            armed: None,
            just_died: false,
            settle,
        }
    }

    pub fn armed(&self) -> Option<&QuickRestPoint> {
        self.armed.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn just_died(&self) -> bool {
        self.just_died
    }

    /// Restore an armed point saved in an earlier session.
    pub fn load(&mut self, store: &dyn PersistenceStore) {
        let Some(raw) = store.load_value(QUICK_REST_KEY).filter(|r| !r.trim().is_empty()) else {
            return;
        };
        match serde_json::from_str::<QuickRestPoint>(&raw) {
            Ok(point) => {
                debug!(scene = %point.scene, "Restored quick rest point");
                self.armed = Some(point);
            }
            Err(e) => warn!(error = %e, "Ignoring unreadable quick rest point"),
        }
    }

    /// Arm at the player's current spot, or disarm when already armed.
    /// Returns whether the override is now armed.
    pub fn toggle<H>(&mut self, host: &mut H) -> Result<bool>
    where
        H: WorldQuery + PlayerControl + SceneControl + PersistenceStore + Notifier,
    {
        if self.armed.take().is_some() {
            self.just_died = false;
            host.save_value(QUICK_REST_KEY, "").warn_on_err();
            host.request_autosave().warn_on_err();
            host.notify(Notice::of(NoticeKind::QuickRestCleared));
            info!("Quick rest disarmed");
            return Ok(false);
        }

        let position = host
            .player_position()
            .ok_or_else(|| BenchError::lookup("player", "position"))?;
        let scene = host.active_scene();
        let (anchor, offset) = match nearest_anchor(&*host, position) {
            Some((name, offset)) => (Some(name), offset),
            None => (None, Vec2::ZERO),
        };
        let point = QuickRestPoint {
            scene,
            position,
            anchor,
            offset,
        };

        match serde_json::to_string(&point) {
            Ok(json) => {
                host.save_value(QUICK_REST_KEY, &json).warn_on_err();
            }
            Err(e) => warn!(error = %e, "Could not serialize quick rest point"),
        }
        host.request_autosave().warn_on_err();
        host.notify(Notice::of(NoticeKind::QuickRestArmed));
        info!(
            scene = %point.scene,
            anchor = point.anchor.as_deref().unwrap_or("-"),
            offset = %point.offset,
            "Quick rest armed"
        );
        self.armed = Some(point);
        Ok(true)
    }

    pub fn on_player_died(&mut self) {
        if self.armed.is_some() {
            self.just_died = true;
        }
    }

    /// A scene finished loading. Returns when the override should fire, if it will.
    pub fn on_scene_entered(&self, now: Instant) -> Option<Instant> {
        (self.armed.is_some() && self.just_died).then(|| now + self.settle)
    }

    /// The reposition for the death that just happened. Consumes the death.
    pub fn fire(&mut self) -> Option<TeleportRequest> {
        if !self.just_died {
            return None;
        }
        let point = self.armed.as_ref()?;
        self.just_died = false;
        debug!(scene = %point.scene, "Quick rest override firing");
        Some(point.teleport_request())
    }

    /// Teleport target for an explicit recall: the armed point, else the
    /// bench the game would respawn at.
    pub fn recall<H>(&self, host: &mut H) -> Option<TeleportRequest>
    where
        H: PlayerControl + Notifier,
    {
        if let Some(point) = &self.armed {
            return Some(point.teleport_request());
        }
        match host.respawn_point() {
            Some((scene, marker)) => Some(TeleportRequest::to_marker(scene, marker)),
            None => {
                host.notify(Notice::of(NoticeKind::NoRespawnPoint));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;
    use std::time::Duration;

    fn host() -> SimHost {
        let mut host = SimHost::new("Peak_02");
        host.add_marker("Peak_02", "Statue", Vec2::new(100.0, 20.0));
        host.player_position = Some(Vec2::new(104.0, 21.0));
        host
    }

    fn armed(host: &mut SimHost) -> RespawnOverride {
        let mut respawn = RespawnOverride::new(Duration::from_millis(1000));
        assert!(respawn.toggle(host).unwrap());
        respawn
    }

    #[test]
    fn test_arm_captures_anchor_offset_and_saves() {
        let mut host = host();
        let respawn = armed(&mut host);
        let point = respawn.armed().unwrap();
        assert_eq!(point.scene, "Peak_02");
        assert_eq!(point.anchor.as_deref(), Some("Statue"));
        assert_eq!(point.offset, Vec2::new(4.0, 1.0));
        assert_eq!(host.autosaves, 1);
        assert!(host.storage.get(QUICK_REST_KEY).is_some_and(|s| s.contains("Statue")));
        assert_eq!(host.last_notice().unwrap().kind, NoticeKind::QuickRestArmed);
    }

    #[test]
    fn test_second_toggle_disarms() {
        let mut host = host();
        let mut respawn = armed(&mut host);
        assert!(!respawn.toggle(&mut host).unwrap());
        assert!(!respawn.is_armed());
        assert_eq!(host.last_notice().unwrap().kind, NoticeKind::QuickRestCleared);

        let mut reloaded = RespawnOverride::new(Duration::ZERO);
        reloaded.load(&host);
        assert!(!reloaded.is_armed());
    }

    #[test]
    fn test_fires_once_per_death() {
        let mut host = host();
        let mut respawn = armed(&mut host);
        let t0 = Instant::now();

        assert_eq!(respawn.on_scene_entered(t0), None);
        assert!(respawn.fire().is_none());

        respawn.on_player_died();
        assert_eq!(respawn.on_scene_entered(t0), Some(t0 + Duration::from_millis(1000)));
        let request = respawn.fire().unwrap();
        assert_eq!(request.scene, "Peak_02");
        assert_eq!(
            request.point,
            TargetPoint::Anchored {
                anchor: "Statue".into(),
                offset: Vec2::new(4.0, 1.0),
                fallback: Vec2::new(104.0, 21.0),
            }
        );

        assert!(respawn.fire().is_none());
        assert_eq!(respawn.on_scene_entered(t0), None);
        assert!(respawn.is_armed());
    }

    #[test]
    fn test_death_while_disarmed_is_ignored() {
        let mut respawn = RespawnOverride::new(Duration::ZERO);
        respawn.on_player_died();
        assert!(!respawn.just_died());
    }

    #[test]
    fn test_no_anchor_stores_absolute_position() {
        let mut host = SimHost::new("Void");
        host.player_position = Some(Vec2::new(7.0, 8.0));
        let mut respawn = RespawnOverride::new(Duration::ZERO);
        respawn.toggle(&mut host).unwrap();
        assert_eq!(
            respawn.armed().unwrap().teleport_request().point,
            TargetPoint::Absolute(Vec2::new(7.0, 8.0))
        );
    }

    #[test]
    fn test_armed_point_survives_reload() {
        let mut host = host();
        let respawn = armed(&mut host);
        let mut reloaded = RespawnOverride::new(Duration::ZERO);
        reloaded.load(&host);
        assert_eq!(reloaded.armed(), respawn.armed());
    }

    #[test]
    fn test_recall_order() {
        let mut host = host();
        let respawn = RespawnOverride::new(Duration::ZERO);

        assert!(respawn.recall(&mut host).is_none());
        assert_eq!(host.last_notice().unwrap().kind, NoticeKind::NoRespawnPoint);

        host.respawn = Some(("Town_01".into(), "RestBench".into()));
        assert_eq!(
            respawn.recall(&mut host),
            Some(TeleportRequest::to_marker("Town_01", "RestBench"))
        );

        let respawn = armed(&mut host);
        assert_eq!(respawn.recall(&mut host).unwrap().scene, "Peak_02");
    }
}
