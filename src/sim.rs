//! In-memory host for tests and the `simulate` command.
//!
//! Scenes load after a configurable number of frames; the player becomes
//! input-ready a few frames after arriving. Call [`SimHost::advance_frame`]
//! once per tick.

use std::collections::HashMap;

use anyhow::bail;

use crate::geometry::Vec2;
use crate::host::{
    AnchorMarker, Notice, Notifier, PersistenceStore, PlayerControl, SceneControl,
    TransitionPoint, WorldQuery,
};

/// Axis-aligned solid terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl TerrainBox {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    fn intersects(&self, center: Vec2, size: Vec2) -> bool {
        let (hx, hy) = (size.x / 2.0, size.y / 2.0);
        center.x + hx > self.min.x
            && center.x - hx < self.max.x
            && center.y + hy > self.min.y
            && center.y - hy < self.max.y
    }
}

#[derive(Debug, Clone)]
struct LoadingScene {
    scene: String,
    frames_left: u32,
}

#[derive(Debug, Clone)]
pub struct SimHost {
    pub active: String,
    pub zones: HashMap<String, String>,
    pub localized: HashMap<String, String>,
    pub known_scenes: Option<Vec<String>>,
    pub markers: HashMap<String, Vec<AnchorMarker>>,
    pub rest_spots: HashMap<String, Vec<Vec2>>,
    pub transitions: HashMap<String, Vec<TransitionPoint>>,
    pub terrain: HashMap<String, Vec<TerrainBox>>,
    pub camera_width: Option<f32>,

    pub player_position: Option<Vec2>,
    pub player_size: Option<Vec2>,
    pub sitting: bool,
    pub input_blocked: bool,
    pub force_stands: usize,
    pub motion_clears: usize,
    pub camera_snaps: usize,
    pub respawn: Option<(String, String)>,

    /// Frames a scene transition takes. `None` never finishes loading.
    pub load_frames: Option<u32>,
    /// Frames after arrival before the player accepts input.
    pub ready_frames: u32,
    pub input_ready: bool,
    pub transition_requests: Vec<(String, String)>,
    loading: Option<LoadingScene>,
    ready_countdown: u32,

    pub storage: HashMap<String, String>,
    pub fail_saves: bool,
    pub autosaves: usize,
    pub notices: Vec<Notice>,
}

impl SimHost {
    pub fn new(active: &str) -> Self {
        Self {
            active: active.to_string(),
            zones: HashMap::new(),
            localized: HashMap::new(),
            known_scenes: None,
            markers: HashMap::new(),
            rest_spots: HashMap::new(),
            transitions: HashMap::new(),
            terrain: HashMap::new(),
            camera_width: None,
            player_position: Some(Vec2::ZERO),
            player_size: Some(Vec2::new(1.0, 2.0)),
            sitting: false,
            input_blocked: false,
            force_stands: 0,
            motion_clears: 0,
            camera_snaps: 0,
            respawn: None,
            load_frames: Some(3),
            ready_frames: 2,
            input_ready: true,
            transition_requests: Vec::new(),
            loading: None,
            ready_countdown: 0,
            storage: HashMap::new(),
            fail_saves: false,
            autosaves: 0,
            notices: Vec::new(),
        }
    }

    pub fn add_zone(&mut self, scene: &str, zone: &str) {
        self.zones.insert(scene.to_string(), zone.to_string());
    }

    pub fn add_localized(&mut self, zone: &str, name: &str) {
        self.localized.insert(zone.to_string(), name.to_string());
    }

    pub fn add_marker(&mut self, scene: &str, name: &str, position: Vec2) {
        self.markers
            .entry(scene.to_string())
            .or_default()
            .push(AnchorMarker {
                name: name.to_string(),
                position,
            });
    }

    pub fn move_marker(&mut self, scene: &str, name: &str, position: Vec2) {
        if let Some(marker) = self
            .markers
            .get_mut(scene)
            .and_then(|ms| ms.iter_mut().find(|m| m.name == name))
        {
            marker.position = position;
        }
    }

    pub fn add_rest_spot(&mut self, scene: &str, position: Vec2) {
        self.rest_spots
            .entry(scene.to_string())
            .or_default()
            .push(position);
    }

    pub fn add_transition(&mut self, scene: &str, name: &str, inactive: bool) {
        self.transitions
            .entry(scene.to_string())
            .or_default()
            .push(TransitionPoint {
                name: name.to_string(),
                inactive,
            });
    }

    pub fn add_terrain(&mut self, scene: &str, terrain: TerrainBox) {
        self.terrain.entry(scene.to_string()).or_default().push(terrain);
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Put the player into a scene directly, as a death respawn does.
    pub fn respawn_into(&mut self, scene: &str, position: Vec2) {
        self.active = scene.to_string();
        self.player_position = Some(position);
        self.loading = None;
        self.input_ready = true;
    }

    /// Advance one frame of scene loading and player readiness.
    pub fn advance_frame(&mut self) {
        if let Some(loading) = self.loading.as_mut() {
            if self.load_frames.is_none() {
                return;
            }
            if loading.frames_left > 0 {
                loading.frames_left -= 1;
            }
            if loading.frames_left == 0 {
                self.active = loading.scene.clone();
                self.loading = None;
                self.input_ready = false;
                self.ready_countdown = self.ready_frames;
            }
            return;
        }
        if !self.input_ready {
            if self.ready_countdown == 0 {
                self.input_ready = true;
            } else {
                self.ready_countdown -= 1;
            }
        }
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl WorldQuery for SimHost {
    fn zone_key(&self, scene: &str) -> Option<String> {
        self.zones.get(scene).cloned()
    }

    fn localized_zone_name(&self, zone_key: &str) -> Option<String> {
        self.localized.get(zone_key).cloned()
    }

    fn is_known_scene(&self, scene: &str) -> Option<bool> {
        self.known_scenes
            .as_ref()
            .map(|known| known.iter().any(|s| s == scene))
    }

    fn anchor_markers(&self) -> Vec<AnchorMarker> {
        self.markers.get(&self.active).cloned().unwrap_or_default()
    }

    fn rest_spots(&self) -> Vec<Vec2> {
        self.rest_spots.get(&self.active).cloned().unwrap_or_default()
    }

    fn camera_view_width(&self) -> Option<f32> {
        self.camera_width
    }

    fn overlaps_terrain(&self, center: Vec2, size: Vec2) -> bool {
        self.terrain
            .get(&self.active)
            .is_some_and(|boxes| boxes.iter().any(|b| b.intersects(center, size)))
    }

    fn known_bench_markers(&self) -> Vec<(String, String)> {
        let mut all: Vec<(String, String)> = self
            .markers
            .iter()
            .flat_map(|(scene, markers)| {
                markers
                    .iter()
                    .filter(|m| m.name.contains("RestBench"))
                    .map(move |m| (scene.clone(), m.name.clone()))
            })
            .collect();
        all.sort();
        all
    }
}

impl PlayerControl for SimHost {
    fn player_position(&self) -> Option<Vec2> {
        self.player_position
    }

    fn set_player_position(&mut self, position: Vec2) {
        self.player_position = Some(position);
    }

    fn is_sitting(&self) -> bool {
        self.sitting
    }

    fn force_stand(&mut self) {
        self.sitting = false;
        self.force_stands += 1;
    }

    fn clear_motion(&mut self) {
        self.motion_clears += 1;
    }

    fn player_bounds(&self) -> Option<Vec2> {
        self.player_size
    }

    fn set_input_blocked(&mut self, blocked: bool) {
        self.input_blocked = blocked;
    }

    fn snap_camera(&mut self) {
        self.camera_snaps += 1;
    }

    fn respawn_point(&self) -> Option<(String, String)> {
        self.respawn.clone()
    }
}

impl SceneControl for SimHost {
    fn active_scene(&self) -> String {
        self.active.clone()
    }

    fn begin_transition(&mut self, scene: &str, entry_point: &str) {
        self.transition_requests
            .push((scene.to_string(), entry_point.to_string()));
        self.loading = Some(LoadingScene {
            scene: scene.to_string(),
            frames_left: self.load_frames.unwrap_or(0),
        });
    }

    fn transition_points(&self, scene: &str) -> Vec<TransitionPoint> {
        self.transitions.get(scene).cloned().unwrap_or_default()
    }

    fn player_input_ready(&self) -> bool {
        self.input_ready && self.loading.is_none()
    }
}

impl PersistenceStore for SimHost {
    fn load_value(&self, key: &str) -> Option<String> {
        self.storage.get(key).cloned()
    }

    fn save_value(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail_saves {
            bail!("simulated write failure for {}", key);
        }
        self.storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn request_autosave(&mut self) -> anyhow::Result<()> {
        self.autosaves += 1;
        Ok(())
    }
}

impl Notifier for SimHost {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
