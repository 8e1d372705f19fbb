//! Collaborator interfaces implemented by the surrounding game host.
//!
//! Each trait is a narrow capability the core consumes; an adapter layer
//! implements them against the concrete engine. Components are generic over
//! [`Host`], the union of all of them.

use crate::error::{BenchError, ErrorSeverity};
use crate::geometry::Vec2;

/// A named anchor in the active scene.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorMarker {
    pub name: String,
    pub position: Vec2,
}

/// A scene transition (door, edge exit) usable as an entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPoint {
    pub name: String,
    pub inactive: bool,
}

/// Read-only queries against the live world.
pub trait WorldQuery {
    /// Canonical zone key for a scene (the default category source).
    fn zone_key(&self, scene: &str) -> Option<String>;

    /// Player-facing zone name, when the host can localize it.
    fn localized_zone_name(&self, _zone_key: &str) -> Option<String> {
        None
    }

    /// `Some(false)` when the host's scene catalog is loaded and lacks `scene`;
    /// `None` while the catalog is not available.
    fn is_known_scene(&self, _scene: &str) -> Option<bool> {
        None
    }

    /// Anchor markers in the active scene.
    fn anchor_markers(&self) -> Vec<AnchorMarker>;

    /// Positions of rest entities (benches) in the active scene.
    fn rest_spots(&self) -> Vec<Vec2> {
        Vec::new()
    }

    /// Live position of a marker in the active scene. Origin counts as unresolved.
    fn marker_position(&self, marker: &str) -> Option<Vec2> {
        self.anchor_markers()
            .into_iter()
            .find(|m| m.name == marker)
            .map(|m| m.position)
            .filter(|p| !p.is_zero())
    }

    /// Width of the camera view in world units; `None` when not orthographic.
    fn camera_view_width(&self) -> Option<f32>;

    /// Whether a box of `size` centered at `center` intersects the terrain layer.
    fn overlaps_terrain(&self, center: Vec2, size: Vec2) -> bool;

    /// Ground point below `near`, when the host can raycast.
    fn ground_point(&self, _near: Vec2) -> Option<Vec2> {
        None
    }

    /// Every bench marker the host knows about, as `(scene, marker)`.
    fn known_bench_markers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// The single player handle. Only the teleport path writes position.
pub trait PlayerControl {
    fn player_position(&self) -> Option<Vec2>;
    fn set_player_position(&mut self, position: Vec2);
    fn is_sitting(&self) -> bool;
    fn force_stand(&mut self);
    /// Zero velocity and clear recoil/transition locks.
    fn clear_motion(&mut self);
    /// Size of the player's collision box.
    fn player_bounds(&self) -> Option<Vec2>;
    fn set_input_blocked(&mut self, blocked: bool);
    fn snap_camera(&mut self);
    /// The bench the game will respawn the player at, as `(scene, marker)`.
    fn respawn_point(&self) -> Option<(String, String)> {
        None
    }
}

/// Scene lifecycle.
pub trait SceneControl {
    fn active_scene(&self) -> String;
    fn begin_transition(&mut self, scene: &str, entry_point: &str);
    /// Transition points available in `scene`.
    fn transition_points(&self, scene: &str) -> Vec<TransitionPoint>;
    fn player_input_ready(&self) -> bool;
}

/// Opaque key/value persistence plus the game's own save hook.
pub trait PersistenceStore {
    fn load_value(&self, key: &str) -> Option<String>;
    fn save_value(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn request_autosave(&mut self) -> anyhow::Result<()>;
}

/// What a transient status message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Recorded,
    Merged,
    Rejected,
    Removed,
    Teleported,
    TeleportFailed,
    QuickRestArmed,
    QuickRestCleared,
    NoRespawnPoint,
    Repaired,
}

/// A transient status message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub severity: ErrorSeverity,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            severity: ErrorSeverity::Info,
        }
    }

    /// Notice for a failed operation; text and severity come from the error.
    pub fn from_error(kind: NoticeKind, error: &BenchError) -> Self {
        Self {
            kind,
            text: error.user_message(),
            severity: error.severity(),
        }
    }

    /// Notice with the default English text for its kind.
    pub fn of(kind: NoticeKind) -> Self {
        let text = match kind {
            NoticeKind::Recorded => "Bench recorded",
            NoticeKind::Merged => "Merged nearby bench entries",
            NoticeKind::Rejected => "Action not allowed",
            NoticeKind::Removed => "Bench removed",
            NoticeKind::Teleported => "Teleported",
            NoticeKind::TeleportFailed => "Teleport failed",
            NoticeKind::QuickRestArmed => "Quick rest point set",
            NoticeKind::QuickRestCleared => "Quick rest point cleared",
            NoticeKind::NoRespawnPoint => "No respawn point found",
            NoticeKind::Repaired => "Bench list was repaired",
        };
        Self::new(kind, text)
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Everything the core needs from the host.
pub trait Host: WorldQuery + PlayerControl + SceneControl + PersistenceStore + Notifier {}

impl<T> Host for T where T: WorldQuery + PlayerControl + SceneControl + PersistenceStore + Notifier {}
