//! Application context
//!
//! [`BenchApp`] owns the host handle and every component. The host calls the
//! `on_*` event methods as things happen in the game, [`BenchApp::key`] for
//! raw key edges, and [`BenchApp::tick`] once per frame. Everything runs on
//! that one thread; waits are timers pumped by `tick`.

use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::bench::{
    load_favorite_categories, load_zone_names, save_favorite_categories, save_zone_names,
    AddOutcome, BenchKey, BenchRegistry, BenchStore, CategoryResolver, LoadSummary, ZoneNames,
};
use crate::category::{CategoryIndex, FavoriteCategories, MenuLevel, Selection};
use crate::config::{Config, RegistryConfig, TeleportConfig, TimingConfig};
use crate::error::{BenchError, Result, ResultExt};
use crate::host::{Host, Notice, NoticeKind};
use crate::input::{Gesture, InputDisambiguator, KeyPhase, MenuKey, RepeatGate};
use crate::logging;
use crate::respawn::RespawnOverride;
use crate::scheduler::TimerQueue;
use crate::teleport::{TeleportOrchestrator, TeleportOutcome, TeleportRequest};

/// How long a quick rest override waits before retrying behind a running teleport.
const RESPAWN_RETRY: Duration = Duration::from_millis(250);

/// Something the UI layer has to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Open a text prompt to rename a bench.
    BeginRename { key: BenchKey, current: String },
    /// Open a text prompt to change one bench's category.
    BeginCategoryEdit { key: BenchKey, current: String },
    /// Open a text prompt to rename a whole category.
    BeginCategoryRename { category: String },
    MenuClosed,
    TeleportStarted(TeleportRequest),
    TeleportFinished(TeleportOutcome),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuState {
    pub open: bool,
    pub selection: Selection,
}

/// What the favorite key acts on.
#[derive(Debug, Clone, PartialEq)]
enum MenuTarget {
    Category(String),
    Bench(BenchKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerSlot {
    BenchConfirm,
    RespawnSettle,
}

#[derive(Debug, Clone)]
enum TimerTask {
    ConfirmBench { scene: String, marker: String },
    FireRespawn,
}

/// Selection identity captured before a mutation.
#[derive(Debug, Clone, Default)]
struct SelectionAnchor {
    key: Option<BenchKey>,
    category: Option<String>,
}

pub struct BenchApp<H: Host> {
    host: H,
    timing: TimingConfig,
    teleport_config: TeleportConfig,
    registry_config: RegistryConfig,

    registry: BenchRegistry,
    zones: ZoneNames,
    favorites: FavoriteCategories,
    index: CategoryIndex,
    store: BenchStore,
    menu: MenuState,

    orchestrator: TeleportOrchestrator,
    respawn: RespawnOverride,
    timers: TimerQueue<TimerSlot, TimerTask>,

    rename_key: InputDisambiguator<BenchKey>,
    category_key: InputDisambiguator<String>,
    favorite_key: InputDisambiguator<MenuTarget>,
    quick_rest_key: InputDisambiguator<()>,
    nav: RepeatGate,
    nav_delta: i32,

    scenes_checked: bool,
    entered_scene_once: bool,
    events: Vec<UiEvent>,
}

impl<H: Host> BenchApp<H> {
    pub fn new(host: H, config: &Config) -> Self {
        let timing = config.get_timing();
        let teleport_config = config.get_teleport();
        let registry_config = config.get_registry();
        Self {
            registry: BenchRegistry::new(&registry_config),
            zones: ZoneNames::new(),
            favorites: FavoriteCategories::default(),
            index: CategoryIndex::new(),
            store: BenchStore::new(),
            menu: MenuState::default(),
            orchestrator: TeleportOrchestrator::new(teleport_config.clone()),
            respawn: RespawnOverride::new(teleport_config.respawn_settle()),
            timers: TimerQueue::new(),
            rename_key: InputDisambiguator::new(timing.rename_gestures()),
            category_key: InputDisambiguator::new(timing.category_gestures()),
            favorite_key: InputDisambiguator::new(timing.favorite_gestures()),
            quick_rest_key: InputDisambiguator::new(timing.quick_rest_gestures()),
            nav: timing.nav_repeat_gate(),
            nav_delta: 0,
            scenes_checked: false,
            entered_scene_once: false,
            events: Vec::new(),
            host,
            timing,
            teleport_config,
            registry_config,
        }
    }

    // ============================================
    // ACCESSORS
    // ============================================

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn registry(&self) -> &BenchRegistry {
        &self.registry
    }

    pub fn zones(&self) -> &ZoneNames {
        &self.zones
    }

    pub fn favorites(&self) -> &FavoriteCategories {
        &self.favorites
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn orchestrator(&self) -> &TeleportOrchestrator {
        &self.orchestrator
    }

    pub fn respawn(&self) -> &RespawnOverride {
        &self.respawn
    }

    /// The category view, rebuilt first if anything changed.
    pub fn index(&mut self) -> &CategoryIndex {
        self.refresh_index();
        &self.index
    }

    pub fn category_of(&self, key: &BenchKey) -> Option<String> {
        let record = self.registry.get(key)?;
        Some(CategoryResolver::new(&self.zones, &self.host).category_for(record))
    }

    pub fn selected_key(&mut self) -> Option<BenchKey> {
        self.refresh_index();
        self.menu.selection.selected_key(&self.index, &self.registry)
    }

    pub fn selected_category(&mut self) -> Option<String> {
        self.refresh_index();
        self.menu
            .selection
            .selected_category(&self.index)
            .map(str::to_string)
    }

    // ============================================
    // GAME EVENTS
    // ============================================

    /// Load persisted state and run the once-per-session maintenance.
    #[instrument(skip_all)]
    pub fn start_session(&mut self) -> LoadSummary {
        self.zones = load_zone_names(&self.host);
        self.favorites = load_favorite_categories(&self.host);
        let summary = {
            let resolver = CategoryResolver::new(&self.zones, &self.host);
            self.store
                .load_benches(&self.host, &mut self.registry, &resolver)
        };
        if summary.resave {
            for anomaly in &summary.anomalies {
                warn!(anomaly = %anomaly, "Bench list anomaly");
            }
            self.host.notify(Notice::of(NoticeKind::Repaired));
            self.persist_benches();
        }
        self.respawn.load(&self.host);

        if self.registry_config.seed_from_respawn_point
            && self.registry.is_empty()
            && !summary.unreadable
        {
            if let Some((scene, marker)) = self.host.respawn_point() {
                debug!(scene = %scene, marker = %marker, "Seeding registry from respawn bench");
                self.record_bench(&scene, &marker, false);
            }
        }

        self.check_known_scenes();
        self.index.mark_dirty();
        self.refresh_index();
        summary
    }

    /// The player sat on a bench. Recorded after the confirm delay if they
    /// are still sitting then.
    pub fn on_bench_sat(&mut self, scene: &str, marker: &str, now: Instant) {
        self.timers.schedule(
            TimerSlot::BenchConfirm,
            now + self.teleport_config.bench_confirm_delay(),
            TimerTask::ConfirmBench {
                scene: scene.to_string(),
                marker: marker.to_string(),
            },
        );
    }

    pub fn on_player_died(&mut self) {
        self.timers.cancel_slot(&TimerSlot::BenchConfirm);
        self.respawn.on_player_died();
    }

    /// A scene finished loading and the player is in it.
    pub fn on_scene_entered(&mut self, now: Instant) {
        if !self.entered_scene_once {
            self.entered_scene_once = true;
            if self.registry_config.import_all_on_enter {
                self.import_all();
            }
        }
        self.check_known_scenes();

        if let Some(at) = self.respawn.on_scene_entered(now) {
            self.timers
                .schedule(TimerSlot::RespawnSettle, at, TimerTask::FireRespawn);
        }
    }

    /// Record every bench the host knows about. Returns how many were new.
    pub fn import_all(&mut self) -> usize {
        let anchor = self.snapshot();
        let active = self.host.active_scene();
        let mut added = 0;
        for (scene, marker) in self.host.known_bench_markers() {
            let resolver = CategoryResolver::new(&self.zones, &self.host);
            if let AddOutcome::Added(_) = self.registry.add(&scene, &marker, &active, &resolver) {
                added += 1;
            }
        }
        info!(added, total = self.registry.len(), "Imported known benches");
        self.settle(anchor);
        added
    }

    // ============================================
    // MENU
    // ============================================

    pub fn open_menu(&mut self) {
        let anchor = self.snapshot();
        let active = self.host.active_scene();
        let pruned = self.registry.prune_nearby_duplicates(&active, &self.host);
        if pruned > 0 {
            self.host.notify(Notice::of(NoticeKind::Merged));
        }
        self.menu.open = true;
        self.settle(anchor);
    }

    pub fn close_menu(&mut self) {
        if !self.menu.open {
            return;
        }
        self.menu.open = false;
        self.rename_key.reset();
        self.category_key.reset();
        self.favorite_key.reset();
        self.nav.release();
        self.events.push(UiEvent::MenuClosed);
    }

    /// Feed a raw key edge. Returns events decided immediately.
    pub fn key(&mut self, key: MenuKey, phase: KeyPhase, now: Instant) -> Vec<UiEvent> {
        match (key, phase) {
            (MenuKey::QuickRest, KeyPhase::Pressed) if !self.menu.open => {
                self.quick_rest_key.press((), now);
            }
            (MenuKey::QuickRest, KeyPhase::Released) => {
                if let Some(gesture) = self.quick_rest_key.release(now) {
                    self.on_quick_rest_gesture(gesture, now);
                }
            }
            _ if !self.menu.open => {}

            (MenuKey::Up | MenuKey::Down, KeyPhase::Pressed) => {
                self.nav_delta = if key == MenuKey::Up { -1 } else { 1 };
                if self.nav.press(now) {
                    self.step_selection(self.nav_delta);
                }
            }
            (MenuKey::Up | MenuKey::Down, KeyPhase::Released) => self.nav.release(),
            (MenuKey::Left, KeyPhase::Pressed) => self.menu.selection.back(),
            (MenuKey::Right, KeyPhase::Pressed) => {
                if let Some(target) = self.menu_target() {
                    self.favorite_key.press(target, now);
                }
            }
            (MenuKey::Right, KeyPhase::Released) => {
                if let Some(gesture) = self.favorite_key.release(now) {
                    self.on_favorite_gesture(gesture);
                }
            }
            (MenuKey::Confirm, KeyPhase::Pressed) => self.confirm(now),
            (MenuKey::Rename, KeyPhase::Pressed) => match self.menu_target() {
                Some(MenuTarget::Bench(key)) => self.rename_key.press(key, now),
                Some(MenuTarget::Category(name)) => self.category_key.press(name, now),
                None => {}
            },
            (MenuKey::Rename, KeyPhase::Released) => {
                if let Some(gesture) = self.rename_key.release(now) {
                    self.on_rename_gesture(gesture);
                }
                if let Some(gesture) = self.category_key.release(now) {
                    self.on_category_gesture(gesture);
                }
            }
            _ => {}
        }
        std::mem::take(&mut self.events)
    }

    /// Per-frame pump: timers, timed gestures, held navigation, teleport.
    pub fn tick(&mut self, now: Instant) -> Vec<UiEvent> {
        for task in self.timers.drain_due(now) {
            self.run_task(task, now);
        }

        if let Some(gesture) = self.rename_key.poll(now) {
            self.on_rename_gesture(gesture);
        }
        if let Some(gesture) = self.category_key.poll(now) {
            self.on_category_gesture(gesture);
        }
        if let Some(gesture) = self.favorite_key.poll(now) {
            self.on_favorite_gesture(gesture);
        }
        if let Some(gesture) = self.quick_rest_key.poll(now) {
            self.on_quick_rest_gesture(gesture, now);
        }

        if self.menu.open {
            for _ in 0..self.nav.poll(now) {
                self.step_selection(self.nav_delta);
            }
        }

        if let Some(outcome) = self.orchestrator.tick(&mut self.host, now) {
            self.host.notify(outcome.notice());
            self.events.push(UiEvent::TeleportFinished(outcome));
        }

        #[cfg(feature = "trace-ticks")]
        tracing::trace!(
            phase = self.orchestrator.phase().name(),
            timers = self.timers.len(),
            menu_open = self.menu.open,
            "tick"
        );

        std::mem::take(&mut self.events)
    }

    // ============================================
    // COMMANDS
    // ============================================

    pub fn commit_rename(&mut self, key: &BenchKey, name: &str) -> Result<bool> {
        let anchor = self.snapshot();
        let changed = self.registry.rename(key, name)?;
        self.settle(anchor);
        Ok(changed)
    }

    /// Move one bench to `category`. Blank reverts to its zone.
    pub fn commit_bench_category(&mut self, key: &BenchKey, category: &str) -> Result<()> {
        let anchor = self.snapshot();
        let category = category.trim();
        let stored = (!category.is_empty()).then(|| {
            CategoryResolver::new(&self.zones, &self.host).parent_for_display_name(category)
        });
        self.registry.set_category(key, stored.as_deref())?;
        self.settle(anchor);
        Ok(())
    }

    /// Rename a whole category. Returns `false` when nothing was changed.
    #[instrument(skip(self))]
    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<bool> {
        let new = new.trim();
        if new.is_empty() || new.eq_ignore_ascii_case(old) {
            return Ok(false);
        }
        self.refresh_index();
        let keys = self.index.keys_in(old, &self.registry);
        let is_mapped = self.zones.key_for_value(old).is_some();
        if keys.is_empty() && !is_mapped {
            return Err(BenchError::lookup("category", old));
        }

        let anchor = SelectionAnchor {
            key: self.menu.selection.selected_key(&self.index, &self.registry),
            category: Some(new.to_string()),
        };

        if is_mapped {
            self.zones.rename_value(old, new);
            save_zone_names(&mut self.host, &self.zones).log_err();
        } else {
            let parent =
                CategoryResolver::new(&self.zones, &self.host).parent_for_display_name(new);
            self.registry.set_parents(&keys, &parent);
        }

        if self.favorites.rename(old, new) {
            save_favorite_categories(&mut self.host, &self.favorites).log_err();
        }

        info!(from = old, to = new, benches = keys.len(), "Category renamed");
        self.settle(anchor);
        Ok(true)
    }

    pub fn toggle_favorite(&mut self, key: &BenchKey) -> Result<bool> {
        let anchor = self.snapshot();
        let favorite = self.registry.toggle_favorite(key)?;
        self.settle(anchor);
        Ok(favorite)
    }

    pub fn toggle_favorite_category(&mut self, category: &str) -> bool {
        let mut anchor = self.snapshot();
        anchor.category = Some(category.to_string());
        let favorite = self.favorites.toggle(category);
        save_favorite_categories(&mut self.host, &self.favorites).log_err();
        self.settle(anchor);
        favorite
    }

    /// Delete a bench. Favorites are refused with a notice.
    pub fn delete(&mut self, key: &BenchKey) -> Result<()> {
        let anchor = self.snapshot();
        match self.registry.remove(key) {
            Ok(_) => {
                self.host.notify(Notice::of(NoticeKind::Removed));
                self.settle(anchor);
                Ok(())
            }
            Err(e) => {
                debug!(bench = %key, error = %e, "Delete refused");
                self.host
                    .notify(Notice::from_error(NoticeKind::Rejected, &e));
                Err(e)
            }
        }
    }

    /// Teleport to a recorded bench and close the menu.
    pub fn teleport_to(&mut self, key: &BenchKey, now: Instant) -> Result<()> {
        let record = self
            .registry
            .get(key)
            .ok_or_else(|| BenchError::lookup("bench", key.to_string()))?;
        let request = TeleportRequest::to_marker(record.scene(), record.marker());
        self.start_teleport(request, now)?;
        self.close_menu();
        Ok(())
    }

    pub fn start_teleport(&mut self, request: TeleportRequest, now: Instant) -> Result<()> {
        if let Err(e) = self.orchestrator.request(request.clone(), now) {
            self.host
                .notify(Notice::from_error(NoticeKind::Rejected, &e));
            return Err(e);
        }
        self.events.push(UiEvent::TeleportStarted(request));
        Ok(())
    }

    // ============================================
    // INTERNALS
    // ============================================

    fn refresh_index(&mut self) {
        let resolver = CategoryResolver::new(&self.zones, &self.host);
        self.index
            .ensure_fresh(&self.registry, &resolver, &self.favorites);
    }

    fn snapshot(&mut self) -> SelectionAnchor {
        self.refresh_index();
        SelectionAnchor {
            key: self.menu.selection.selected_key(&self.index, &self.registry),
            category: self
                .menu
                .selection
                .selected_category(&self.index)
                .map(str::to_string),
        }
    }

    /// Persist, rebuild, and re-point the cursor at what was selected.
    fn settle(&mut self, anchor: SelectionAnchor) {
        self.persist_benches();
        self.refresh_index();
        self.menu.selection.relocate(
            &self.index,
            &self.registry,
            anchor.key.as_ref(),
            anchor.category.as_deref(),
        );
    }

    fn persist_benches(&mut self) {
        if let Err(e) = self.store.save_benches(&mut self.host, &mut self.registry) {
            logging::log_error("persistence", &format!("{:#}", e), Some("save benches"));
        }
    }

    fn check_known_scenes(&mut self) {
        if self.scenes_checked {
            return;
        }
        let active = self.host.active_scene();
        if self.host.is_known_scene(&active).is_none() {
            return;
        }
        self.scenes_checked = true;
        let anchor = self.snapshot();
        if self.registry.retain_known_scenes(&self.host) > 0 {
            self.settle(anchor);
        }
    }

    fn record_bench(&mut self, scene: &str, marker: &str, announce: bool) -> AddOutcome {
        let anchor = self.snapshot();
        let active = self.host.active_scene();
        let outcome = {
            let resolver = CategoryResolver::new(&self.zones, &self.host);
            self.registry.add(scene, marker, &active, &resolver)
        };
        match &outcome {
            AddOutcome::Added(_) if announce => self.host.notify(Notice::of(NoticeKind::Recorded)),
            AddOutcome::Merged { .. } if announce => self.host.notify(Notice::of(NoticeKind::Merged)),
            _ => {}
        }
        self.settle(anchor);
        outcome
    }

    fn run_task(&mut self, task: TimerTask, now: Instant) {
        match task {
            TimerTask::ConfirmBench { scene, marker } => {
                if self.host.is_sitting() {
                    self.record_bench(&scene, &marker, true);
                } else {
                    debug!(scene = %scene, marker = %marker, "Player left the bench before confirm");
                }
            }
            TimerTask::FireRespawn => {
                // The death stays pending until a teleport can actually start
                if !self.orchestrator.is_idle() {
                    debug!(
                        phase = self.orchestrator.phase().name(),
                        "Teleport running, deferring quick rest override"
                    );
                    self.timers.schedule(
                        TimerSlot::RespawnSettle,
                        now + RESPAWN_RETRY,
                        TimerTask::FireRespawn,
                    );
                    return;
                }
                if let Some(request) = self.respawn.fire() {
                    self.start_teleport(request, now).warn_on_err();
                }
            }
        }
    }

    fn menu_target(&mut self) -> Option<MenuTarget> {
        self.refresh_index();
        match self.menu.selection.level {
            MenuLevel::Items => self
                .menu
                .selection
                .selected_key(&self.index, &self.registry)
                .map(MenuTarget::Bench),
            MenuLevel::Categories => self
                .menu
                .selection
                .selected_category(&self.index)
                .map(|c| MenuTarget::Category(c.to_string())),
        }
    }

    fn step_selection(&mut self, delta: i32) {
        self.refresh_index();
        self.menu.selection.move_by(delta, &self.index);
    }

    fn confirm(&mut self, now: Instant) {
        self.refresh_index();
        match self.menu.selection.level {
            MenuLevel::Categories => {
                self.menu.selection.enter(&self.index);
            }
            MenuLevel::Items => {
                if let Some(key) = self.menu.selection.selected_key(&self.index, &self.registry) {
                    self.teleport_to(&key, now).warn_on_err();
                }
            }
        }
    }

    fn on_rename_gesture(&mut self, gesture: Gesture<BenchKey>) {
        logging::log_input_event("rename", gesture.name());
        match gesture {
            Gesture::Single(key) => {
                if let Some(record) = self.registry.get(&key) {
                    let current = record.display_name.clone();
                    self.events.push(UiEvent::BeginRename { key, current });
                }
            }
            Gesture::Double(key) => {
                if let Some(current) = self.category_of(&key) {
                    self.events.push(UiEvent::BeginCategoryEdit { key, current });
                }
            }
            Gesture::Long(key) => {
                self.delete(&key).warn_on_err();
            }
        }
    }

    fn on_category_gesture(&mut self, gesture: Gesture<String>) {
        logging::log_input_event("category", gesture.name());
        if let Gesture::Single(category) | Gesture::Double(category) = gesture {
            self.events.push(UiEvent::BeginCategoryRename { category });
        }
    }

    fn on_favorite_gesture(&mut self, gesture: Gesture<MenuTarget>) {
        logging::log_input_event("favorite", gesture.name());
        match gesture {
            Gesture::Single(MenuTarget::Category(name)) => {
                self.refresh_index();
                if let Some(position) = self.index.position_of_category(&name) {
                    self.menu.selection.category = position;
                    self.menu.selection.enter(&self.index);
                }
            }
            Gesture::Double(MenuTarget::Category(name)) => {
                self.toggle_favorite_category(&name);
            }
            Gesture::Double(MenuTarget::Bench(key)) => {
                self.toggle_favorite(&key).warn_on_err();
            }
            Gesture::Single(MenuTarget::Bench(_)) | Gesture::Long(_) => {}
        }
    }

    fn on_quick_rest_gesture(&mut self, gesture: Gesture<()>, now: Instant) {
        logging::log_input_event("quick_rest", gesture.name());
        match gesture {
            Gesture::Single(()) => {
                self.respawn.toggle(&mut self.host).warn_on_err();
            }
            Gesture::Double(()) => {
                if let Some(request) = self.respawn.recall(&mut self.host) {
                    self.start_teleport(request, now).warn_on_err();
                }
            }
            Gesture::Long(()) => {}
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
