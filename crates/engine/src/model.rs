//! Renderable model entities.
//!
//! A model owns its actor (render handle) and keeps the derived drawable
//! state in sync with its logical state: planar placement, selection, and
//! appearance. Placement is the only state shared between the UI thread and
//! the processing thread, so the `(x, y)` pair sits behind a per-model mutex
//! and is always updated atomically as a pair; the geometry pipeline work
//! triggered by a placement change runs after the lock is released, so
//! position readers are never blocked behind a pipeline update.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use glam::DVec3;
use shared::Color;

use crate::config;
use crate::geometry::Geometry;
use crate::render::{Actor, ActorId, Mapper, TransformFilter};
use crate::volume::Volume;

/// Change notification emitted by a model, carrying the new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelEvent {
    PositionXChanged(f64),
    PositionYChanged(f64),
}

/// Planar placement. Always read and written as a pair under one lock.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanarPosition {
    pub x: f64,
    pub y: f64,
}

/// State shared by every model kind.
pub struct ModelCore {
    actor: Mutex<Actor>,
    actor_id: ActorId,
    position: Mutex<PlanarPosition>,
    /// Fixed at construction: negated minimum Z bound of the source data, so
    /// the model's lowest point sits at Z = 0. Never changes afterwards.
    position_z: f64,
    selected: AtomicBool,
    /// Drag scratch state; no notification on change.
    mouse_delta: Mutex<(f64, f64)>,
    events: Mutex<Option<Sender<ModelEvent>>>,
}

impl ModelCore {
    pub fn new(actor: Actor, position_z: f64) -> Self {
        let actor_id = actor.id();
        Self {
            actor: Mutex::new(actor),
            actor_id,
            position: Mutex::new(PlanarPosition::default()),
            position_z,
            selected: AtomicBool::new(false),
            mouse_delta: Mutex::new((0.0, 0.0)),
            events: Mutex::new(None),
        }
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    /// Borrow the owned actor for the duration of the closure.
    pub fn with_actor<R>(&self, f: impl FnOnce(&mut Actor) -> R) -> R {
        let mut actor = self.actor.lock().unwrap();
        f(&mut actor)
    }

    /// Synchronized read of the full placement pair; never observes a torn
    /// update.
    pub fn position(&self) -> PlanarPosition {
        *self.position.lock().unwrap()
    }

    pub fn position_x(&self) -> f64 {
        self.position().x
    }

    pub fn position_y(&self) -> f64 {
        self.position().y
    }

    pub fn position_z(&self) -> f64 {
        self.position_z
    }

    /// Compare-before-write setter: no-op (and no notification) when the
    /// value is unchanged. The notification fires after the lock is released.
    pub fn set_position_x(&self, x: f64) {
        let changed = {
            let mut position = self.position.lock().unwrap();
            if position.x != x {
                position.x = x;
                true
            } else {
                false
            }
        };
        if changed {
            self.emit(ModelEvent::PositionXChanged(x));
        }
    }

    pub fn set_position_y(&self, y: f64) {
        let changed = {
            let mut position = self.position.lock().unwrap();
            if position.y != y {
                position.y = y;
                true
            } else {
                false
            }
        };
        if changed {
            self.emit(ModelEvent::PositionYChanged(y));
        }
    }

    /// Store both axes under a single lock scope, with per-axis no-op checks.
    /// Returns which axes actually changed; emits nothing itself so callers
    /// can defer notifications until after any pipeline work.
    pub fn store_position(&self, x: f64, y: f64) -> (bool, bool) {
        let mut position = self.position.lock().unwrap();
        let changed_x = position.x != x;
        let changed_y = position.y != y;
        if changed_x {
            position.x = x;
        }
        if changed_y {
            position.y = y;
        }
        (changed_x, changed_y)
    }

    pub fn selected(&self) -> bool {
        self.selected.load(Ordering::Relaxed)
    }

    /// Store the selection flag, returning the previous value.
    pub fn swap_selected(&self, selected: bool) -> bool {
        self.selected.swap(selected, Ordering::Relaxed)
    }

    pub fn mouse_delta_x(&self) -> f64 {
        self.mouse_delta.lock().unwrap().0
    }

    pub fn mouse_delta_y(&self) -> f64 {
        self.mouse_delta.lock().unwrap().1
    }

    pub fn set_mouse_delta_xy(&self, delta_x: f64, delta_y: f64) {
        *self.mouse_delta.lock().unwrap() = (delta_x, delta_y);
    }

    /// Register (or replace) the change-notification sink.
    pub fn set_event_sink(&self, sink: Sender<ModelEvent>) {
        *self.events.lock().unwrap() = Some(sink);
    }

    pub fn emit(&self, event: ModelEvent) {
        if let Some(sink) = self.events.lock().unwrap().as_ref() {
            // A dropped receiver just means nobody is listening anymore
            let _ = sink.send(event);
        }
    }
}

/// The polymorphic model interface the registry operates through.
///
/// The color *policy* (which color to use for the current selection state)
/// is shared; the *mechanism* (pushing a color into a particular drawable
/// kind) is supplied per kind, and may be a no-op for kinds that do not
/// support coloring.
pub trait Model: Send + Sync {
    fn core(&self) -> &ModelCore;

    /// Recompute and apply appearance from the selection state and the
    /// process-wide color configuration.
    fn update_model_color(&self);

    /// Push a concrete color into the owned drawable.
    fn set_color(&self, color: Color);

    /// Move the model to planar position `(x, y)`.
    ///
    /// When both coordinates equal the current placement the whole operation
    /// short-circuits: no notification fires and the drawable is untouched.
    /// Otherwise the pair is updated under one lock and one notification per
    /// changed axis fires after the update. Kinds with a geometry pipeline
    /// re-run it between the store and the notifications.
    fn translate_to_position(&self, x: f64, y: f64) {
        let (changed_x, changed_y) = self.core().store_position(x, y);
        if changed_x {
            self.core().emit(ModelEvent::PositionXChanged(x));
        }
        if changed_y {
            self.core().emit(ModelEvent::PositionYChanged(y));
        }
    }

    /// Flip the selection flag; on an actual change the appearance is
    /// recomputed. Repeated calls with the same value are no-ops.
    fn set_selected(&self, selected: bool) {
        if self.core().swap_selected(selected) != selected {
            self.update_model_color();
        }
    }
}

impl std::fmt::Debug for dyn Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("actor_id", &self.core().actor_id())
            .finish_non_exhaustive()
    }
}

/// Model backed by surface geometry.
///
/// The source geometry feeds a cached translation filter whose output feeds
/// the mapper, so the drawable always reflects the current placement
/// (including the fixed Z offset computed at construction).
pub struct PolyDataModel {
    core: ModelCore,
    model_data: Arc<Geometry>,
    filter: Mutex<TransformFilter>,
}

impl PolyDataModel {
    pub fn new(model_data: Geometry) -> Self {
        let model_data = Arc::new(model_data);

        // Place the model with its lower Z bound at zero
        let position_z = -model_data.bounds().min.z;

        let filter = TransformFilter::new(
            Arc::clone(&model_data),
            DVec3::new(0.0, 0.0, position_z),
        );
        let actor = Actor::with_mapper(Mapper::PolyData(Arc::clone(filter.output())));

        Self {
            core: ModelCore::new(actor, position_z),
            model_data,
            filter: Mutex::new(filter),
        }
    }

    /// The untranslated source geometry.
    pub fn model_data(&self) -> &Arc<Geometry> {
        &self.model_data
    }
}

impl Model for PolyDataModel {
    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn translate_to_position(&self, x: f64, y: f64) {
        let (changed_x, changed_y) = self.core.store_position(x, y);
        if !changed_x && !changed_y {
            return;
        }

        // Pipeline work happens outside the position lock: rebuild the
        // translation, re-run the cached filter, refresh the mapper input.
        let output = {
            let mut filter = self.filter.lock().unwrap();
            filter.set_translation(DVec3::new(x, y, self.core.position_z));
            filter.update()
        };
        self.core
            .with_actor(|actor| actor.mapper = Mapper::PolyData(output));

        if changed_x {
            self.core.emit(ModelEvent::PositionXChanged(x));
        }
        if changed_y {
            self.core.emit(ModelEvent::PositionYChanged(y));
        }
    }

    fn update_model_color(&self) {
        if self.core.selected() {
            self.set_color(config::selected_model_color());
        } else {
            self.set_color(config::default_model_color());
        }
    }

    fn set_color(&self, color: Color) {
        self.core.with_actor(|actor| actor.property.color = color);
    }
}

/// Model backed by volumetric grid data.
///
/// Placement changes update logical state only; the drawable is not
/// re-transformed, and volumetric drawables do not support direct coloring.
pub struct ImageModel {
    core: ModelCore,
    model_data: Arc<Volume>,
}

impl ImageModel {
    pub fn new(model_data: Volume) -> Self {
        let model_data = Arc::new(model_data);

        // Place the model with its lower Z bound at zero
        let position_z = -model_data.bounds().min.z;

        let actor = Actor::with_mapper(Mapper::DataSet(Arc::clone(&model_data)));

        Self {
            core: ModelCore::new(actor, position_z),
            model_data,
        }
    }

    pub fn model_data(&self) -> &Arc<Volume> {
        &self.model_data
    }
}

impl Model for ImageModel {
    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn update_model_color(&self) {}

    fn set_color(&self, _color: Color) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_TEST_LOCK;
    use crate::fixtures;
    use std::sync::mpsc;
    use std::thread;

    fn cube_model() -> PolyDataModel {
        PolyDataModel::new(fixtures::unit_cube())
    }

    fn events_of(rx: &mpsc::Receiver<ModelEvent>) -> Vec<ModelEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_position_z_from_geometry_bounds() {
        // Unit cube spans Z in [-0.5, 0.5]
        let model = cube_model();
        assert_eq!(model.core().position_z(), 0.5);

        let shifted = PolyDataModel::new(fixtures::unit_cube().translated(0.0, 0.0, 2.0));
        assert_eq!(shifted.core().position_z(), -1.5);
    }

    #[test]
    fn test_position_z_from_volume_bounds() {
        let model = ImageModel::new(fixtures::solid_volume());
        // Fixture volume starts at the origin, so the offset is zero
        assert_eq!(model.core().position_z(), -0.0);
    }

    #[test]
    fn test_construction_places_lower_z_bound_at_zero() {
        let model = cube_model();
        let bounds = model
            .core()
            .with_actor(|actor| actor.mapper.geometry().unwrap().bounds());
        assert_eq!(bounds.min.z, 0.0);
        assert_eq!(bounds.max.z, 1.0);
    }

    #[test]
    fn test_translate_noop_short_circuits() {
        let model = cube_model();
        let (tx, rx) = mpsc::channel();
        model.core().set_event_sink(tx);

        let before = model
            .core()
            .with_actor(|actor| actor.mapper.geometry().unwrap().bounds());
        model.translate_to_position(0.0, 0.0);

        assert!(events_of(&rx).is_empty());
        let after = model
            .core()
            .with_actor(|actor| actor.mapper.geometry().unwrap().bounds());
        assert_eq!(before, after);
    }

    #[test]
    fn test_translate_emits_once_per_changed_axis() {
        let model = cube_model();
        let (tx, rx) = mpsc::channel();
        model.core().set_event_sink(tx);

        model.translate_to_position(2.0, 3.0);
        assert_eq!(
            events_of(&rx),
            vec![
                ModelEvent::PositionXChanged(2.0),
                ModelEvent::PositionYChanged(3.0)
            ]
        );
        assert_eq!(model.core().position_x(), 2.0);
        assert_eq!(model.core().position_y(), 3.0);

        // Only Y differs this time
        model.translate_to_position(2.0, 4.0);
        assert_eq!(events_of(&rx), vec![ModelEvent::PositionYChanged(4.0)]);
    }

    #[test]
    fn test_set_position_compare_before_write() {
        let model = cube_model();
        let (tx, rx) = mpsc::channel();
        model.core().set_event_sink(tx);

        model.core().set_position_x(1.5);
        model.core().set_position_x(1.5);
        model.core().set_position_y(0.0);
        assert_eq!(events_of(&rx), vec![ModelEvent::PositionXChanged(1.5)]);
    }

    #[test]
    fn test_polydata_transform_is_translation_by_xy_and_fixed_z() {
        let model = cube_model();
        let z = model.core().position_z();

        model.translate_to_position(3.0, -1.0);
        let bounds = model
            .core()
            .with_actor(|actor| actor.mapper.geometry().unwrap().bounds());
        let source = model.model_data().bounds();
        assert_eq!(bounds.min, source.min + DVec3::new(3.0, -1.0, z));
        assert_eq!(bounds.max, source.max + DVec3::new(3.0, -1.0, z));

        // position_z never changes across calls
        model.translate_to_position(-2.0, 5.0);
        assert_eq!(model.core().position_z(), z);
        let bounds = model
            .core()
            .with_actor(|actor| actor.mapper.geometry().unwrap().bounds());
        assert_eq!(bounds.min, source.min + DVec3::new(-2.0, 5.0, z));
    }

    #[test]
    fn test_image_translate_is_logical_only() {
        let model = ImageModel::new(fixtures::solid_volume());
        let (tx, rx) = mpsc::channel();
        model.core().set_event_sink(tx);

        model.translate_to_position(4.0, 5.0);
        assert_eq!(model.core().position_x(), 4.0);
        assert_eq!(model.core().position_y(), 5.0);
        assert_eq!(
            events_of(&rx),
            vec![
                ModelEvent::PositionXChanged(4.0),
                ModelEvent::PositionYChanged(5.0)
            ]
        );
        // The drawable still maps the volume directly
        model
            .core()
            .with_actor(|actor| assert!(actor.mapper.volume().is_some()));
    }

    #[test]
    fn test_selection_color_policy() {
        let _guard = CONFIG_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = config::model_colors();

        let model = cube_model();
        let color_of = |m: &PolyDataModel| m.core().with_actor(|a| a.property.color);

        model.set_selected(true);
        assert_eq!(color_of(&model), original.selected_color);

        // Changing the configured color does not repaint until the next
        // selection-triggered update
        let red = Color::new(1.0, 0.0, 0.0);
        config::set_selected_model_color(red);
        model.set_selected(true); // no-op: flag unchanged
        assert_eq!(color_of(&model), original.selected_color);

        model.update_model_color();
        assert_eq!(color_of(&model), red);

        model.set_selected(false);
        assert_eq!(color_of(&model), original.default_color);

        config::set_model_colors(original);
    }

    #[test]
    fn test_image_model_ignores_colors() {
        let _guard = CONFIG_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let model = ImageModel::new(fixtures::solid_volume());
        let before = model.core().with_actor(|a| a.property.color);
        model.set_selected(true);
        model.update_model_color();
        model.set_color(Color::new(1.0, 0.0, 0.0));
        assert_eq!(model.core().with_actor(|a| a.property.color), before);
    }

    #[test]
    fn test_mouse_delta_is_plain_scratch_state() {
        let model = cube_model();
        let (tx, rx) = mpsc::channel();
        model.core().set_event_sink(tx);

        model.core().set_mouse_delta_xy(0.25, -0.75);
        assert_eq!(model.core().mouse_delta_x(), 0.25);
        assert_eq!(model.core().mouse_delta_y(), -0.75);
        assert!(events_of(&rx).is_empty());
    }

    #[test]
    fn test_concurrent_translate_never_tears_the_pair() {
        let model = Arc::new(cube_model());

        let writer = |target: (f64, f64)| {
            let model = Arc::clone(&model);
            thread::spawn(move || {
                for _ in 0..500 {
                    model.translate_to_position(target.0, target.1);
                    model.translate_to_position(0.0, 0.0);
                }
            })
        };
        let a = writer((1.0, 2.0));
        let b = writer((3.0, 4.0));

        let reader = {
            let model = Arc::clone(&model);
            thread::spawn(move || {
                for _ in 0..2000 {
                    let p = model.core().position();
                    let valid = [(0.0, 0.0), (1.0, 2.0), (3.0, 4.0)]
                        .iter()
                        .any(|&(x, y)| p.x == x && p.y == y);
                    assert!(valid, "torn position read: ({}, {})", p.x, p.y);
                }
            })
        };

        a.join().unwrap();
        b.join().unwrap();
        reader.join().unwrap();
    }
}
