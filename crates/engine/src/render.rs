//! The drawable layer: actors, mappers, appearance properties, and the
//! reusable translation filter the surface pipeline runs through.

use std::sync::Arc;

use glam::DVec3;
use shared::{Color, Interpolation, Representation, DEFAULT_MODEL_COLOR};
use uuid::Uuid;

use crate::geometry::Geometry;
use crate::volume::Volume;

/// Opaque render-handle identity. Used to resolve a picked drawable back to
/// its owning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(Uuid);

impl ActorId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Drawable appearance state.
#[derive(Debug, Clone, Copy)]
pub struct Property {
    pub color: Color,
    pub opacity: f64,
    pub representation: Representation,
    pub interpolation: Interpolation,
}

impl Default for Property {
    fn default() -> Self {
        Self {
            color: DEFAULT_MODEL_COLOR,
            opacity: 1.0,
            representation: Representation::Surface,
            interpolation: Interpolation::Flat,
        }
    }
}

/// A drawable's geometric input.
#[derive(Debug, Clone)]
pub enum Mapper {
    PolyData(Arc<Geometry>),
    DataSet(Arc<Volume>),
}

impl Mapper {
    pub fn geometry(&self) -> Option<&Arc<Geometry>> {
        match self {
            Mapper::PolyData(geometry) => Some(geometry),
            Mapper::DataSet(_) => None,
        }
    }

    pub fn volume(&self) -> Option<&Arc<Volume>> {
        match self {
            Mapper::PolyData(_) => None,
            Mapper::DataSet(volume) => Some(volume),
        }
    }
}

/// A renderable scene instance. Created once per model and never reassigned;
/// its mapper input and property are updated in place.
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    pub mapper: Mapper,
    pub property: Property,
    /// Actor-local position; models keep this at the origin and move geometry
    /// through the transform filter instead.
    pub position: [f64; 3],
}

impl Actor {
    pub fn with_mapper(mapper: Mapper) -> Self {
        Self {
            id: ActorId::new(),
            mapper,
            property: Property::default(),
            position: [0.0; 3],
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }
}

/// Reusable translation pipeline stage.
///
/// The input geometry is cached once; each placement change swaps in a new
/// translation and recomputes the output on `update()`, mirroring how a
/// transform filter is reused rather than rebuilt per call.
#[derive(Debug)]
pub struct TransformFilter {
    input: Arc<Geometry>,
    translation: DVec3,
    output: Arc<Geometry>,
}

impl TransformFilter {
    pub fn new(input: Arc<Geometry>, translation: DVec3) -> Self {
        let mut filter = Self {
            input,
            translation,
            output: Arc::new(Geometry::default()),
        };
        filter.update();
        filter
    }

    pub fn set_translation(&mut self, translation: DVec3) {
        self.translation = translation;
    }

    /// Recompute the translated output from the cached input.
    pub fn update(&mut self) -> Arc<Geometry> {
        let t = self.translation;
        self.output = Arc::new(self.input.translated(t.x, t.y, t.z));
        Arc::clone(&self.output)
    }

    pub fn output(&self) -> &Arc<Geometry> {
        &self.output
    }
}
