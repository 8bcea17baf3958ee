//! Model management core: renderable models loaded from mesh or scan data,
//! their planar placement and selection state, and the processing engine that
//! owns the collection and keeps drawable state in sync.

pub mod config;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod geometry;
pub mod io;
pub mod model;
pub mod render;
pub mod volume;

pub use engine::ProcessingEngine;
pub use error::EngineError;
pub use model::{ImageModel, Model, ModelCore, ModelEvent, PlanarPosition, PolyDataModel};
pub use render::ActorId;
