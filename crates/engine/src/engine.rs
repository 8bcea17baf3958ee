//! The processing engine: owns the model collection, orchestrates loading and
//! preprocessing, and applies bulk display state across all models through the
//! shared [`Model`] interface.

use std::path::Path;
use std::sync::Arc;

use shared::{DisplaySettings, Interpolation, Representation};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::geometry::Geometry;
use crate::io;
use crate::model::{ImageModel, Model, PolyDataModel};
use crate::render::ActorId;
use crate::volume::{extract_iso_surface, Volume};

/// Threshold used when deriving a surface from a scan series.
const ISO_SURFACE_THRESHOLD: f64 = 0.1;

/// Owns the collection of models for the session.
#[derive(Default)]
pub struct ProcessingEngine {
    models: Vec<Arc<dyn Model>>,
}

impl ProcessingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a model file, dispatching on the (case-insensitive) extension:
    /// `dcm` becomes an [`ImageModel`], `obj`/`stl` a preprocessed
    /// [`PolyDataModel`]. On any error nothing is added to the collection.
    pub fn add_model(&mut self, path: &Path) -> Result<Arc<dyn Model>, EngineError> {
        info!("loading model from {}", path.display());

        match io::file_extension(path).as_deref() {
            Some("dcm") => {
                let volume = io::load_volume_single_file(path)?;
                Ok(self.add_volume(volume))
            }
            Some("obj") | Some("stl") => {
                let geometry = io::load_surface_mesh(path)?;
                Ok(self.add_polydata(geometry))
            }
            other => Err(EngineError::UnsupportedFileKind {
                extension: other.unwrap_or_default().to_string(),
            }),
        }
    }

    /// Load a directory of scan slices and wrap the extracted iso-surface in
    /// a [`PolyDataModel`]. Separate entry point from [`Self::add_model`] so
    /// single-file and series imports never collide on extension dispatch.
    pub fn add_volume_series(&mut self, dir: &Path) -> Result<Arc<dyn Model>, EngineError> {
        info!("loading scan series from {}", dir.display());

        let volume = io::load_volume_series(dir)?;
        let surface = extract_iso_surface(&volume, ISO_SURFACE_THRESHOLD, true);
        Ok(self.add_polydata(surface))
    }

    /// Wrap in-memory surface geometry (preprocessed first, like every other
    /// surface path) and append it to the collection.
    pub fn add_polydata(&mut self, geometry: Geometry) -> Arc<dyn Model> {
        let model: Arc<dyn Model> =
            Arc::new(PolyDataModel::new(self.preprocess_polydata(geometry)));
        self.models.push(Arc::clone(&model));
        model
    }

    /// Wrap in-memory volumetric data and append it to the collection.
    pub fn add_volume(&mut self, volume: Volume) -> Arc<dyn Model> {
        let model: Arc<dyn Model> = Arc::new(ImageModel::new(volume));
        self.models.push(Arc::clone(&model));
        model
    }

    /// Fixed preprocessing contract for every loaded surface model: recenter
    /// at the origin, then compute point normals (needed for Gouraud
    /// interpolation).
    pub fn preprocess_polydata(&self, geometry: Geometry) -> Geometry {
        let center = geometry.center();
        let centered = geometry.translated(-center.x, -center.y, -center.z);
        centered.with_point_normals()
    }

    /// Reset a model to planar position (0, 0).
    pub fn place_model(&self, model: &dyn Model) {
        debug!("placing model at the origin");
        model.translate_to_position(0.0, 0.0);
    }

    pub fn set_models_representation(&self, representation: Representation) {
        for model in &self.models {
            model
                .core()
                .with_actor(|actor| actor.property.representation = representation);
        }
    }

    pub fn set_models_opacity(&self, opacity: f64) {
        for model in &self.models {
            model.core().with_actor(|actor| actor.property.opacity = opacity);
        }
    }

    pub fn set_models_gouraud_interpolation(&self, enabled: bool) {
        let interpolation = if enabled {
            Interpolation::Gouraud
        } else {
            Interpolation::Flat
        };
        for model in &self.models {
            model
                .core()
                .with_actor(|actor| actor.property.interpolation = interpolation);
        }
    }

    /// Recompute every model's color from its selection state and the current
    /// color configuration.
    pub fn update_models_color(&self) {
        for model in &self.models {
            model.update_model_color();
        }
    }

    /// Apply a bundled display policy across the collection.
    pub fn apply_display_settings(&self, settings: &DisplaySettings) {
        self.set_models_representation(settings.representation);
        self.set_models_opacity(settings.opacity);
        self.set_models_gouraud_interpolation(settings.gouraud_interpolation);
    }

    /// Resolve a render handle back to its owning model.
    pub fn model_from_actor(&self, actor_id: ActorId) -> Option<Arc<dyn Model>> {
        self.models
            .iter()
            .find(|model| model.core().actor_id() == actor_id)
            .cloned()
    }

    /// Drop a model from the collection, releasing the registry's ownership.
    pub fn remove_model(&mut self, actor_id: ActorId) -> Option<Arc<dyn Model>> {
        let index = self
            .models
            .iter()
            .position(|model| model.core().actor_id() == actor_id)?;
        Some(self.models.remove(index))
    }

    pub fn models(&self) -> &[Arc<dyn Model>] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
