//! Process-wide model color configuration.
//!
//! Mirrors the shared default/selected model colors: set once at startup (or
//! whenever the user changes them) and read by every model's color update.
//! Changing the selected color does not repaint already-selected models; the
//! new value takes effect on the next selection toggle or bulk color refresh.

use std::sync::RwLock;

use shared::{Color, ModelColors, DEFAULT_MODEL_COLOR, SELECTED_MODEL_COLOR};

static MODEL_COLORS: RwLock<ModelColors> = RwLock::new(ModelColors {
    default_color: DEFAULT_MODEL_COLOR,
    selected_color: SELECTED_MODEL_COLOR,
});

pub fn model_colors() -> ModelColors {
    *MODEL_COLORS.read().unwrap_or_else(|e| e.into_inner())
}

pub fn default_model_color() -> Color {
    model_colors().default_color
}

pub fn selected_model_color() -> Color {
    model_colors().selected_color
}

pub fn set_default_model_color(color: Color) {
    MODEL_COLORS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .default_color = color;
}

pub fn set_selected_model_color(color: Color) {
    MODEL_COLORS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .selected_color = color;
}

pub fn set_model_colors(colors: ModelColors) {
    *MODEL_COLORS.write().unwrap_or_else(|e| e.into_inner()) = colors;
}

/// Serializes tests that touch the global color configuration.
#[cfg(test)]
pub(crate) static CONFIG_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_restore_selected_color() {
        let _guard = CONFIG_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let original = model_colors();
        let red = Color::new(1.0, 0.0, 0.0);
        set_selected_model_color(red);
        assert_eq!(selected_model_color(), red);
        assert_eq!(default_model_color(), original.default_color);

        set_model_colors(original);
        assert_eq!(model_colors(), original);
    }
}
