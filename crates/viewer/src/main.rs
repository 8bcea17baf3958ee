use std::path::PathBuf;
use std::process::ExitCode;

use engine::ProcessingEngine;
use shared::DisplaySettings;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stage_viewer=info,engine=info".into()),
        )
        .init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(usage) => {
            eprintln!("{usage}");
            return ExitCode::FAILURE;
        }
    };

    let mut engine = ProcessingEngine::new();

    for path in &args.models {
        match engine.add_model(path) {
            Ok(model) => engine.place_model(model.as_ref()),
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    for dir in &args.series {
        match engine.add_volume_series(dir) {
            Ok(model) => engine.place_model(model.as_ref()),
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(settings) = args.settings {
        engine.apply_display_settings(&settings);
    }

    tracing::info!("loaded {} model(s)", engine.len());
    for model in engine.models() {
        let position = model.core().position();
        let summary = model.core().with_actor(|actor| match &actor.mapper {
            engine::render::Mapper::PolyData(geometry) => {
                let bounds = geometry.bounds();
                format!(
                    "surface: {} points, {} triangles, bounds {:?}..{:?}",
                    geometry.point_count(),
                    geometry.triangle_count(),
                    bounds.min,
                    bounds.max
                )
            }
            engine::render::Mapper::DataSet(volume) => {
                format!("volume: dims {:?}", volume.dims)
            }
        });
        tracing::info!(
            "model at ({:.3}, {:.3}, {:.3}): {summary}",
            position.x,
            position.y,
            model.core().position_z()
        );
    }

    ExitCode::SUCCESS
}

struct Args {
    models: Vec<PathBuf>,
    series: Vec<PathBuf>,
    settings: Option<DisplaySettings>,
}

impl Args {
    /// Scan arguments: model file paths, `--series <dir>` for scan-series
    /// imports, `--settings <json>` for a display settings file.
    fn parse(args: impl Iterator<Item = String>) -> Result<Args, String> {
        const USAGE: &str =
            "usage: stage-viewer [--series <dir>]... [--settings <json>] <model-file>...";

        let args: Vec<String> = args.collect();
        let mut parsed = Args {
            models: Vec::new(),
            series: Vec::new(),
            settings: None,
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--series" => {
                    let dir = args.get(i + 1).ok_or(USAGE)?;
                    parsed.series.push(PathBuf::from(dir));
                    i += 2;
                }
                "--settings" => {
                    let path = args.get(i + 1).ok_or(USAGE)?;
                    let json = std::fs::read_to_string(path)
                        .map_err(|e| format!("failed to read {path}: {e}"))?;
                    let settings: DisplaySettings = serde_json::from_str(&json)
                        .map_err(|e| format!("failed to parse {path}: {e}"))?;
                    parsed.settings = Some(settings);
                    i += 2;
                }
                "--help" | "-h" => return Err(USAGE.to_string()),
                other => {
                    parsed.models.push(PathBuf::from(other));
                    i += 1;
                }
            }
        }

        if parsed.models.is_empty() && parsed.series.is_empty() {
            return Err(USAGE.to_string());
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_paths_and_series() {
        let args = Args::parse(
            ["a.obj", "--series", "scans/", "b.stl"]
                .iter()
                .map(|s| s.to_string()),
        )
        .unwrap();
        assert_eq!(args.models, vec![PathBuf::from("a.obj"), PathBuf::from("b.stl")]);
        assert_eq!(args.series, vec![PathBuf::from("scans/")]);
    }

    #[test]
    fn test_parse_requires_input() {
        assert!(Args::parse(std::iter::empty()).is_err());
    }
}
