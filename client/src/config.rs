use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{CameraConfig, CharacterConfig};

/// Tuning loaded at startup and handed to the simulation when the player spawns.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub character: CharacterConfig,
    pub camera: CameraConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            character: CharacterConfig {
                // A playable default: fall back to the ground after a jump.
                gravity_mps2: 9.81,
                ..CharacterConfig::default()
            },
            camera: CameraConfig::default(),
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    let config = match read_config_path_from_cli_env() {
        Some(path) => load_config(&path).unwrap_or_else(|err| {
            warn!("Ignoring config {path}: {err}; using defaults.");
            ClientConfig::default()
        }),
        None => {
            info!("No config provided via CLI/ENV; using defaults.");
            ClientConfig::default()
        }
    };
    app.insert_resource(config);
}

fn load_config(path: &str) -> Result<ClientConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    let config = parse_config(&text)?;
    info!("Loaded config from {path}");
    Ok(config)
}

fn parse_config(text: &str) -> Result<ClientConfig, String> {
    let config: ClientConfig = serde_json::from_str(text).map_err(|err| err.to_string())?;
    config
        .character
        .validate()
        .and_then(|()| config.camera.validate())
        .map_err(|err| err.to_string())?;
    Ok(config)
}

/// Returns a config file path from CLI args or environment if present.
///
/// Supported:
///   --config <path>
///   --config=<path>
///   GALDORAN_CONFIG environment variable
fn read_config_path_from_cli_env() -> Option<String> {
    config_path_from_args(std::env::args().skip(1))
        .or_else(|| std::env::var("GALDORAN_CONFIG").ok())
}

fn config_path_from_args(args: impl IntoIterator<Item = String>) -> Option<String> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next();
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn config_path_forms() {
        assert_eq!(
            config_path_from_args(args(&["--config", "a.json"])),
            Some("a.json".into())
        );
        assert_eq!(
            config_path_from_args(args(&["--verbose", "--config=b.json"])),
            Some("b.json".into())
        );
        assert_eq!(config_path_from_args(args(&["--config"])), None);
        assert_eq!(config_path_from_args(args(&[])), None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = parse_config(r#"{ "camera": { "zoom_step": 0.5 } }"#).unwrap();
        assert_eq!(config.camera.zoom_step, 0.5);
        assert_eq!(config.camera.zoom_max, 10.0);
        assert_eq!(config.character, ClientConfig::default().character);

        // A present character section fills its missing fields from the library defaults.
        let config = parse_config(r#"{ "character": { "move_speed": 8.0 } }"#).unwrap();
        assert_eq!(config.character.move_speed, 8.0);
        assert_eq!(config.character.gravity_mps2, 0.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = parse_config(r#"{ "character": { "radius": -1.0 } }"#).unwrap_err();
        assert!(err.contains("radius"), "{err}");
        assert!(parse_config("not json").is_err());
    }
}
