//! Preset Registry
//!
//! Loads the default presets shipped in TOML files. They are written to the
//! database once, the first time the server starts against it.

use super::definition::NewPreset;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct RawPresetFile {
    #[serde(default)]
    presets: Vec<NewPreset>,
}

/// Default presets read from `<data_dir>/presets/*.toml`
pub struct PresetRegistry {
    presets: Vec<NewPreset>,
}

impl PresetRegistry {
    /// Create a new empty preset registry
    pub fn new() -> Self {
        Self {
            presets: Vec::new(),
        }
    }

    /// Load all preset definitions from a data directory
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<(), String> {
        let path = data_dir.join("presets");
        if !path.exists() {
            warn!("Preset directory does not exist: {:?}", path);
            return Ok(());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&path).map_err(|e| e.to_string())? {
            let entry = entry.map_err(|e| e.to_string())?;
            let file_path = entry.path();
            if file_path.extension().and_then(|s| s.to_str()) == Some("toml") {
                files.push(file_path);
            }
        }
        files.sort();

        for file_path in files {
            let contents = fs::read_to_string(&file_path)
                .map_err(|e| format!("Failed to read {:?}: {}", file_path, e))?;

            let file: RawPresetFile = toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse {:?}: {}", file_path, e))?;

            for preset in file.presets {
                if let Err(e) = preset.check() {
                    warn!("Skipping preset '{}' in {:?}: {}", preset.name, file_path, e);
                    continue;
                }
                if self.presets.iter().any(|p| p.name == preset.name) {
                    warn!("Duplicate preset '{}' in {:?}, overwriting", preset.name, file_path);
                    self.presets.retain(|p| p.name != preset.name);
                }
                self.presets.push(preset);
            }
        }

        info!("Loaded {} default presets", self.presets.len());
        Ok(())
    }

    pub fn all(&self) -> &[NewPreset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
