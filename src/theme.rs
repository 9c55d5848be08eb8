//! Theme packs: static JSON bundles of stickers, sentence models, and
//! scenario seeds, discovered by listing the themes directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemePack {
    #[serde(default)]
    pub stickers: Vec<String>,
    #[serde(default)]
    pub sentence_models: Vec<String>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

/// A loaded theme: display name (capitalized file stem) plus its pack.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub pack: ThemePack,
}

/// Load every `*.json` theme in sorted filename order, skipping files that
/// fail to read or parse. A missing directory yields an empty list.
pub fn load_themes(dir: &Path) -> Vec<Theme> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_string();
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<ThemePack>(&content).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(pack) => Some(Theme {
                    name: capitalize(&stem),
                    pack,
                }),
                Err(e) => {
                    log::warn!("Skipping theme file {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
