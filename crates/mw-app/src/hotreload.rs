use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use mw_core::config::{EngineConfig, load_config};
use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::cli::Overrides;

/// Reload `path` and apply the command-line overrides on top.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn reload(path: &Path, overrides: &Overrides) -> Result<EngineConfig> {
    let mut config = load_config(path)?;
    overrides.apply(&mut config);
    Ok(config)
}

/// Watch the config file and swap the new config in on every modification.
///
/// The returned watcher must stay alive for as long as reloads are wanted.
/// A file that fails to parse leaves the current config in place.
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be watched.
pub fn spawn_config_watcher(
    config_path: &Path,
    config: &Arc<ArcSwap<EngineConfig>>,
    overrides: Overrides,
) -> Result<impl Watcher + use<>> {
    let config = Arc::clone(config);
    let path = config_path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res
            && matches!(event.kind, EventKind::Modify(_))
        {
            match reload(&path, &overrides) {
                Ok(new_config) => {
                    config.store(Arc::new(new_config));
                    log::info!("Config reloaded from {}", path.display());
                }
                Err(e) => log::warn!("Config reload failed, keeping previous: {e:#}"),
            }
        }
    })?;

    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mw_core::mood::Mood;

    #[test]
    fn reload_keeps_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moodwave.toml");
        std::fs::write(&path, "[engine]\ndecimation = 10\ntarget_fps = 30\n").unwrap();
        let overrides = Overrides {
            fps: Some(120),
            decimation: None,
            mood: Some(Mood::Treble),
        };
        let config = reload(&path, &overrides).unwrap();
        assert_eq!(config.target_fps, 120);
        assert_eq!(config.decimation, 10);
        assert_eq!(config.initial_mood, Mood::Treble);
    }

    #[test]
    fn reload_reports_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moodwave.toml");
        std::fs::write(&path, "[engine\n").unwrap();
        assert!(reload(&path, &Overrides::default()).is_err());
    }
}
