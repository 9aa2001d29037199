use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;
use tscope_core::EventKind;
use tscope_outline::OutlineOptions;
use tscope_runtime_config::{apply_compat_fallbacks, ViewerConfig, CONFIG_FILE_NAME};
use tscope_viewer::ViewerOptions;

/// Get the config directory path (~/.config/tscope/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("tscope"))
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

fn read_config(path: &Path) -> Result<ViewerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let mut config = toml::from_str::<ViewerConfig>(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    apply_compat_fallbacks(&mut config);
    Ok(config)
}

/// Load the config from disk, or defaults when no file exists yet.
pub fn load_config() -> Result<ViewerConfig> {
    let path = config_path()?;
    if path.exists() {
        read_config(&path)
    } else {
        Ok(ViewerConfig::default())
    }
}

fn save_config(config: &ViewerConfig) -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config dir {}", dir.display()))?;
    let path = dir.join(CONFIG_FILE_NAME);
    let body = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(&path, body)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(path)
}

/// Directory holding persisted collapse maps.
pub fn collapse_store_dir(config: &ViewerConfig) -> Result<PathBuf> {
    match config.detail.collapse_store_dir.as_deref() {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(config_dir()?.join("collapse")),
    }
}

/// Map config onto viewer options. Unknown event kinds are skipped.
pub fn viewer_options(config: &ViewerConfig) -> ViewerOptions {
    let removed_event_types = config
        .outline
        .removed_event_types
        .iter()
        .filter_map(|raw| match raw.parse::<EventKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!("ignoring outline.removed_event_types entry: {e}");
                None
            }
        })
        .collect();

    ViewerOptions {
        outline: OutlineOptions {
            removed_event_types,
            removed_span_names: config.outline.removed_span_names.clone(),
        },
        default_collapsed: config.detail.default_collapsed,
        sticky_offset_px: config.sticky.offset_px,
    }
}

pub fn show_config() -> Result<()> {
    let path = config_path()?;
    let config = load_config()?;
    println!("config: {}", path.display());
    print!(
        "{}",
        toml::to_string_pretty(&config).context("Failed to serialize config")?
    );
    Ok(())
}

#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub server: Option<String>,
    pub page_size: Option<usize>,
    pub default_collapsed: Option<bool>,
    pub offset_px: Option<f32>,
    pub collapse_store_dir: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.server.is_none()
            && self.page_size.is_none()
            && self.default_collapsed.is_none()
            && self.offset_px.is_none()
            && self.collapse_store_dir.is_none()
    }
}

pub fn set_config(update: ConfigUpdate) -> Result<()> {
    let mut config = load_config()?;

    if let Some(server) = update.server {
        let trimmed = server.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            bail!("server URL must start with http:// or https://");
        }
        config.pager.server_url = trimmed.to_string();
    }
    if let Some(page_size) = update.page_size {
        config.pager.page_size = page_size;
    }
    if let Some(default_collapsed) = update.default_collapsed {
        config.detail.default_collapsed = default_collapsed;
    }
    if let Some(offset_px) = update.offset_px {
        config.sticky.offset_px = offset_px;
    }
    if let Some(dir) = update.collapse_store_dir {
        config.detail.collapse_store_dir = Some(dir);
    }
    if apply_compat_fallbacks(&mut config) {
        warn!("some config values were out of range and have been reset");
    }

    let path = save_config(&config)?;
    println!("Config saved to {}", path.display());
    Ok(())
}
