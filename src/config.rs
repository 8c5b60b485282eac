use crate::api::sponsorblock::DEFAULT_API_SERVER;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Flags consulted each time the scheduler has a decision to make
pub trait SkipConfig: Send + Sync {
    /// Open a decision window after every skip
    fn show_skipped_dialog(&self) -> bool;

    /// Upvote a segment when its decision window expires untouched
    fn auto_upvote(&self) -> bool;

    /// Report every skip to the server's view counter
    fn skip_count_tracking(&self) -> bool;
}

/// Persistent user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub show_skipped_dialog: bool,
    pub auto_upvote: bool,
    pub skip_count_tracking: bool,
    /// How long the skipped dialog stays open
    pub skipped_dialog_secs: u64,
    /// How far past a segment start a position report may land and still count as reaching it
    pub reach_tolerance_secs: f64,
    pub api_server: String,
    pub categories: Vec<String>,
    /// Private id votes are submitted under, generated on first run
    pub user_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_skipped_dialog: true,
            auto_upvote: false,
            skip_count_tracking: true,
            skipped_dialog_secs: 15,
            reach_tolerance_secs: 1.0,
            api_server: DEFAULT_API_SERVER.to_string(),
            categories: vec!["sponsor".to_string()],
            user_id: String::new(),
        }
    }
}

impl Settings {
    pub fn skipped_dialog_duration(&self) -> Duration {
        Duration::from_secs(self.skipped_dialog_secs.max(1))
    }
}

impl SkipConfig for Settings {
    fn show_skipped_dialog(&self) -> bool {
        self.show_skipped_dialog
    }

    fn auto_upvote(&self) -> bool {
        self.auto_upvote
    }

    fn skip_count_tracking(&self) -> bool {
        self.skip_count_tracking
    }
}

/// File-backed settings
///
/// Flags are served from a cache that is refreshed whenever the file's
/// modification time changes, so edits take effect without a restart.
pub struct SettingsStore {
    path: PathBuf,
    cache: Mutex<Option<CachedSettings>>,
}

struct CachedSettings {
    modified: Option<SystemTime>,
    settings: Settings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cache: Mutex::new(None),
        }
    }

    /// Default location under the user's config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sponsorskip").join("settings.json"))
    }

    /// Read the current settings, falling back to defaults
    pub fn load(&self) -> Settings {
        if !self.path.exists() {
            return Settings::default();
        }

        match fs::read_to_string(&self.path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| serde_json::from_str(&contents).map_err(anyhow::Error::from))
        {
            Ok(settings) => settings,
            Err(e) => {
                warn!("failed to read settings from {}: {}", self.path.display(), e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json).with_context(|| format!("failed to write {}", self.path.display()))?;
        *self.cache.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }

    /// Settings as of the file's current modification time
    fn current(&self) -> Settings {
        let modified = fs::metadata(&self.path).and_then(|m| m.modified()).ok();

        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(cached) = cache.as_ref().filter(|c| c.modified == modified) {
            return cached.settings.clone();
        }

        let settings = self.load();
        *cache = Some(CachedSettings {
            modified,
            settings: settings.clone(),
        });
        settings
    }

    /// Load settings, generating and persisting a user id on first run
    pub fn load_or_init(&self) -> Result<Settings> {
        let mut settings = self.load();
        if settings.user_id.is_empty() {
            settings.user_id = uuid::Uuid::new_v4().simple().to_string();
            debug!("generated new user id");
            self.save(&settings)?;
        }
        Ok(settings)
    }
}

impl SkipConfig for SettingsStore {
    fn show_skipped_dialog(&self) -> bool {
        self.current().show_skipped_dialog()
    }

    fn auto_upvote(&self) -> bool {
        self.current().auto_upvote()
    }

    fn skip_count_tracking(&self) -> bool {
        self.current().skip_count_tracking()
    }
}
