use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;

use crate::domain::RootUrl;

pub const DEFAULT_ROOT: &str = "downloads";
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings for one mirror run. Resolved once at startup, read-only afterwards.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub base_url: RootUrl,
    pub display_name: Option<String>,
    pub storage_root: Utf8PathBuf,
    pub show_progress: bool,
    pub max_depth: usize,
}

impl MirrorConfig {
    pub fn resolve(base_url: RootUrl) -> Self {
        Self::resolve_in(base_url, Utf8Path::new(DEFAULT_ROOT))
    }

    pub fn resolve_in(base_url: RootUrl, default_root: &Utf8Path) -> Self {
        let display_name = base_url.beautify();
        let storage_root = match &display_name {
            Some(name) => default_root.join(name),
            None => {
                warn!(url = %base_url, "Could not beautify the URL, continuing anyway");
                default_root.to_path_buf()
            }
        };
        Self {
            base_url,
            display_name,
            storage_root,
            show_progress: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Name reported to the user; the raw host-relative path when beautification missed.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.base_url.host_relative())
    }
}
