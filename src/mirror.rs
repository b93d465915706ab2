use camino::Utf8PathBuf;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::client::IsoClient;
use crate::config::MirrorConfig;
use crate::domain::EntryKind;
use crate::error::MirrorError;
use crate::listing::parse_listing;
use crate::store::Store;

#[derive(Debug)]
pub enum DownloadOutcome {
    Downloaded { path: Utf8PathBuf, bytes: u64 },
    AlreadyPresent { path: Utf8PathBuf },
    Aborted { url: String, reason: MirrorError },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub folders_visited: usize,
    pub folders_failed: usize,
    pub folders_skipped: usize,
    pub files_downloaded: usize,
    pub files_skipped: usize,
    pub downloads_aborted: usize,
    pub rows_ignored: usize,
}

/// Depth-first mirror of a standards.iso.org listing tree.
///
/// Every failure below the root is logged and skipped; nothing here aborts
/// the walk.
pub struct Mirror<C: IsoClient> {
    client: C,
    store: Store,
    config: MirrorConfig,
    ancestors: Vec<String>,
    stats: WalkStats,
}

impl<C: IsoClient> Mirror<C> {
    pub fn new(client: C, config: MirrorConfig) -> Self {
        let store = Store::new(config.storage_root.clone());
        Self {
            client,
            store,
            config,
            ancestors: Vec::new(),
            stats: WalkStats::default(),
        }
    }

    /// Mirrors the configured root, using it as both folder and base.
    pub fn run(&mut self) -> WalkStats {
        let base = self.config.base_url.as_str().to_string();
        self.visit(&base, &base);
        self.stats
    }

    pub fn visit(&mut self, folder_url: &str, base_url: &str) {
        self.visit_at(folder_url, base_url, 0);
    }

    fn visit_at(&mut self, folder_url: &str, base_url: &str, depth: usize) {
        if depth > self.config.max_depth {
            warn!(url = folder_url, depth, "maximum folder depth reached, skipping");
            self.stats.folders_skipped += 1;
            return;
        }
        // Only the current chain is checked: sibling rows may repeat a folder.
        if self.ancestors.iter().any(|ancestor| ancestor == folder_url) {
            warn!(url = folder_url, "folder links back to one of its parents, skipping");
            self.stats.folders_skipped += 1;
            return;
        }

        let entries = match self
            .client
            .fetch_page(folder_url)
            .and_then(|html| parse_listing(&html))
        {
            Ok(entries) => entries,
            Err(err) => {
                warn!(url = folder_url, error = %err, "Error during requests, skipping folder");
                self.stats.folders_failed += 1;
                return;
            }
        };
        self.stats.folders_visited += 1;
        debug!(url = folder_url, rows = entries.len(), "listing parsed");

        self.ancestors.push(folder_url.to_string());
        for entry in entries {
            match entry.kind {
                EntryKind::Folder => self.visit_at(&entry.url, base_url, depth + 1),
                EntryKind::File => {
                    let show_progress = self.config.show_progress;
                    self.download(&entry.url, base_url, show_progress);
                }
                EntryKind::Unknown(marker) => {
                    info!(url = %entry.url, marker = %marker, "Unknown file type, skipping");
                    self.stats.rows_ignored += 1;
                }
            }
        }
        self.ancestors.pop();
    }

    pub fn download(
        &mut self,
        file_url: &str,
        base_url: &str,
        show_progress: bool,
    ) -> DownloadOutcome {
        let outcome = self.try_download(file_url, base_url, show_progress);
        match &outcome {
            DownloadOutcome::Downloaded { path, bytes } => {
                debug!(path = %path, bytes, "download complete");
                self.stats.files_downloaded += 1;
            }
            DownloadOutcome::AlreadyPresent { path } => {
                info!("Already downloaded {path}");
                self.stats.files_skipped += 1;
            }
            DownloadOutcome::Aborted { url, reason } => {
                warn!(url = %url, error = %reason, "download aborted");
                self.stats.downloads_aborted += 1;
            }
        }
        outcome
    }

    fn try_download(
        &self,
        file_url: &str,
        base_url: &str,
        show_progress: bool,
    ) -> DownloadOutcome {
        let aborted = |reason| DownloadOutcome::Aborted {
            url: file_url.to_string(),
            reason,
        };

        let target = match self.store.target(file_url, base_url) {
            Ok(target) => target,
            Err(err) => return aborted(err),
        };
        if target.exists {
            return DownloadOutcome::AlreadyPresent { path: target.path };
        }

        // Log lines go through the bar so they never land mid-redraw; the
        // bar is cleared before returning, so callers may log freely.
        let bar = progress_bar(show_progress);
        bar.suspend(|| info!("Downloading {}", target.path));
        let result = self.client.open_file(file_url).and_then(|mut response| {
            if response.content_type.as_deref().is_none_or(str::is_empty) {
                return Err(MirrorError::MissingHeader("Content-Type"));
            }
            let total = response
                .content_length
                .ok_or(MirrorError::MissingHeader("Content-Length"))?;
            bar.set_length(total);
            Store::write_stream(&target.path, &mut *response.body, total, |read| {
                bar.inc(read as u64)
            })
        });
        bar.finish_and_clear();

        match result {
            Ok(bytes) => DownloadOutcome::Downloaded {
                path: target.path,
                bytes,
            },
            Err(err) => aborted(err),
        }
    }
}

fn progress_bar(show_progress: bool) -> ProgressBar {
    if !show_progress {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{wide_bar} {binary_bytes}/{binary_total_bytes} [{elapsed_precise}<{eta_precise}, {binary_bytes_per_sec}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
