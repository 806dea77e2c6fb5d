//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche del run.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - La lunghezza della barra cresce man mano che le cartelle vengono pianificate
//! - Statistiche del run (immagini, video, file saltati, cartelle rimosse, byte scritti)
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:42] [=========>------------------------------] 12/50 (24%) cats/b.jpg
//! ```
//!
//! In modalità JSON la barra è nascosta per non sporcare stdout.

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Manages progress reporting for a batch run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(initial_len: u64) -> Self {
        let bar = ProgressBar::new(initial_len);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Grow the total when another folder has been planned
    pub fn add_work(&self, items: u64) {
        self.bar.inc_length(items);
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Stop drawing and leave the bar where it is
    pub fn abandon(&self) {
        self.bar.abandon();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Counters for a batch run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub images_processed: usize,
    pub videos_moved: usize,
    pub files_skipped: usize,
    pub folders_removed: usize,
    pub bytes_written: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, output_size: u64) {
        self.images_processed += 1;
        self.bytes_written += output_size;
    }

    pub fn add_video(&mut self, size: u64) {
        self.videos_moved += 1;
        self.bytes_written += size;
    }

    pub fn add_skipped(&mut self) {
        self.files_skipped += 1;
    }

    pub fn add_folder_removed(&mut self) {
        self.folders_removed += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Images: {} | Videos moved: {} | Skipped: {} | Folders removed: {} | Output: {}",
            self.images_processed,
            self.videos_moved,
            self.files_skipped,
            self.folders_removed,
            FileManager::format_size(self.bytes_written)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let mut stats = RunStats::new();
        stats.add_image(1024);
        stats.add_image(1024);
        stats.add_video(2048);
        stats.add_skipped();
        stats.add_folder_removed();

        assert_eq!(stats.images_processed, 2);
        assert_eq!(stats.videos_moved, 1);
        assert_eq!(stats.bytes_written, 4096);
        assert_eq!(
            stats.format_summary(),
            "Images: 2 | Videos moved: 1 | Skipped: 1 | Folders removed: 1 | Output: 4.00 KB"
        );
    }

    #[test]
    fn test_hidden_progress_counts() {
        let progress = ProgressManager::hidden();
        progress.add_work(3);
        progress.update("a.png");
        progress.update("b.png");
        assert_eq!(progress.position(), 2);
    }
}
