//! Progress bar display for batch installations

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for batch installations
pub struct ProgressDisplay {
    /// Main progress bar over the batch entries
    entry_pb: ProgressBar,
    /// Optional component progress bar (shown while reconciling components)
    component_pb: Option<ProgressBar>,
}

impl ProgressDisplay {
    /// Create a new progress display with the total entry count
    pub fn new(total_entries: u64) -> Self {
        let entry_style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-");

        let entry_pb = ProgressBar::new(total_entries);
        entry_pb.set_style(entry_style);

        Self {
            entry_pb,
            component_pb: None,
        }
    }

    /// Initialize the component progress bar with the total component count
    pub fn init_component_progress(&mut self, total_components: u64) {
        let component_style = ProgressStyle::default_bar()
            .template("  [{bar:40.green/yellow}] {pos}/{len} components {msg}")
            .unwrap()
            .progress_chars("#>-");

        let component_pb = ProgressBar::new(total_components);
        component_pb.set_style(component_style);
        self.component_pb = Some(component_pb);
    }

    /// Update to show the archive currently being installed
    pub fn update_entry(&self, archive: &str, current: usize, total: usize) {
        // Truncate long paths for display
        let display_path = if archive.len() > 50 {
            format!("...{}", &archive[archive.len() - 47..])
        } else {
            archive.to_string()
        };
        let msg = format!("({}/{}) {}", current, total, display_path);
        self.entry_pb.set_message(msg);
    }

    /// Increment entry progress
    pub fn inc_entry(&self) {
        self.entry_pb.inc(1);
    }

    /// Update component progress
    pub fn update_component(&self, component: &str) {
        if let Some(ref component_pb) = self.component_pb {
            component_pb.set_message(component.to_string());
            component_pb.inc(1);
        }
    }

    /// Finish all progress bars
    pub fn finish(&self) {
        if let Some(ref component_pb) = self.component_pb {
            component_pb.finish();
        }
        self.entry_pb.finish();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        if let Some(ref component_pb) = self.component_pb {
            component_pb.abandon();
        }
        self.entry_pb.abandon();
    }
}
