use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::DashboardConfig;
use crate::data::loader;
use crate::data::model::OpportunityTable;
use crate::report::salesperson::write_csv;
use crate::report::{render, DashboardReport, DashboardSelection};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Source of the current dataset (or of the last load attempt).
    pub data_path: PathBuf,

    /// Loaded dataset (None until a load succeeds). Shared with the loader cache.
    pub dataset: Option<Arc<OpportunityTable>>,

    /// Every filter and section-local selection.
    pub selection: DashboardSelection,

    /// Reports for the current selection (cached until the selection changes).
    pub report: Option<DashboardReport>,

    /// Error message shown in red in the top bar.
    pub status_message: Option<String>,

    /// Informational message (e.g. a finished export).
    pub info_message: Option<String>,
}

impl AppState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            data_path: config.data_path.clone(),
            dataset: None,
            selection: DashboardSelection::default(),
            report: None,
            status_message: None,
            info_message: None,
        }
    }

    /// Load (or fetch from cache) a dataset and reset all selections.
    ///
    /// On failure the current dataset, selections and source path are kept.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let dataset = loader::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        self.data_path = path.to_path_buf();
        self.set_dataset(dataset);
        Ok(())
    }

    /// [`Self::load`], reporting failures in the status bar instead of returning them.
    pub fn load_or_report(&mut self, path: &Path) {
        if let Err(e) = self.load(path) {
            log::error!("{e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Drop the cached table for the current source and read it again.
    pub fn reload(&mut self) {
        let path = self.data_path.clone();
        loader::invalidate(&path);
        self.load_or_report(&path);
    }

    /// Forget every cached table; the current dataset stays on screen.
    pub fn clear_cache(&mut self) {
        loader::clear_cache();
        self.info_message = Some("Dataset cache cleared".to_string());
    }

    /// Ingest a newly loaded dataset: select everything, compute reports.
    pub fn set_dataset(&mut self, dataset: Arc<OpportunityTable>) {
        if dataset.is_empty() {
            log::warn!("{} contains no opportunities", self.data_path.display());
        }
        self.selection = DashboardSelection::all(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.info_message = None;
        self.refresh();
    }

    /// Recompute every report after a selection change.
    pub fn refresh(&mut self) {
        self.report = self
            .dataset
            .as_deref()
            .map(|table| render(table, &self.selection));
    }

    /// Write the salesperson table as CSV.
    pub fn export_salesperson(&mut self, path: &Path) -> Result<()> {
        let rows = self
            .report
            .as_ref()
            .map(|r| r.salesperson.rows.as_slice())
            .unwrap_or_default();
        write_csv(path, rows).with_context(|| format!("Failed to export {}", path.display()))?;
        self.info_message = Some(format!("Saved {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CSV: &str = "Deal_ID,Region,Company_Size,Deal_Stage,Deal_Size,Lead_Source,Salesperson,Deal_Closure_Date\n\
                       1,UK,SMB,Closed Won,100,Website,Alice,2025-01-10\n\
                       2,UK,SMB,Open,50,Website,Alice,\n\
                       3,US,SMB,Closed Lost,30,Website,Bob,2025-02-01\n";

    fn temp_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn state() -> AppState {
        AppState::new(&DashboardConfig {
            data_path: PathBuf::from("unused.csv"),
        })
    }

    #[test]
    fn load_selects_everything_and_renders() {
        let file = temp_csv(CSV);
        let mut state = state();
        state.load(file.path()).unwrap();

        let regions: Vec<&str> =
            state.selection.filter.regions.iter().map(String::as_str).collect();
        assert_eq!(regions, ["UK", "US"]);
        let report = state.report.as_ref().unwrap();
        assert_eq!(report.filtered_rows, 3);
        assert_eq!(report.revenue.metrics.total_closed_won, 1);
    }

    #[test]
    fn selection_change_needs_refresh() {
        let file = temp_csv(CSV);
        let mut state = state();
        state.load(file.path()).unwrap();

        state.selection.filter.regions.remove("UK");
        state.refresh();
        let report = state.report.as_ref().unwrap();
        assert_eq!(report.filtered_rows, 1);
        assert!(report.pipeline.by_region.is_empty());
        assert_eq!(report.revenue.metrics.win_rate, 0.0);
    }

    #[test]
    fn failed_load_is_reported_not_raised() {
        let mut state = state();
        state.load_or_report(Path::new("/no/such/opportunities.csv"));
        assert!(state.dataset.is_none());
        assert!(state.report.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("Failed to load"));
    }

    #[test]
    fn failed_open_keeps_the_current_dataset() {
        let file = temp_csv(CSV);
        let mut state = state();
        state.load(file.path()).unwrap();
        state.selection.filter.regions.remove("US");
        state.refresh();

        state.load_or_report(Path::new("/no/such/other.csv"));
        assert!(state.status_message.as_deref().unwrap().contains("other.csv"));
        assert_eq!(state.data_path, file.path());
        assert_eq!(state.dataset.as_ref().unwrap().len(), 3);
        assert_eq!(state.report.as_ref().unwrap().filtered_rows, 2);

        // A later successful reload clears the error.
        state.reload();
        assert!(state.status_message.is_none());
        assert_eq!(state.report.as_ref().unwrap().filtered_rows, 3);
    }

    #[test]
    fn export_writes_current_table() {
        let file = temp_csv(CSV);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");

        let mut state = state();
        state.load(file.path()).unwrap();
        state.export_salesperson(&out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Alice,2,150.0,75.0"));
        assert!(state.info_message.is_some());
    }
}
