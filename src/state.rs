use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::CategoryColors;
use crate::data::aggregate::Dashboard;
use crate::data::cache::DatasetCache;
use crate::data::filter::{self, CasualtyRange, NullCasualtyPolicy, Selection};
use crate::data::loader::{LoadOptions, LoadedDataset};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Map,
    Timeline,
    Flow,
    Radar,
    Advanced,
    Monthly,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Map,
        Tab::Timeline,
        Tab::Flow,
        Tab::Radar,
        Tab::Advanced,
        Tab::Monthly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Map => "Map",
            Tab::Timeline => "Timeline",
            Tab::Flow => "Flow",
            Tab::Radar => "Country Radar",
            Tab::Advanced => "Advanced Charts",
            Tab::Monthly => "Monthly Analysis",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Every selection change goes
/// through [`AppState::refilter`], which recomputes the view and all
/// aggregations from the cached table.
pub struct AppState {
    cache: DatasetCache,
    load_options: LoadOptions,
    null_casualties: NullCasualtyPolicy,

    /// File the current dataset came from.
    pub source: Option<PathBuf>,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<LoadedDataset>>,

    /// Active filter values.
    pub selection: Selection,

    /// Rows passing the current selection, in table order.
    pub visible_indices: Vec<usize>,

    /// Aggregations of the visible rows.
    pub dashboard: Option<Dashboard>,

    pub incident_colors: CategoryColors,
    pub country_colors: CategoryColors,

    pub tab: Tab,

    /// Selected frame of the timeline tab.
    pub timeline_frame: usize,

    /// Blocking message for a failed load; no charts are shown while set.
    pub load_error: Option<String>,

    /// Non-blocking status shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new(LoadOptions::default(), NullCasualtyPolicy::default())
    }
}

impl AppState {
    pub fn new(load_options: LoadOptions, null_casualties: NullCasualtyPolicy) -> Self {
        Self {
            cache: DatasetCache::new(),
            load_options,
            null_casualties,
            source: None,
            dataset: None,
            selection: Selection {
                null_casualties,
                ..Selection::default()
            },
            visible_indices: Vec::new(),
            dashboard: None,
            incident_colors: CategoryColors::default(),
            country_colors: CategoryColors::default(),
            tab: Tab::default(),
            timeline_frame: 0,
            load_error: None,
            status_message: None,
        }
    }

    /// Load `path` through the cache. A failure is fatal for the session
    /// until another file is opened.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path, &self.load_options) {
            Ok(dataset) => {
                self.source = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.source = Some(path.to_path_buf());
                self.dataset = None;
                self.dashboard = None;
                self.visible_indices.clear();
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Ingest a loaded dataset: unrestricted selection, colours, aggregations.
    pub fn set_dataset(&mut self, dataset: Arc<LoadedDataset>) {
        let catalog = dataset.table.catalog();
        self.selection = Selection {
            null_casualties: self.null_casualties,
            ..Selection::unrestricted(catalog)
        };
        self.incident_colors = CategoryColors::new(&catalog.incident_types);
        self.country_colors = CategoryColors::new(&catalog.countries);

        self.status_message = match dataset.warnings.len() {
            0 => None,
            n => Some(format!("{n} cell(s) could not be parsed and were left empty")),
        };
        self.load_error = None;
        self.timeline_frame = 0;
        self.dataset = Some(dataset);
        self.refilter();
    }

    /// Recompute the filtered view and every aggregation.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let view = filter::apply(&ds.table, &self.selection);
        let dashboard = Dashboard::compute(&view);
        self.visible_indices = view.into_indices();

        let frames = dashboard.timeline.len();
        self.timeline_frame = self.timeline_frame.min(frames.saturating_sub(1));
        self.dashboard = Some(dashboard);
    }

    /// Drop every restriction.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection.reset(ds.table.catalog());
            self.refilter();
        }
    }

    pub fn set_casualty_range(&mut self, low: u32, high: u32) {
        self.selection.casualty_range = CasualtyRange::new(low, high);
        self.refilter();
    }

    /// `(visible, total)` row counts.
    pub fn record_counts(&self) -> Option<(usize, usize)> {
        let ds = self.dataset.as_ref()?;
        Some((self.visible_indices.len(), ds.table.len()))
    }
}
