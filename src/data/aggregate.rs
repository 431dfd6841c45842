//! Summary views over a filtered [`IncidentView`].
//!
//! Every function here is pure and total: an empty view yields empty or
//! zero-filled output, never a panic.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::error::EmptyResultNotice;
use super::filter::IncidentView;
use super::model::{Incident, Month, Severity};

/// Countries kept by the radar comparison.
pub const TOP_COUNTRIES: usize = 5;

/// Bin count of the casualty histogram.
pub const HISTOGRAM_BINS: usize = 20;

// ---------------------------------------------------------------------------
// Location listing
// ---------------------------------------------------------------------------

/// Map marker colour, a fixed function of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerColor {
    Red,
    Orange,
    Green,
}

impl MarkerColor {
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::High => MarkerColor::Red,
            Severity::Medium => MarkerColor::Orange,
            Severity::Low => MarkerColor::Green,
        }
    }
}

/// One plottable incident (both coordinates present).
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub incident_type: Option<String>,
    pub vessel_type: Option<String>,
    pub casualties: Option<u32>,
    pub severity: Severity,
}

impl IncidentLocation {
    fn from_incident(incident: &Incident) -> Option<Self> {
        let (latitude, longitude) = incident.coordinates()?;
        Some(IncidentLocation {
            latitude,
            longitude,
            country: incident.country.clone(),
            incident_type: incident.incident_type.clone(),
            vessel_type: incident.vessel_type.clone(),
            casualties: incident.casualties,
            severity: incident.severity,
        })
    }

    pub fn marker_color(&self) -> MarkerColor {
        MarkerColor::for_severity(self.severity)
    }

    /// Hover text, e.g. `Collision - Tanker (5 casualties)`.
    pub fn popup(&self) -> String {
        let casualties = self
            .casualties
            .map_or_else(|| "unknown".to_string(), |n| n.to_string());
        format!(
            "{} - {} ({casualties} casualties)",
            self.incident_type.as_deref().unwrap_or("Unknown"),
            self.vessel_type.as_deref().unwrap_or("Unknown"),
        )
    }
}

/// One marker per row with coordinates, in view order.
pub fn locations(view: &IncidentView<'_>) -> Vec<IncidentLocation> {
    view.iter().filter_map(IncidentLocation::from_incident).collect()
}

// ---------------------------------------------------------------------------
// Temporal series
// ---------------------------------------------------------------------------

/// All incidents of one calendar month of one year.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFrame {
    pub year: i32,
    pub month: Month,
    pub incidents: usize,
    pub casualties: u64,
    /// Rows of this frame that have coordinates.
    pub points: Vec<IncidentLocation>,
}

impl TimeFrame {
    /// `2021-Jan`
    pub fn label(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }
}

/// Frames in chronological order. Undated rows belong to no frame.
pub fn temporal_series(view: &IncidentView<'_>) -> Vec<TimeFrame> {
    let mut frames: BTreeMap<(i32, Month), TimeFrame> = BTreeMap::new();

    for incident in view.iter() {
        let (Some(year), Some(month)) = (incident.year, incident.month) else {
            continue;
        };
        let frame = frames.entry((year, month)).or_insert_with(|| TimeFrame {
            year,
            month,
            incidents: 0,
            casualties: 0,
            points: Vec::new(),
        });
        frame.incidents += 1;
        frame.casualties += u64::from(incident.casualties_or_zero());
        frame.points.extend(IncidentLocation::from_incident(incident));
    }

    frames.into_values().collect()
}

// ---------------------------------------------------------------------------
// Flow aggregation (incident type → vessel type)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLink {
    /// Index into [`FlowDiagram::sources`].
    pub source: usize,
    /// Index into [`FlowDiagram::targets`].
    pub target: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowDiagram {
    /// Distinct incident types, first-seen order.
    pub sources: Vec<String>,
    /// Distinct vessel types, first-seen order.
    pub targets: Vec<String>,
    /// Observed pairs only, ordered by (incident type, vessel type).
    pub links: Vec<FlowLink>,
}

impl FlowDiagram {
    /// Sources followed by targets: the single node list a Sankey renderer wants.
    pub fn node_labels(&self) -> Vec<&str> {
        self.sources
            .iter()
            .chain(&self.targets)
            .map(String::as_str)
            .collect()
    }

    /// Link endpoints as indices into [`FlowDiagram::node_labels`].
    pub fn node_link(&self, link: &FlowLink) -> (usize, usize) {
        (link.source, self.sources.len() + link.target)
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

pub fn flows(view: &IncidentView<'_>) -> FlowDiagram {
    let mut sources: Vec<String> = Vec::new();
    let mut targets: Vec<String> = Vec::new();
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();

    for incident in view.iter() {
        let incident_type = incident.incident_type.as_deref();
        let vessel_type = incident.vessel_type.as_deref();

        if let Some(it) = incident_type {
            if !sources.iter().any(|s| s == it) {
                sources.push(it.to_string());
            }
        }
        if let Some(vt) = vessel_type {
            if !targets.iter().any(|t| t == vt) {
                targets.push(vt.to_string());
            }
        }
        if let (Some(it), Some(vt)) = (incident_type, vessel_type) {
            *counts.entry((it, vt)).or_default() += 1;
        }
    }

    let position = |nodes: &[String], name: &str| nodes.iter().position(|n| n == name);
    let links = counts
        .into_iter()
        .filter_map(|((it, vt), count)| {
            Some(FlowLink {
                source: position(&sources, it)?,
                target: position(&targets, vt)?,
                count,
            })
        })
        .collect();

    FlowDiagram {
        sources,
        targets,
        links,
    }
}

// ---------------------------------------------------------------------------
// Top-country summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySummary {
    pub country: String,
    pub incidents: usize,
    pub casualties: u64,
    pub cargo_losses: u64,
}

impl CountrySummary {
    /// Radar axes in display order: casualties, cargo losses, incidents.
    pub fn radar_values(&self) -> [f64; 3] {
        [
            self.casualties as f64,
            self.cargo_losses as f64,
            self.incidents as f64,
        ]
    }
}

/// Radar axis labels matching [`CountrySummary::radar_values`].
pub const RADAR_AXES: [&str; 3] = ["Casualties", "Cargo losses", "Incidents"];

/// Countries by incident count, descending. Ties keep first-seen order.
pub fn top_countries(view: &IncidentView<'_>, limit: usize) -> Vec<CountrySummary> {
    let mut summaries: Vec<CountrySummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for incident in view.iter() {
        let Some(country) = incident.country.as_deref() else {
            continue;
        };
        let slot = *index.entry(country).or_insert_with(|| {
            summaries.push(CountrySummary {
                country: country.to_string(),
                incidents: 0,
                casualties: 0,
                cargo_losses: 0,
            });
            summaries.len() - 1
        });
        let summary = &mut summaries[slot];
        summary.incidents += 1;
        summary.casualties += u64::from(incident.casualties_or_zero());
        summary.cargo_losses += u64::from(incident.cargo_loss_flag);
    }

    // sort_by is stable
    summaries.sort_by(|a, b| b.incidents.cmp(&a.incidents));
    summaries.truncate(limit);
    summaries
}

/// Radial axis extent: largest metric plus 20% headroom, 0 when empty.
pub fn radar_extent(summaries: &[CountrySummary]) -> f64 {
    summaries
        .iter()
        .flat_map(CountrySummary::radar_values)
        .fold(0.0, f64::max)
        * 1.2
}

// ---------------------------------------------------------------------------
// Severity distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: usize,
}

/// Always High, Medium, Low.
pub fn severity_distribution(view: &IncidentView<'_>) -> [SeverityCount; 3] {
    let mut out = Severity::DISPLAY_ORDER.map(|severity| SeverityCount { severity, count: 0 });
    for incident in view.iter() {
        if let Some(slot) = out.iter_mut().find(|s| s.severity == incident.severity) {
            slot.count += 1;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Monthly totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub month: Month,
    pub incidents: usize,
    pub casualties: u64,
}

/// Jan..Dec across all years in scope, zero-filled.
pub fn monthly_totals(view: &IncidentView<'_>) -> [MonthlyTotal; 12] {
    let mut out = Month::ALL.map(|month| MonthlyTotal {
        month,
        incidents: 0,
        casualties: 0,
    });
    for incident in view.iter() {
        if let Some(month) = incident.month {
            let slot = &mut out[month.index()];
            slot.incidents += 1;
            slot.casualties += u64::from(incident.casualties_or_zero());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Kpis {
    pub incidents: usize,
    pub casualties: u64,
    pub cargo_loss_events: u64,
    pub countries: usize,
}

pub fn kpis(view: &IncidentView<'_>) -> Kpis {
    let mut countries = BTreeSet::new();
    let mut out = Kpis::default();
    for incident in view.iter() {
        out.incidents += 1;
        out.casualties += u64::from(incident.casualties_or_zero());
        out.cargo_loss_events += u64::from(incident.cargo_loss_flag);
        countries.extend(incident.country.as_deref());
    }
    out.countries = countries.len();
    out
}

// ---------------------------------------------------------------------------
// Incident → vessel → country breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyCount {
    pub incident_type: String,
    pub vessel_type: String,
    pub country: String,
    pub count: usize,
}

/// Counts per (incident type, vessel type, country), ordered by key. Rows
/// missing any of the three are left out.
pub fn hierarchy(view: &IncidentView<'_>) -> Vec<HierarchyCount> {
    let mut counts: BTreeMap<(&str, &str, &str), usize> = BTreeMap::new();
    for incident in view.iter() {
        if let (Some(it), Some(vt), Some(c)) = (
            incident.incident_type.as_deref(),
            incident.vessel_type.as_deref(),
            incident.country.as_deref(),
        ) {
            *counts.entry((it, vt, c)).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|((it, vt, c), count)| HierarchyCount {
            incident_type: it.to_string(),
            vessel_type: vt.to_string(),
            country: c.to_string(),
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Casualty histogram
// ---------------------------------------------------------------------------

/// `[start, end)`; the last bin also includes `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over the observed casualty span (null as 0).
pub fn casualty_histogram(view: &IncidentView<'_>, bins: usize) -> Vec<HistogramBin> {
    let values: Vec<u32> = view.iter().map(Incident::casualties_or_zero).collect();
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            start: f64::from(min),
            end: f64::from(min) + 1.0,
            count: values.len(),
        }];
    }

    let start = f64::from(min);
    let width = (f64::from(max) - start) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: start + i as f64 * width,
            end: start + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((f64::from(v) - start) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Dashboard – every aggregation for one selection
// ---------------------------------------------------------------------------

/// All summary views of one filtered view, recomputed from scratch on every
/// selection change.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub kpis: Kpis,
    pub locations: Vec<IncidentLocation>,
    pub timeline: Vec<TimeFrame>,
    pub flows: FlowDiagram,
    pub top_countries: Vec<CountrySummary>,
    pub severity: [SeverityCount; 3],
    pub monthly: [MonthlyTotal; 12],
    pub hierarchy: Vec<HierarchyCount>,
    pub histogram: Vec<HistogramBin>,
}

impl Dashboard {
    pub fn compute(view: &IncidentView<'_>) -> Self {
        Dashboard {
            kpis: kpis(view),
            locations: locations(view),
            timeline: temporal_series(view),
            flows: flows(view),
            top_countries: top_countries(view, TOP_COUNTRIES),
            severity: severity_distribution(view),
            monthly: monthly_totals(view),
            hierarchy: hierarchy(view),
            histogram: casualty_histogram(view, HISTOGRAM_BINS),
        }
    }

    /// `Some` when the selection matched no rows.
    pub fn notice(&self) -> Option<EmptyResultNotice> {
        (self.kpis.incidents == 0).then_some(EmptyResultNotice)
    }
}
