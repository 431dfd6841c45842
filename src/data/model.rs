use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Month – calendar-ordered month of year
// ---------------------------------------------------------------------------

/// Month of the year. Ordering follows the calendar, not the abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// `1..=12` → month, anything else → `None`.
    pub fn from_number(n: u32) -> Option<Month> {
        n.checked_sub(1)
            .and_then(|i| Month::ALL.get(i as usize))
            .copied()
    }

    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Zero-based position, handy for fixed-size per-month arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

impl FromStr for Month {
    type Err = String;

    /// Accepts the three-letter abbreviation in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Month::ALL
            .iter()
            .copied()
            .find(|m| m.abbrev().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown month name '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Severity – fixed casualty buckets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Reporting order used by every severity chart.
    pub const DISPLAY_ORDER: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    /// Buckets `(-1, 10]`, `(10, 50]`, `(50, ∞)`; a null count is 0.
    pub fn from_casualties(casualties: Option<u32>) -> Severity {
        match casualties.unwrap_or(0) {
            0..=10 => Severity::Low,
            11..=50 => Severity::Medium,
            _ => Severity::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Column – required source columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Date,
    Latitude,
    Longitude,
    Country,
    VesselType,
    IncidentType,
    Casualties,
    CargoLoss,
}

impl Column {
    pub const REQUIRED: [Column; 8] = [
        Column::Date,
        Column::Latitude,
        Column::Longitude,
        Column::Country,
        Column::VesselType,
        Column::IncidentType,
        Column::Casualties,
        Column::CargoLoss,
    ];

    /// Header name as it appears in the source file.
    pub fn header(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Latitude => "Latitude",
            Column::Longitude => "Longitude",
            Column::Country => "Country",
            Column::VesselType => "Vessel_Type",
            Column::IncidentType => "Incident_Type",
            Column::Casualties => "Casualties",
            Column::CargoLoss => "Cargo_Loss",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// SourceRecord – the parsed base columns of one row
// ---------------------------------------------------------------------------

/// Base fields of a row after cell parsing and before derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    pub date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country: Option<String>,
    pub vessel_type: Option<String>,
    pub incident_type: Option<String>,
    pub casualties: Option<u32>,
    pub cargo_loss: Option<String>,
}

// ---------------------------------------------------------------------------
// Incident – one row with its derived columns
// ---------------------------------------------------------------------------

/// A single maritime incident. Derived fields are computed once in
/// [`Incident::from_record`] and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<Month>,
    pub day: Option<u32>,
    pub country: Option<String>,
    pub vessel_type: Option<String>,
    pub incident_type: Option<String>,
    pub casualties: Option<u32>,
    pub cargo_loss: Option<String>,
    /// 1 iff `cargo_loss == "Yes"`.
    pub cargo_loss_flag: u8,
    pub severity: Severity,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Incident {
    pub fn from_record(record: SourceRecord) -> Self {
        let cargo_loss_flag = u8::from(record.cargo_loss.as_deref() == Some("Yes"));
        Incident {
            year: record.date.map(|d| d.year()),
            month: record.date.and_then(|d| Month::from_number(d.month())),
            day: record.date.map(|d| d.day()),
            date: record.date,
            country: record.country,
            vessel_type: record.vessel_type,
            incident_type: record.incident_type,
            severity: Severity::from_casualties(record.casualties),
            casualties: record.casualties,
            cargo_loss: record.cargo_loss,
            cargo_loss_flag,
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }

    pub fn month_name(&self) -> Option<&'static str> {
        self.month.map(Month::abbrev)
    }

    /// Casualty count with null treated as 0.
    pub fn casualties_or_zero(&self) -> u32 {
        self.casualties.unwrap_or(0)
    }

    /// `(latitude, longitude)` when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

impl From<SourceRecord> for Incident {
    fn from(record: SourceRecord) -> Self {
        Incident::from_record(record)
    }
}

// ---------------------------------------------------------------------------
// Catalog – distinct values for picker population
// ---------------------------------------------------------------------------

/// Distinct values of each filterable column, sorted, computed once per table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub years: Vec<i32>,
    pub countries: Vec<String>,
    pub vessel_types: Vec<String>,
    pub incident_types: Vec<String>,
    /// Observed casualty span with null counted as 0; `(0, 0)` when empty.
    pub casualty_min: u32,
    pub casualty_max: u32,
}

impl Catalog {
    pub fn from_incidents(incidents: &[Incident]) -> Self {
        let mut years = BTreeSet::new();
        let mut countries = BTreeSet::new();
        let mut vessel_types = BTreeSet::new();
        let mut incident_types = BTreeSet::new();

        for inc in incidents {
            years.extend(inc.year);
            countries.extend(inc.country.clone());
            vessel_types.extend(inc.vessel_type.clone());
            incident_types.extend(inc.incident_type.clone());
        }

        let casualties = incidents.iter().map(Incident::casualties_or_zero);
        let casualty_min = casualties.clone().min().unwrap_or(0);
        let casualty_max = casualties.max().unwrap_or(0);

        Catalog {
            years: years.into_iter().collect(),
            countries: countries.into_iter().collect(),
            vessel_types: vessel_types.into_iter().collect(),
            incident_types: incident_types.into_iter().collect(),
            casualty_min,
            casualty_max,
        }
    }
}

// ---------------------------------------------------------------------------
// IncidentTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable loaded table together with its catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentTable {
    incidents: Vec<Incident>,
    catalog: Catalog,
}

impl IncidentTable {
    pub fn from_incidents(incidents: Vec<Incident>) -> Self {
        let catalog = Catalog::from_incidents(&incidents);
        IncidentTable { incidents, catalog }
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn get(&self, index: usize) -> Option<&Incident> {
        self.incidents.get(index)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

impl FromIterator<SourceRecord> for IncidentTable {
    fn from_iter<I: IntoIterator<Item = SourceRecord>>(iter: I) -> Self {
        IncidentTable::from_incidents(iter.into_iter().map(Incident::from_record).collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builder used across the data-layer tests.
    pub(crate) fn record(country: &str, casualties: Option<u32>, cargo_loss: &str) -> SourceRecord {
        SourceRecord {
            date: NaiveDate::from_ymd_opt(2021, 3, 14),
            latitude: Some(10.0),
            longitude: Some(20.0),
            country: Some(country.to_string()),
            vessel_type: Some("Tanker".to_string()),
            incident_type: Some("Collision".to_string()),
            casualties,
            cargo_loss: Some(cargo_loss.to_string()),
        }
    }

    #[test]
    fn severity_buckets_follow_fixed_boundaries() {
        let cases = [
            (None, Severity::Low),
            (Some(0), Severity::Low),
            (Some(10), Severity::Low),
            (Some(11), Severity::Medium),
            (Some(50), Severity::Medium),
            (Some(51), Severity::High),
            (Some(5_000), Severity::High),
        ];
        for (casualties, expected) in cases {
            assert_eq!(Severity::from_casualties(casualties), expected, "{casualties:?}");
        }
    }

    #[test]
    fn cargo_loss_flag_only_for_exact_yes() {
        let flag = |value: Option<&str>| {
            let mut r = record("X", Some(1), "No");
            r.cargo_loss = value.map(str::to_string);
            Incident::from_record(r).cargo_loss_flag
        };
        assert_eq!(flag(Some("Yes")), 1);
        assert_eq!(flag(Some("No")), 0);
        assert_eq!(flag(Some("yes")), 0);
        assert_eq!(flag(None), 0);
    }

    #[test]
    fn derives_calendar_fields_from_date() {
        let inc = Incident::from_record(record("X", Some(3), "No"));
        assert_eq!(inc.year, Some(2021));
        assert_eq!(inc.month, Some(Month::Mar));
        assert_eq!(inc.day, Some(14));
        assert_eq!(inc.month_name(), Some("Mar"));
    }

    #[test]
    fn null_date_leaves_calendar_fields_null() {
        let mut r = record("X", Some(3), "No");
        r.date = None;
        let inc = Incident::from_record(r);
        assert_eq!(inc.year, None);
        assert_eq!(inc.month, None);
        assert_eq!(inc.day, None);
        assert_eq!(inc.month_name(), None);
    }

    #[test]
    fn months_order_by_calendar_and_parse_case_insensitively() {
        let mut names: Vec<Month> = ["Oct", "feb", "JAN", "Dec"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec![Month::Jan, Month::Feb, Month::Oct, Month::Dec]);
        assert!("Sept".parse::<Month>().is_err());
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(12), Some(Month::Dec));
        assert_eq!(Month::Dec.number(), 12);
    }

    #[test]
    fn catalog_collects_sorted_distinct_values() {
        let mut missing = record("Chile", None, "No");
        missing.country = None;
        missing.date = None;
        let table: IncidentTable = vec![
            record("Peru", Some(40), "No"),
            record("Chile", Some(7), "Yes"),
            missing,
            record("Peru", Some(2), "No"),
        ]
        .into_iter()
        .collect();

        let catalog = table.catalog();
        assert_eq!(catalog.years, vec![2021]);
        assert_eq!(catalog.countries, vec!["Chile".to_string(), "Peru".to_string()]);
        assert_eq!(catalog.casualty_min, 0);
        assert_eq!(catalog.casualty_max, 40);
    }

    #[test]
    fn empty_table_has_zero_casualty_span() {
        let table = IncidentTable::from_incidents(Vec::new());
        assert!(table.is_empty());
        assert_eq!((table.catalog().casualty_min, table.catalog().casualty_max), (0, 0));
    }
}
