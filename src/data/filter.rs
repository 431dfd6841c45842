use std::collections::BTreeSet;

use serde::Deserialize;

use super::model::{Catalog, Incident, IncidentTable, Month};

// ---------------------------------------------------------------------------
// Casualty range
// ---------------------------------------------------------------------------

/// How a row without a casualty count is judged by the range predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullCasualtyPolicy {
    /// Evaluate a null count as 0, the same value severity and the
    /// aggregations use. The row passes iff the range includes 0.
    #[default]
    AsZero,
    /// A null count never passes the range predicate.
    Exclude,
}

/// Inclusive `[low, high]` casualty bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasualtyRange {
    pub low: u32,
    pub high: u32,
}

impl CasualtyRange {
    pub const ALL: CasualtyRange = CasualtyRange {
        low: 0,
        high: u32::MAX,
    };

    /// Bounds given in either order.
    pub fn new(a: u32, b: u32) -> Self {
        CasualtyRange {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn contains(&self, casualties: Option<u32>, policy: NullCasualtyPolicy) -> bool {
        let value = match (casualties, policy) {
            (Some(n), _) => n,
            (None, NullCasualtyPolicy::AsZero) => 0,
            (None, NullCasualtyPolicy::Exclude) => return false,
        };
        (self.low..=self.high).contains(&value)
    }
}

impl Default for CasualtyRange {
    fn default() -> Self {
        CasualtyRange::ALL
    }
}

// ---------------------------------------------------------------------------
// Selection: the complete set of active filter values
// ---------------------------------------------------------------------------

/// Active filters. An empty categorical set means "no restriction"; the
/// casualty range is always applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub years: BTreeSet<i32>,
    pub months: BTreeSet<Month>,
    pub countries: BTreeSet<String>,
    pub vessel_types: BTreeSet<String>,
    pub incident_types: BTreeSet<String>,
    pub casualty_range: CasualtyRange,
    pub null_casualties: NullCasualtyPolicy,
}

impl Selection {
    /// No categorical restriction, casualty range spanning the observed data.
    pub fn unrestricted(catalog: &Catalog) -> Self {
        Selection {
            casualty_range: CasualtyRange::new(catalog.casualty_min, catalog.casualty_max),
            ..Selection::default()
        }
    }

    /// Clear every restriction but keep the null-casualty policy.
    pub fn reset(&mut self, catalog: &Catalog) {
        let policy = self.null_casualties;
        *self = Selection::unrestricted(catalog);
        self.null_casualties = policy;
    }

    pub fn is_unrestricted(&self, catalog: &Catalog) -> bool {
        self.years.is_empty()
            && self.months.is_empty()
            && self.countries.is_empty()
            && self.vessel_types.is_empty()
            && self.incident_types.is_empty()
            && self.casualty_range.low <= catalog.casualty_min
            && self.casualty_range.high >= catalog.casualty_max
    }

    /// Conjunction of every predicate.
    pub fn matches(&self, incident: &Incident) -> bool {
        passes(&self.years, incident.year.as_ref())
            && passes(&self.months, incident.month.as_ref())
            && passes(&self.countries, incident.country.as_ref())
            && passes(&self.vessel_types, incident.vessel_type.as_ref())
            && passes(&self.incident_types, incident.incident_type.as_ref())
            && self
                .casualty_range
                .contains(incident.casualties, self.null_casualties)
    }
}

/// Multi-valued categorical predicate (OR within the set).
fn passes<T: Ord>(selected: &BTreeSet<T>, value: Option<&T>) -> bool {
    if selected.is_empty() {
        // nothing picked: the filter is off
        return true;
    }
    value.is_some_and(|v| selected.contains(v))
}

// ---------------------------------------------------------------------------
// IncidentView – the filtered subset
// ---------------------------------------------------------------------------

/// Read-only view over an [`IncidentTable`]: an ordered list of row indices.
/// The table itself is never touched.
#[derive(Debug, Clone)]
pub struct IncidentView<'a> {
    table: &'a IncidentTable,
    indices: Vec<usize>,
}

impl<'a> IncidentView<'a> {
    /// Every row of the table, in order.
    pub fn full(table: &'a IncidentTable) -> Self {
        IncidentView {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    /// Narrow this view further. Row order is preserved.
    pub fn apply(&self, selection: &Selection) -> IncidentView<'a> {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| {
                self.table
                    .get(i)
                    .is_some_and(|incident| selection.matches(incident))
            })
            .collect();
        IncidentView {
            table: self.table,
            indices,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Incident> + '_ {
        let table = self.table;
        self.indices.iter().filter_map(move |&i| table.get(i))
    }

    pub fn table(&self) -> &'a IncidentTable {
        self.table
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl PartialEq for IncidentView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table) && self.indices == other.indices
    }
}

/// Filter the loaded table with the given selection.
pub fn apply<'a>(table: &'a IncidentTable, selection: &Selection) -> IncidentView<'a> {
    IncidentView::full(table).apply(selection)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::{Severity, SourceRecord};

    fn table(records: Vec<SourceRecord>) -> IncidentTable {
        records.into_iter().collect()
    }

    fn set<T: Ord + Clone>(values: &[T]) -> BTreeSet<T> {
        values.iter().cloned().collect()
    }

    fn strings(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    /// Row A: 5 casualties, no cargo loss, country X. Row B: 60, yes, Y.
    fn two_rows() -> IncidentTable {
        table(vec![record("X", Some(5), "No"), record("Y", Some(60), "Yes")])
    }

    #[test]
    fn two_row_scenario() {
        let t = two_rows();
        let rows = t.incidents();
        assert_eq!(rows[0].severity, Severity::Low);
        assert_eq!(rows[1].severity, Severity::High);
        assert_eq!(rows[0].cargo_loss_flag, 0);
        assert_eq!(rows[1].cargo_loss_flag, 1);

        let selection = Selection {
            casualty_range: CasualtyRange::new(0, 10),
            ..Selection::unrestricted(t.catalog())
        };
        assert_eq!(apply(&t, &selection).indices(), &[0]);
    }

    #[test]
    fn unrestricted_selection_returns_whole_table_in_order() {
        let mut no_casualties = record("Z", None, "No");
        no_casualties.date = None;
        let t = table(vec![
            record("Y", Some(30), "No"),
            no_casualties,
            record("X", Some(2), "Yes"),
            record("Y", Some(99), "No"),
        ]);

        let selection = Selection::unrestricted(t.catalog());
        assert!(selection.is_unrestricted(t.catalog()));
        assert_eq!(apply(&t, &selection).indices(), &[0, 1, 2, 3]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let t = table(vec![
            record("X", Some(5), "No"),
            record("Y", Some(60), "Yes"),
            record("X", Some(15), "Yes"),
        ]);
        let selection = Selection {
            countries: strings(&["X"]),
            casualty_range: CasualtyRange::new(0, 20),
            ..Selection::default()
        };

        let once = apply(&t, &selection);
        let twice = once.apply(&selection);
        assert_eq!(once, twice);
        assert_eq!(once.indices(), &[0, 2]);
    }

    #[test]
    fn values_within_a_filter_are_or_ed_and_filters_are_and_ed() {
        let mut a = record("X", Some(1), "No");
        a.vessel_type = Some("Ferry".into());
        let b = record("Y", Some(1), "No");
        let c = record("Z", Some(1), "No");
        let t = table(vec![a, b, c]);

        let either_country = Selection {
            countries: strings(&["X", "Y"]),
            ..Selection::default()
        };
        assert_eq!(apply(&t, &either_country).indices(), &[0, 1]);

        let and_vessel = Selection {
            vessel_types: strings(&["Tanker"]),
            ..either_country
        };
        assert_eq!(apply(&t, &and_vessel).indices(), &[1]);
    }

    #[test]
    fn empty_categorical_set_means_no_restriction() {
        let t = two_rows();
        let selection = Selection::default();
        assert!(selection.countries.is_empty());
        assert_eq!(apply(&t, &selection).len(), 2);
    }

    #[test]
    fn year_and_month_filters_match_derived_fields() {
        let mut later = record("X", Some(1), "No");
        later.date = chrono::NaiveDate::from_ymd_opt(2022, 11, 2);
        let t = table(vec![record("X", Some(1), "No"), later]);

        let by_year = Selection {
            years: set(&[2022]),
            ..Selection::default()
        };
        assert_eq!(apply(&t, &by_year).indices(), &[1]);

        let by_month = Selection {
            months: set(&[Month::Mar]),
            ..Selection::default()
        };
        assert_eq!(apply(&t, &by_month).indices(), &[0]);
    }

    #[test]
    fn undated_row_passes_date_independent_filters_only() {
        let mut undated = record("X", Some(4), "No");
        undated.date = None;
        let t = table(vec![undated]);

        let by_country = Selection {
            countries: strings(&["X"]),
            casualty_range: CasualtyRange::new(0, 10),
            ..Selection::default()
        };
        assert_eq!(apply(&t, &by_country).len(), 1);

        let by_year = Selection {
            years: set(&[2021]),
            ..Selection::default()
        };
        assert!(apply(&t, &by_year).is_empty());

        let by_month = Selection {
            months: set(&[Month::Mar]),
            ..Selection::default()
        };
        assert!(apply(&t, &by_month).is_empty());
    }

    #[test]
    fn null_category_never_passes_a_non_empty_set() {
        let mut unknown = record("X", Some(1), "No");
        unknown.country = None;
        let t = table(vec![unknown]);
        let selection = Selection {
            countries: strings(&["X"]),
            ..Selection::default()
        };
        assert!(apply(&t, &selection).is_empty());
    }

    #[test]
    fn null_casualties_count_as_zero_by_default() {
        let t = table(vec![record("X", None, "No"), record("X", Some(7), "No")]);

        let includes_zero = Selection {
            casualty_range: CasualtyRange::new(0, 10),
            ..Selection::default()
        };
        assert_eq!(apply(&t, &includes_zero).indices(), &[0, 1]);

        let above_zero = Selection {
            casualty_range: CasualtyRange::new(1, 10),
            ..Selection::default()
        };
        assert_eq!(apply(&t, &above_zero).indices(), &[1]);
    }

    #[test]
    fn exclude_policy_drops_null_casualties() {
        let t = table(vec![record("X", None, "No"), record("X", Some(0), "No")]);
        let selection = Selection {
            casualty_range: CasualtyRange::new(0, 10),
            null_casualties: NullCasualtyPolicy::Exclude,
            ..Selection::default()
        };
        assert_eq!(apply(&t, &selection).indices(), &[1]);
    }

    #[test]
    fn range_bounds_are_inclusive_and_order_insensitive() {
        let range = CasualtyRange::new(50, 11);
        assert_eq!(range, CasualtyRange { low: 11, high: 50 });
        assert!(range.contains(Some(11), NullCasualtyPolicy::AsZero));
        assert!(range.contains(Some(50), NullCasualtyPolicy::AsZero));
        assert!(!range.contains(Some(51), NullCasualtyPolicy::AsZero));
        assert!(!range.contains(None, NullCasualtyPolicy::AsZero));
    }

    #[test]
    fn reset_keeps_policy_and_restores_full_range() {
        let t = two_rows();
        let mut selection = Selection {
            countries: strings(&["X"]),
            casualty_range: CasualtyRange::new(0, 1),
            null_casualties: NullCasualtyPolicy::Exclude,
            ..Selection::default()
        };
        assert!(!selection.is_unrestricted(t.catalog()));

        selection.reset(t.catalog());
        assert!(selection.is_unrestricted(t.catalog()));
        assert_eq!(selection.casualty_range, CasualtyRange::new(5, 60));
        assert_eq!(selection.null_casualties, NullCasualtyPolicy::Exclude);
    }

    #[test]
    fn filtering_an_empty_table_yields_an_empty_view() {
        let t = IncidentTable::default();
        let view = apply(&t, &Selection::unrestricted(t.catalog()));
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }
}
