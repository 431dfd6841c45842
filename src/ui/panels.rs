use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::CasualtyRange;
use crate::data::model::Month;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // The Arc keeps the catalog alive while `state` is mutated below.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let catalog = dataset.table.catalog();
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let selection = &mut state.selection;

            changed |= multi_select(ui, "Year", &catalog.years, &mut selection.years, |y| {
                y.to_string()
            });
            changed |= multi_select(ui, "Month", &Month::ALL, &mut selection.months, |m| {
                m.to_string()
            });
            changed |= multi_select(
                ui,
                "Country",
                &catalog.countries,
                &mut selection.countries,
                String::clone,
            );
            changed |= multi_select(
                ui,
                "Vessel type",
                &catalog.vessel_types,
                &mut selection.vessel_types,
                String::clone,
            );
            changed |= multi_select(
                ui,
                "Incident type",
                &catalog.incident_types,
                &mut selection.incident_types,
                String::clone,
            );
            ui.separator();

            // ---- Dual-ended casualty range ----
            ui.strong("Casualty range");
            let bounds = catalog.casualty_min..=catalog.casualty_max;
            let mut low = selection.casualty_range.low;
            let mut high = selection.casualty_range.high;
            let low_changed = ui
                .add(egui::Slider::new(&mut low, bounds.clone()).text("min"))
                .changed();
            let high_changed = ui
                .add(egui::Slider::new(&mut high, bounds).text("max"))
                .changed();
            if low_changed || high_changed {
                selection.casualty_range = CasualtyRange::new(low, high);
                changed = true;
            }
            ui.separator();

            if ui.button("Reset filters").clicked() {
                selection.reset(catalog);
                changed = true;
            }
        });

    if changed {
        state.refilter();
    }
}

/// Collapsible checkbox list. Nothing ticked means the filter is off.
/// Returns whether the selection changed.
fn multi_select<T: Ord + Clone>(
    ui: &mut Ui,
    title: &str,
    options: &[T],
    selected: &mut BTreeSet<T>,
    label: impl Fn(&T) -> String,
) -> bool {
    let mut changed = false;
    let summary = if selected.is_empty() {
        "all".to_string()
    } else {
        format!("{}/{}", selected.len(), options.len())
    };

    egui::CollapsingHeader::new(RichText::new(format!("{title}  ({summary})")).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() && !selected.is_empty() {
                selected.clear();
                changed = true;
            }
            for option in options {
                let mut checked = selected.contains(option);
                if ui.checkbox(&mut checked, label(option)).changed() {
                    if checked {
                        selected.insert(option.clone());
                    } else {
                        selected.remove(option);
                    }
                    changed = true;
                }
            }
        });

    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some((visible, total)) = state.record_counts() {
            ui.label(format!("Showing {visible} of {total} records"));
            ui.separator();
        }

        if let Some(path) = &state.source {
            ui.weak(path.display().to_string());
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::YELLOW));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open incident data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open(&path);
    }
}
