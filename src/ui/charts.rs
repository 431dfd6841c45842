use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::{marker_color32, severity_color, CategoryColors};
use crate::data::aggregate::{
    radar_extent, CountrySummary, Dashboard, FlowDiagram, HierarchyCount, HistogramBin,
    IncidentLocation, MarkerColor, MonthlyTotal, SeverityCount, TimeFrame, RADAR_AXES,
};
use crate::data::model::{Month, Severity};
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// KPI strip, tab bar and the active tab.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(RichText::new(format!("Cannot load data: {err}")).color(Color32::RED));
        });
        return;
    }

    let Some(dash) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore incidents  (File → Open…)");
        });
        return;
    };

    kpi_strip(ui, dash);
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
    ui.separator();

    if let Some(notice) = dash.notice() {
        ui.label(RichText::new(notice.to_string()).color(Color32::YELLOW));
        return;
    }

    match state.tab {
        Tab::Map => incident_map(ui, &dash.locations),
        Tab::Timeline => timeline(ui, &dash.timeline, &mut state.timeline_frame, &state.incident_colors),
        Tab::Flow => flow_table(ui, &dash.flows),
        Tab::Radar => country_radar(ui, &dash.top_countries, &state.country_colors),
        Tab::Advanced => advanced(ui, dash),
        Tab::Monthly => monthly(ui, &dash.monthly),
    }
}

fn kpi_strip(ui: &mut Ui, dash: &Dashboard) {
    let k = &dash.kpis;
    let metrics = [
        ("Total incidents", k.incidents.to_string()),
        ("Total casualties", k.casualties.to_string()),
        ("Cargo loss events", k.cargo_loss_events.to_string()),
        ("Countries involved", k.countries.to_string()),
    ];
    ui.horizontal(|ui: &mut Ui| {
        for (label, value) in metrics {
            ui.group(|ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.label(label);
                    ui.heading(value);
                });
            });
        }
    });
}

/// Axis formatter that prints `labels[i]` at integer positions.
fn index_labels(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        let v = mark.value;
        if v.fract() != 0.0 || v < 0.0 {
            return String::new();
        }
        labels.get(v as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

fn incident_map(ui: &mut Ui, locations: &[IncidentLocation]) {
    ui.label(format!("{} incidents with coordinates", locations.len()));

    let markers: Vec<([f64; 2], String)> = locations
        .iter()
        .map(|l| ([l.longitude, l.latitude], l.popup()))
        .collect();

    Plot::new("incident_map")
        .legend(Legend::default())
        .label_formatter(move |name, point| marker_label(&markers, name, point))
        .data_aspect(1.0)
        .include_x(-180.0)
        .include_x(180.0)
        .include_y(-90.0)
        .include_y(90.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            for severity in Severity::DISPLAY_ORDER {
                let points: Vec<[f64; 2]> = locations
                    .iter()
                    .filter(|l| l.severity == severity)
                    .map(|l| [l.longitude, l.latitude])
                    .collect();
                if points.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(severity.label())
                        .color(severity_color(severity))
                        .radius(4.0),
                );
            }
        });
}

/// Hover text: the popup of the marker under the cursor, then coordinates.
/// `name` is empty when no series is hovered.
fn marker_label(markers: &[([f64; 2], String)], name: &str, point: &PlotPoint) -> String {
    let coords = format!("lat {:.2}, lon {:.2}", point.y, point.x);
    if name.is_empty() {
        return coords;
    }
    let dist = |[x, y]: [f64; 2]| (x - point.x).powi(2) + (y - point.y).powi(2);
    markers
        .iter()
        .min_by(|a, b| dist(a.0).total_cmp(&dist(b.0)))
        .map_or(coords.clone(), |(_, popup)| format!("{popup}\n{coords}"))
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

fn timeline(ui: &mut Ui, frames: &[TimeFrame], current: &mut usize, colors: &CategoryColors) {
    let Some(last) = frames.len().checked_sub(1) else {
        ui.label("No dated incidents in the current selection.");
        return;
    };
    *current = (*current).min(last);

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("◀").clicked() {
            *current = current.saturating_sub(1);
        }
        ui.add(egui::Slider::new(&mut *current, 0..=last).show_value(false));
        if ui.button("▶").clicked() {
            *current = (*current + 1).min(last);
        }
        let frame = &frames[*current];
        ui.strong(frame.label());
        ui.label(format!(
            "{} incidents, {} casualties",
            frame.incidents, frame.casualties
        ));
    });

    let frame = &frames[*current];
    let height = ui.available_height() * 0.7;

    Plot::new("timeline_scatter")
        .legend(Legend::default())
        .height(height)
        .data_aspect(1.0)
        .include_x(-180.0)
        .include_x(180.0)
        .include_y(-90.0)
        .include_y(90.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            for point in &frame.points {
                let size = f64::from(point.casualties.unwrap_or(0)).sqrt();
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[point.longitude, point.latitude]]))
                        .name(point.incident_type.as_deref().unwrap_or("Unknown"))
                        .color(colors.color_for(point.incident_type.as_deref()))
                        .radius((3.0 + size).min(15.0) as f32),
                );
            }
        });

    // Incidents per frame, current frame highlighted.
    let bars: Vec<Bar> = frames
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let fill = if i == *current {
                Color32::LIGHT_BLUE
            } else {
                Color32::GRAY
            };
            Bar::new(i as f64, f.incidents as f64).name(f.label()).fill(fill)
        })
        .collect();
    let labels = frames.iter().map(TimeFrame::label).collect();

    Plot::new("timeline_counts")
        .x_axis_formatter(index_labels(labels))
        .y_axis_label("Incidents")
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

// ---------------------------------------------------------------------------
// Flow (incident type → vessel type)
// ---------------------------------------------------------------------------

fn flow_table(ui: &mut Ui, flows: &FlowDiagram) {
    ui.label(format!(
        "{} incident types → {} vessel types, {} observed combinations",
        flows.sources.len(),
        flows.targets.len(),
        flows.links.len()
    ));
    let max = flows.links.iter().map(|l| l.count).max().unwrap_or(1).max(1) as f32;
    let nodes = flows.node_labels();

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Incident type");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Vessel type");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Count");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Share");
            });
        })
        .body(|mut body| {
            for link in &flows.links {
                let (source, target) = flows.node_link(link);
                body.row(20.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(nodes[source]);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(nodes[target]);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(link.count.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.add(egui::ProgressBar::new(link.count as f32 / max));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Country radar
// ---------------------------------------------------------------------------

/// Unit vector of radar axis `i` out of `n`, first axis pointing up.
fn radar_axis(i: usize, n: usize) -> [f64; 2] {
    let angle = FRAC_PI_2 - TAU * i as f64 / n as f64;
    [angle.cos(), angle.sin()]
}

fn country_radar(ui: &mut Ui, countries: &[CountrySummary], colors: &CategoryColors) {
    let extent = radar_extent(countries);
    let n = RADAR_AXES.len();

    Plot::new("country_radar")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .include_x(-1.3)
        .include_x(1.3)
        .include_y(-1.3)
        .include_y(1.3)
        .show(ui, |plot_ui| {
            for (i, axis) in RADAR_AXES.iter().enumerate() {
                let [x, y] = radar_axis(i, n);
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![[0.0, 0.0], [x, y]]))
                        .color(Color32::DARK_GRAY)
                        .width(1.0),
                );
                plot_ui.text(Text::new(PlotPoint::new(x * 1.15, y * 1.15), *axis));
            }

            for summary in countries {
                let values = summary.radar_values();
                let mut polygon: Vec<[f64; 2]> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let r = if extent > 0.0 { v / extent } else { 0.0 };
                        let [x, y] = radar_axis(i, n);
                        [x * r, y * r]
                    })
                    .collect();
                if let Some(first) = polygon.first().copied() {
                    polygon.push(first);
                }
                plot_ui.line(
                    Line::new(PlotPoints::from(polygon))
                        .name(&summary.country)
                        .color(colors.color_for(Some(&summary.country)))
                        .width(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Advanced: breakdown table, severity funnel, histogram
// ---------------------------------------------------------------------------

fn advanced(ui: &mut Ui, dash: &Dashboard) {
    ui.columns(2, |cols| {
        cols[0].strong("Incident → Vessel → Country");
        hierarchy_table(&mut cols[0], &dash.hierarchy);

        cols[1].strong("Severity distribution");
        severity_funnel(&mut cols[1], &dash.severity);
        cols[1].separator();
        cols[1].strong("Casualties distribution");
        histogram(&mut cols[1], &dash.histogram);
    });
}

fn hierarchy_table(ui: &mut Ui, rows: &[HierarchyCount]) {
    TableBuilder::new(ui)
        .id_salt("hierarchy")
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Incident", "Vessel", "Country", "Count"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for r in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(&r.incident_type);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(&r.vessel_type);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(&r.country);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(r.count.to_string());
                    });
                });
            }
        });
}

fn severity_funnel(ui: &mut Ui, severity: &[SeverityCount; 3]) {
    // High on top: bar i sits at y = 2 - i.
    let bars: Vec<Bar> = severity
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Bar::new((2 - i) as f64, s.count as f64)
                .name(s.severity.label())
                .fill(severity_color(s.severity))
        })
        .collect();
    let labels = severity.iter().rev().map(|s| s.severity.to_string()).collect();

    Plot::new("severity_funnel")
        .height(160.0)
        .y_axis_formatter(index_labels(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars).horizontal()));
}

fn histogram(ui: &mut Ui, bins: &[HistogramBin]) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{:.0}–{:.0}", b.start, b.end))
        })
        .collect();

    Plot::new("casualty_histogram")
        .x_axis_label("Casualties")
        .y_axis_label("Incidents")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(marker_color32(MarkerColor::Orange)))
        });
}

// ---------------------------------------------------------------------------
// Monthly
// ---------------------------------------------------------------------------

fn monthly(ui: &mut Ui, totals: &[MonthlyTotal; 12]) {
    let labels = || Month::ALL.iter().map(|m| m.to_string()).collect::<Vec<_>>();
    let half = ui.available_height() / 2.0 - 10.0;

    ui.strong("Incidents per month");
    let bars: Vec<Bar> = totals
        .iter()
        .map(|t| Bar::new(t.month.index() as f64, t.incidents as f64).name(t.month))
        .collect();
    Plot::new("monthly_incidents")
        .height(half)
        .x_axis_formatter(index_labels(labels()))
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));

    ui.strong("Total casualties per month");
    let points: Vec<[f64; 2]> = totals
        .iter()
        .map(|t| [t.month.index() as f64, t.casualties as f64])
        .collect();
    Plot::new("monthly_casualties")
        .x_axis_formatter(index_labels(labels()))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(points.clone())).width(2.0));
            plot_ui.points(Points::new(PlotPoints::from(points)).radius(4.0));
        });
}
