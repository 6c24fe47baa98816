use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::analysis::stats::format_percent;
use crate::data::model::Label;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Left side panel – label statistics
// ---------------------------------------------------------------------------

/// Render the label statistics report.
pub fn report_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Label statistics");
    ui.separator();

    let report = match &state.report {
        Some(r) => r,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Pixel counts ----
            ui.strong("Number of pixels in each image");
            TableBuilder::new(ui)
                .id_salt("pixel_counts")
                .striped(true)
                .column(Column::auto().at_least(80.0))
                .column(Column::auto().at_least(80.0))
                .header(ROW_HEIGHT, |mut header| {
                    header.col(|ui| {
                        ui.strong("Image");
                    });
                    header.col(|ui| {
                        ui.strong("Pixels");
                    });
                })
                .body(|mut body| {
                    for (source, count) in &report.pixel_counts {
                        body.row(ROW_HEIGHT, |mut row| {
                            row.col(|ui| {
                                ui.label(source.to_string());
                            });
                            row.col(|ui| {
                                ui.monospace(count.to_string());
                            });
                        });
                    }
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.strong("Total");
                        });
                        row.col(|ui| {
                            ui.monospace(RichText::new(report.total_pixels.to_string()).strong());
                        });
                    });
                });
            ui.add_space(12.0);

            // ---- Percentage table ----
            ui.strong("Percentage of pixels in each class");
            TableBuilder::new(ui)
                .id_salt("label_percentages")
                .striped(true)
                .column(Column::auto().at_least(60.0))
                .columns(Column::auto().at_least(60.0), Label::REPORT_ORDER.len())
                .header(ROW_HEIGHT, |mut header| {
                    header.col(|ui| {
                        ui.strong("Image");
                    });
                    for label in Label::REPORT_ORDER {
                        header.col(|ui| {
                            ui.strong(format!("label = {label}"));
                        });
                    }
                })
                .body(|mut body| {
                    let rows = report
                        .label_fractions
                        .iter()
                        .map(|(s, fr)| (s.to_string(), fr))
                        .chain([("Total".to_string(), &report.mean_fractions)]);
                    for (name, fractions) in rows {
                        body.row(ROW_HEIGHT, |mut row| {
                            row.col(|ui| {
                                ui.label(&name);
                            });
                            for fr in fractions {
                                row.col(|ui| {
                                    ui.monospace(format_percent(*fr));
                                });
                            }
                        });
                    }
                });
            ui.label(
                RichText::new("Total = unweighted mean over images")
                    .small()
                    .weak(),
            );
            ui.add_space(12.0);

            // ---- Duplicate check ----
            if report.has_duplicates() {
                ui.label(
                    RichText::new(format!(
                        "Detected observations with same coordinates ({} triples)",
                        report.duplicate_coordinates
                    ))
                    .color(Color32::RED),
                );
            } else {
                ui.label("No observations with same coordinates found in each image");
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, figure tabs and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let mut clicked = None;
        for (i, fig) in state.figures.iter().enumerate() {
            if ui.selectable_label(state.selected == i, &fig.title).clicked() {
                clicked = Some(i);
            }
        }
        if let Some(i) = clicked {
            state.select(i);
        }

        ui.separator();

        if let Some(report) = &state.report {
            ui.label(format!(
                "{} pixels in {} images",
                report.total_pixels,
                report.pixel_counts.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Ask for one or more data files.  `None` when the dialog is cancelled.
pub fn pick_data_files() -> Option<Vec<std::path::PathBuf>> {
    rfd::FileDialog::new()
        .set_title("Open labeled pixel data")
        .add_filter("Supported files", &["txt", "dat", "parquet", "pq", "json", "csv"])
        .add_filter("MISR image", &["txt", "dat"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_files()
}

pub fn open_file_dialog(state: &mut AppState) {
    let Some(paths) = pick_data_files() else {
        return;
    };

    match crate::data::loader::load_paths(&paths) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} pixels from {} image(s)",
                dataset.len(),
                dataset.source_count()
            );
            state.set_dataset(&dataset);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
