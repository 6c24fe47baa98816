use eframe::egui::{RichText, Ui, Vec2};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::chart::{FigureLegend, Series, Subplot};
use crate::state::AppState;

const TITLE_HEIGHT: f32 = 22.0;
const LEGEND_HEIGHT: f32 = 28.0;
const CELL_SPACING: f32 = 12.0;

// ---------------------------------------------------------------------------
// Figure (central panel)
// ---------------------------------------------------------------------------

/// Render the selected figure as a grid of plots.
pub fn figure_view(ui: &mut Ui, state: &AppState) {
    let figure = match state.current_figure() {
        Some(fig) => fig,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to explore labels  (File → Open…)");
            });
            return;
        }
    };

    let layout = figure.layout;
    let legend_height = if figure.legend.is_some() { LEGEND_HEIGHT } else { 0.0 };
    let avail = ui.available_size();
    let cols = layout.cols as f32;
    let rows = layout.rows as f32;
    let cell = Vec2::new(
        ((avail.x - CELL_SPACING * (cols - 1.0)) / cols).max(50.0),
        ((avail.y - legend_height - CELL_SPACING * (rows - 1.0)) / rows).max(50.0),
    );

    ui.spacing_mut().item_spacing = Vec2::splat(CELL_SPACING);
    for row in 0..layout.rows {
        ui.horizontal(|ui: &mut Ui| {
            for ((r, c), sub) in figure.cells() {
                if r != row {
                    continue;
                }
                ui.allocate_ui(cell, |ui: &mut Ui| {
                    subplot_view(ui, &format!("{}/{r}/{c}", figure.title), sub, cell);
                });
            }
        });
    }

    if let Some(legend) = &figure.legend {
        figure_legend(ui, legend);
    }
}

fn subplot_view(ui: &mut Ui, id: &str, sub: &Subplot, size: Vec2) {
    ui.vertical(|ui: &mut Ui| {
        ui.set_width(size.x);
        ui.vertical_centered(|ui: &mut Ui| {
            ui.strong(&sub.title);
        });

        let mut plot = Plot::new(id)
            .width(size.x)
            .height(size.y - TITLE_HEIGHT)
            .x_axis_label(sub.x_label.as_str())
            .y_axis_label(sub.y_label.as_str())
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true);
        if sub.show_legend {
            plot = plot.legend(Legend::default());
        }

        plot.show(ui, |plot_ui| {
            for series in &sub.series {
                let (name, color) = (series.name(), series.color());
                let pts: PlotPoints = series.points().to_vec().into();
                match series {
                    Series::Line { .. } => {
                        plot_ui.line(Line::new(pts).name(name).color(color).width(1.5));
                    }
                    Series::Scatter { radius, .. } => {
                        plot_ui.points(
                            Points::new(pts)
                                .name(name)
                                .color(color)
                                .radius(*radius)
                                .filled(true),
                        );
                    }
                }
            }
        });
    });
}

/// Legend shared by all panels, centred below the grid.
fn figure_legend(ui: &mut Ui, legend: &FigureLegend) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.horizontal(|ui: &mut Ui| {
            for entry in &legend.entries {
                ui.label(RichText::new("●").size(16.0).color(entry.color));
                ui.label(&entry.label);
                ui.add_space(16.0);
            }
        });
    });
}
