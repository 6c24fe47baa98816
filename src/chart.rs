//! Renderer-independent chart descriptions.
//!
//! The analysis functions build these; a [`crate::render::ChartRenderer`]
//! decides how to draw them.

use eframe::egui::Color32;

/// Subplot arrangement: `rows × cols`, filled row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
}

impl GridLayout {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// A single row of `n` panels.
    pub fn row(n: usize) -> Self {
        Self::new(1, n.max(1))
    }

    /// `(row, col)` of the `i`-th subplot.
    pub fn cell(&self, i: usize) -> (usize, usize) {
        (i / self.cols, i % self.cols)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Line {
        name: String,
        color: Color32,
        points: Vec<[f64; 2]>,
    },
    Scatter {
        name: String,
        color: Color32,
        radius: f32,
        points: Vec<[f64; 2]>,
    },
}

impl Series {
    pub fn name(&self) -> &str {
        match self {
            Series::Line { name, .. } | Series::Scatter { name, .. } => name,
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            Series::Line { color, .. } | Series::Scatter { color, .. } => *color,
        }
    }

    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Series::Line { points, .. } | Series::Scatter { points, .. } => points,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subplot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    /// Per-subplot legend listing every series name.
    pub show_legend: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color32,
}

/// Legend shared by the whole figure, drawn below the grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FigureLegend {
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub layout: GridLayout,
    pub subplots: Vec<Subplot>,
    pub legend: Option<FigureLegend>,
}

impl Figure {
    /// Subplots paired with their grid cell.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), &Subplot)> {
        self.subplots
            .iter()
            .enumerate()
            .map(|(i, s)| (self.layout.cell(i), s))
    }
}
