//! Mean execution-time heatmap.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use plotters::prelude::*;
use qbench_common::{Table, TableBuilder};
use serde::Serialize;

use super::{FrameRow, ReportError};

pub const HEATMAP_TITLE: &str = "Execution time (s)";

const CELL_PX: u32 = 64;
const LOW: (f64, f64, f64) = (250.0, 235.0, 215.0);
const HIGH: (f64, f64, f64) = (95.0, 15.0, 60.0);

/// Grid of mean `time_taken`, rows indexed by qubit count and columns by depth.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    pub qubits: Vec<u32>,
    pub depths: Vec<u32>,
    /// `cells[row][col]`, `None` where no record exists
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    /// Group rows by `(n_qbits, depth)` and pivot the mean times.
    pub fn from_rows(rows: &[FrameRow]) -> Self {
        let mut sums: BTreeMap<(u32, u32), (f64, usize)> = BTreeMap::new();
        for row in rows {
            let entry = sums.entry((row.n_qbits, row.depth)).or_insert((0.0, 0));
            entry.0 += row.time_taken;
            entry.1 += 1;
        }

        let qubits: Vec<u32> = sums.keys().map(|&(q, _)| q).collect::<BTreeSet<_>>().into_iter().collect();
        let depths: Vec<u32> = sums.keys().map(|&(_, d)| d).collect::<BTreeSet<_>>().into_iter().collect();
        let cells = qubits
            .iter()
            .map(|&q| {
                depths
                    .iter()
                    .map(|&d| sums.get(&(q, d)).map(|&(sum, n)| sum / n as f64))
                    .collect()
            })
            .collect();

        Self { qubits, depths, cells }
    }

    pub fn is_empty(&self) -> bool {
        self.qubits.is_empty()
    }

    pub fn get(&self, n_qbits: u32, depth: u32) -> Option<f64> {
        let row = self.qubits.iter().position(|&q| q == n_qbits)?;
        let col = self.depths.iter().position(|&d| d == depth)?;
        self.cells[row][col]
    }

    /// Smallest and largest cell values.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// The grid as a terminal table, values with two decimals.
    pub fn to_table(&self) -> Table {
        let mut headers = vec!["n_qbits \\ depth".to_string()];
        headers.extend(self.depths.iter().map(u32::to_string));

        self.qubits
            .iter()
            .zip(&self.cells)
            .fold(TableBuilder::new().headers(headers), |builder, (q, row)| {
                let mut cells = vec![q.to_string()];
                cells.extend(row.iter().map(|v| v.map(|v| format!("{v:.2}")).unwrap_or_default()));
                builder.row(cells)
            })
            .build()
    }
}

fn shade(t: f64) -> RGBColor {
    let lerp = |a: f64, b: f64| (a + (b - a) * t.clamp(0.0, 1.0)).round() as u8;
    RGBColor(lerp(LOW.0, HIGH.0), lerp(LOW.1, HIGH.1), lerp(LOW.2, HIGH.2))
}

/// Render `heatmap` as an annotated SVG at `path`.
pub fn render_heatmap_svg(heatmap: &Heatmap, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let path = path.as_ref();
    let (lo, hi) = heatmap.range().ok_or(ReportError::Empty)?;
    let plot_err = |e: &dyn std::fmt::Display| ReportError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let cols = heatmap.depths.len() as u32;
    let rows = heatmap.qubits.len() as u32;
    let size = (cols * CELL_PX + 140, rows * CELL_PX + 120);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(HEATMAP_TITLE, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..f64::from(cols), 0.0..f64::from(rows))
        .map_err(|e| plot_err(&e))?;

    let depths = heatmap.depths.clone();
    let qubits = heatmap.qubits.clone();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("depth")
        .y_desc("n_qbits")
        .x_labels(cols as usize * 2 + 1)
        .y_labels(rows as usize * 2 + 1)
        .x_label_formatter(&|x| axis_label(&depths, *x))
        .y_label_formatter(&|y| axis_label(&qubits, *y))
        .draw()
        .map_err(|e| plot_err(&e))?;

    let span = if hi > lo { hi - lo } else { 1.0 };
    let cells = heatmap.cells.iter().enumerate().flat_map(|(r, row)| {
        row.iter().enumerate().filter_map(move |(c, v)| v.map(|v| (r as f64, c as f64, v)))
    });

    chart
        .draw_series(cells.clone().map(|(r, c, v)| {
            Rectangle::new([(c, r), (c + 1.0, r + 1.0)], shade((v - lo) / span).filled())
        }))
        .map_err(|e| plot_err(&e))?;

    chart
        .draw_series(cells.map(|(r, c, v)| {
            let color = if (v - lo) / span > 0.5 { &WHITE } else { &BLACK };
            Text::new(
                format!("{v:.2}"),
                (c + 0.3, r + 0.6),
                ("sans-serif", 14).into_font().color(color),
            )
        }))
        .map_err(|e| plot_err(&e))?;

    root.present().map_err(|e| plot_err(&e))?;
    Ok(())
}

/// Label cell centres with the axis value, other ticks with nothing.
fn axis_label(values: &[u32], position: f64) -> String {
    let index = position - 0.5;
    if index >= 0.0 && (index - index.round()).abs() < 1e-6 {
        values.get(index.round() as usize).map(u32::to_string).unwrap_or_default()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rows() -> Vec<FrameRow> {
        vec![
            FrameRow { n_qbits: 1, depth: 1, time_taken: 0.25 },
            FrameRow { n_qbits: 1, depth: 1, time_taken: 0.75 },
            FrameRow { n_qbits: 1, depth: 2, time_taken: 1.0 },
            FrameRow { n_qbits: 2, depth: 1, time_taken: 2.0 },
        ]
    }

    #[test]
    fn test_heatmap_means_and_pivots() {
        let heatmap = Heatmap::from_rows(&rows());
        assert_eq!(heatmap.qubits, vec![1, 2]);
        assert_eq!(heatmap.depths, vec![1, 2]);
        assert_eq!(heatmap.get(1, 1), Some(0.5));
        assert_eq!(heatmap.get(1, 2), Some(1.0));
        assert_eq!(heatmap.get(2, 2), None);
        assert_eq!(heatmap.range(), Some((0.5, 2.0)));
    }

    #[test]
    fn test_empty_heatmap() {
        let heatmap = Heatmap::from_rows(&[]);
        assert!(heatmap.is_empty());
        assert_eq!(heatmap.range(), None);
    }

    #[test]
    fn test_table_uses_two_decimals() {
        let table = Heatmap::from_rows(&rows()).to_table();
        assert_eq!(table.headers(), &["n_qbits \\ depth", "1", "2"]);
        assert_eq!(table.rows()[0], vec!["1", "0.50", "1.00"]);
        assert_eq!(table.rows()[1], vec!["2", "2.00", ""]);
    }

    #[test]
    fn test_svg_is_written_with_title() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heatmap.svg");
        render_heatmap_svg(&Heatmap::from_rows(&rows()), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(HEATMAP_TITLE));
        assert!(svg.contains("0.50"));
    }

    #[test]
    fn test_empty_heatmap_is_not_rendered() {
        let dir = TempDir::new().unwrap();
        let err = render_heatmap_svg(&Heatmap::default(), dir.path().join("h.svg")).unwrap_err();
        assert!(matches!(err, ReportError::Empty));
    }

    #[test]
    fn test_axis_labels_at_cell_centres() {
        assert_eq!(axis_label(&[3, 4], 0.5), "3");
        assert_eq!(axis_label(&[3, 4], 1.5), "4");
        assert_eq!(axis_label(&[3, 4], 1.0), "");
    }

    #[test]
    fn test_shade_endpoints() {
        assert_eq!(shade(0.0), RGBColor(250, 235, 215));
        assert_eq!(shade(1.0), RGBColor(95, 15, 60));
    }
}
