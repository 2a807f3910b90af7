use std::ops::Range;
use std::path::Path;
use log::{debug, info, warn};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use crate::boundaries::CacheBoundary;
use crate::error::RenderError;
use crate::measurements::MeasurementTable;

pub const TITLE: &str = "Latency as a function of array size";
pub const X_DESC: &str = "Bytes allocated (log scale)";
pub const Y_DESC: &str = "Latency (ns log scale)";
pub const RANDOM_LABEL: &str = "Random access";
pub const SEQUENTIAL_LABEL: &str = "Sequential access";

const IMAGE_SIZE: (u32, u32) = (1280, 800);
const RANDOM_COLOUR: RGBColor = RGBColor(31, 119, 180);
const SEQUENTIAL_COLOUR: RGBColor = RGBColor(255, 127, 14);
const BROWN: RGBColor = RGBColor(165, 42, 42);
/// L1, L2 and L3 are red, green and brown, any further levels cycle through the rest
const REFERENCE_COLOURS: [RGBColor; 6] = [RED, GREEN, BROWN, MAGENTA, CYAN, BLACK];
/// Log axes are padded by this factor on each side
const AXIS_PADDING: f64 = 1.25;

/// A measured latency curve
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: &'static str,
    pub colour: RGBColor,
    /// (array size, latency) in input row order
    pub points: Vec<(f64, f64)>,
    /// Rows left out because the size or latency isn't positive
    pub masked: usize,
}

/// A vertical line marking a cache size
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub label: String,
    pub colour: RGBColor,
    pub x: f64,
}

/// Everything drawn onto the chart
///
/// Log axes can't place zero or negative values, so those points are masked out of the curves.
/// They are still counted by [`MeasurementTable::count_anomalies`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlotModel {
    pub title: &'static str,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
    pub curves: Vec<Curve>,
    pub reference_lines: Vec<ReferenceLine>,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

/// The image backend, picked from the output file extension
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Bitmap,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let extension = path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "png" | "bmp" | "jpg" | "jpeg" => Ok(ImageFormat::Bitmap),
            _ => Err(RenderError::UnsupportedFormat(extension)),
        }
    }
}

impl Curve {
    fn new(label: &'static str, colour: RGBColor, points: impl Iterator<Item = (f64, f64)>) -> Self {
        let mut masked = 0;
        let points = points
            .filter(|&(x, y)| {
                let drawable = x > 0.0 && y > 0.0;
                if !drawable {
                    masked += 1;
                }
                drawable
            })
            .collect();
        Self { label, colour, points, masked }
    }
}

impl PlotModel {
    /// Builds the chart for a table and a set of boundaries
    ///
    /// # Arguments
    ///
    /// * `table`: The measurements, plotted in row order
    /// * `boundaries`: One reference line each, coloured in order
    ///
    /// returns: Result<PlotModel, RenderError>, which fails if no point can be drawn
    pub fn new(table: &MeasurementTable, boundaries: &[CacheBoundary]) -> Result<Self, RenderError> {
        let curves = vec![
            Curve::new(RANDOM_LABEL, RANDOM_COLOUR, table.iter().map(|m| (m.array_size_bytes, m.random_latency_ns))),
            Curve::new(SEQUENTIAL_LABEL, SEQUENTIAL_COLOUR, table.iter().map(|m| (m.array_size_bytes, m.sequential_latency_ns))),
        ];
        let reference_lines: Vec<ReferenceLine> = boundaries
            .iter()
            .zip(REFERENCE_COLOURS.iter().cycle())
            .filter(|(boundary, _)| boundary.size > 0)
            .map(|(boundary, colour)| ReferenceLine {
                label: boundary.label.clone(),
                colour: *colour,
                x: boundary.size as f64,
            })
            .collect();

        let points = curves.iter().flat_map(|c| c.points.iter());
        let x_range = log_range(points.clone().map(|p| p.0).chain(reference_lines.iter().map(|l| l.x)));
        let y_range = log_range(points.map(|p| p.1));
        let (x_range, y_range) = match (x_range, y_range) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(RenderError::NoDrawableData),
        };
        for curve in curves.iter().filter(|c| c.masked > 0) {
            warn!("{} of the {} points can't be placed on a log scale and are left out", curve.masked, curve.label);
        }
        Ok(Self {
            title: TITLE,
            x_desc: X_DESC,
            y_desc: Y_DESC,
            curves,
            reference_lines,
            x_range,
            y_range,
        })
    }

    /// The total number of masked points over both curves
    pub fn masked_points(&self) -> usize {
        self.curves.iter().map(|c| c.masked).sum()
    }

    /// Draws the chart to an image file, svg or a bitmap format depending on the extension
    pub fn render_to(&self, path: &Path) -> Result<(), RenderError> {
        let format = ImageFormat::from_path(path)?;
        debug!("Rendering {:?} chart to {}", format, path.display());
        match format {
            ImageFormat::Svg => self.draw(&SVGBackend::new(path, IMAGE_SIZE).into_drawing_area())?,
            ImageFormat::Bitmap => self.draw(&BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area())?,
        }
        info!("Chart written to {}", path.display());
        Ok(())
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(draw_error)?;
        let mut chart = ChartBuilder::on(root)
            .caption(self.title, ("sans-serif", 32))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(self.x_range.clone().log_scale(), self.y_range.clone().log_scale())
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .x_desc(self.x_desc)
            .y_desc(self.y_desc)
            .draw()
            .map_err(draw_error)?;

        for curve in &self.curves {
            let colour = curve.colour;
            chart
                .draw_series(LineSeries::new(curve.points.iter().copied(), colour.stroke_width(2)))
                .map_err(draw_error)?
                .label(curve.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2)));
        }

        let (bottom, top) = (self.y_range.start, self.y_range.end);
        for line in &self.reference_lines {
            let colour = line.colour;
            chart
                .draw_series(LineSeries::new(vec![(line.x, bottom), (line.x, top)], colour.stroke_width(1)))
                .map_err(draw_error)?
                .label(line.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(1)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_error)?;
        root.present().map_err(draw_error)
    }
}

/// Renders a table with its cache boundaries to an image file
pub fn render(table: &MeasurementTable, boundaries: &[CacheBoundary], path: &Path) -> Result<(), RenderError> {
    let model = PlotModel::new(table, boundaries)?;
    model.render_to(path)
}

/// Covers every value with some padding, None when there are no values
fn log_range(values: impl Iterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })?;
    Some(min / AXIS_PADDING..max * AXIS_PADDING)
}

fn draw_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundaries::compute_cache_boundaries;
    use crate::measurements::Measurement;

    fn table(rows: &[(f64, f64, f64)]) -> MeasurementTable {
        MeasurementTable::new(rows.iter().map(|&(size, random, sequential)| Measurement {
            array_size_bytes: size,
            random_latency_ns: random,
            sequential_latency_ns: sequential,
        }).collect())
    }

    #[test]
    fn curves_follow_row_order() {
        let t = table(&[(100.0, 1.0, 0.5), (1000.0, 2.0, 0.6), (1e6, 10.0, 0.7), (1e8, 80.0, 0.9)]);
        let model = PlotModel::new(&t, &compute_cache_boundaries()).unwrap();
        let xs: Vec<f64> = model.curves[0].points.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![100.0, 1000.0, 1e6, 1e8]);
        assert_eq!(model.curves[1].points[2], (1e6, 0.7));
        assert_eq!(model.curves[0].label, RANDOM_LABEL);
        assert_eq!(model.curves[1].label, SEQUENTIAL_LABEL);
    }

    #[test]
    fn unsorted_rows_are_not_sorted() {
        let t = table(&[(300.0, 1.0, 1.0), (100.0, 1.0, 1.0), (200.0, 1.0, 1.0)]);
        let model = PlotModel::new(&t, &[]).unwrap();
        let xs: Vec<f64> = model.curves[1].points.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![300.0, 100.0, 200.0]);
    }

    #[test]
    fn one_reference_line_per_boundary() {
        let t = table(&[(100.0, 1.0, 0.5)]);
        let model = PlotModel::new(&t, &compute_cache_boundaries()).unwrap();
        let lines: Vec<(&str, RGBColor, f64)> = model.reference_lines.iter().map(|l| (l.label.as_str(), l.colour, l.x)).collect();
        assert_eq!(lines, vec![
            ("L1 (32 KiB)", RED, 32768.0),
            ("L2 (256 KiB)", GREEN, 262144.0),
            ("L3 (9 MiB)", BROWN, 9437184.0),
        ]);
    }

    #[test]
    fn ranges_cover_data_and_boundaries() {
        let t = table(&[(100.0, 1.5, 0.5), (1000.0, 4.0, 0.8)]);
        let model = PlotModel::new(&t, &compute_cache_boundaries()).unwrap();
        assert!(model.x_range.start < 100.0);
        assert!(model.x_range.end > 9437184.0);
        assert!(model.y_range.start < 0.5 && model.y_range.start > 0.0);
        assert!(model.y_range.end > 4.0);
    }

    #[test]
    fn non_positive_points_are_masked() {
        let t = table(&[(100.0, -1.0, 0.5), (200.0, 2.0, 0.0), (300.0, 3.0, 0.7)]);
        let model = PlotModel::new(&t, &[]).unwrap();
        assert_eq!(model.curves[0].points, vec![(200.0, 2.0), (300.0, 3.0)]);
        assert_eq!(model.curves[1].points, vec![(100.0, 0.5), (300.0, 0.7)]);
        assert_eq!(model.masked_points(), 2);
        // Masking doesn't change what is reported
        assert_eq!(t.count_anomalies().negative_random, 1);
    }

    #[test]
    fn nothing_drawable_is_an_error() {
        assert!(matches!(PlotModel::new(&MeasurementTable::default(), &compute_cache_boundaries()), Err(RenderError::NoDrawableData)));
        let t = table(&[(100.0, -1.0, -2.0)]);
        assert!(matches!(PlotModel::new(&t, &[]), Err(RenderError::NoDrawableData)));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ImageFormat::from_path(Path::new("latency.svg")).unwrap(), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_path(Path::new("out/Latency.PNG")).unwrap(), ImageFormat::Bitmap);
        assert!(matches!(ImageFormat::from_path(Path::new("latency.pdf")), Err(RenderError::UnsupportedFormat(e)) if e == "pdf"));
        assert!(ImageFormat::from_path(Path::new("latency")).is_err());
    }
}
