//! Bar chart rendering service
//!
//! Builds an SVG document from data rows with selections, a band scale for
//! the categories and a linear scale for the values.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::data::{parse_rows, row_label, row_value, DataFormat};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::ChartSettings;
use crate::domain::{
    host_ref, max_with, min_with, scale_band, scale_linear, select_node, Datum, Document, Scale,
    Value,
};
use crate::infrastructure::traits::FileSystem;

/// Rendered chart plus what went into it.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub document: Document,
    /// One bar per data row
    pub bars: usize,
    /// Value domain of the y axis
    pub y_domain: [f64; 2],
}

impl BarChart {
    pub fn to_markup(&self) -> String {
        self.document.to_markup()
    }
}

/// Service for turning data files into SVG bar charts.
pub struct ChartService {
    fs: Arc<dyn FileSystem>,
}

impl ChartService {
    /// Create a new chart service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read and parse the rows of a JSON or TOML data file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_rows(&self, path: &Path) -> ApplicationResult<Vec<Datum>> {
        let format = DataFormat::from_path(path)?;
        if !self.fs.exists(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("data file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::DataFormat {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read data file", path)?;
        parse_rows(&content, format, path)
    }

    /// Load `path` and render it.
    pub fn bar_chart_from_file(
        &self,
        path: &Path,
        settings: &ChartSettings,
    ) -> ApplicationResult<BarChart> {
        let rows = self.load_rows(path)?;
        if rows.is_empty() {
            return Err(ApplicationError::NoData(format!(
                "{} contains no rows",
                path.display()
            )));
        }
        self.bar_chart(&rows, settings)
    }

    /// Render `rows` as a bar chart.
    ///
    /// Layout: `svg > g.plot` translated by the margin, holding one
    /// `rect.bar` and one `text.label` per row and a `g.axis` of `g.tick`
    /// groups. Rows without a numeric value get a zero-height bar.
    #[instrument(level = "debug", skip(self, rows, settings), fields(rows = rows.len()))]
    pub fn bar_chart(&self, rows: &[Datum], settings: &ChartSettings) -> ApplicationResult<BarChart> {
        settings.validate()?;
        if rows.is_empty() {
            return Err(ApplicationError::NoData("no rows given".to_string()));
        }

        let width = settings.width;
        let height = settings.height;
        let margin = settings.margin;
        let inner_width = width - 2.0 * margin;
        let inner_height = height - 2.0 * margin;

        let labels: Vec<String> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| row_label(row, i, &settings.label_key))
            .collect();
        let value_key = settings.value_key.clone();
        let y_max = max_with(rows, |row, _, _| row_value(row, &value_key))
            .unwrap_or(0.0)
            .max(0.0);
        let y_min = min_with(rows, |row, _, _| row_value(row, &value_key))
            .unwrap_or(0.0)
            .min(0.0);
        // All-zero data still needs a non-degenerate domain
        let y_domain = if y_max > y_min { [y_min, y_max] } else { [0.0, 1.0] };
        debug!("bar_chart: y domain {:?}", y_domain);

        let x = scale_band()
            .with_domain(labels)
            .with_range([0.0, inner_width])
            .with_padding(settings.padding);
        let y = scale_linear()
            .with_domain(y_domain)
            .with_range([inner_height, 0.0]);

        let host = host_ref(Document::new());
        let root = host.borrow().root();

        let svg = select_node(&host, root)
            .append("svg")?
            .attr("width", format_number(width))?
            .attr("height", format_number(height))?
            .attr(
                "viewBox",
                format!("0 0 {} {}", format_number(width), format_number(height)),
            )?;

        if let Some(title) = &settings.title {
            svg.append("text")?
                .attr("class", "title")?
                .attr("x", format_number(width / 2.0))?
                .attr("y", format_number(margin * 0.6))?
                .attr("text-anchor", "middle")?
                .text(title)?;
        }

        let plot = svg
            .append("g")?
            .attr("class", "plot")?
            .attr(
                "transform",
                format!("translate({},{})", format_number(margin), format_number(margin)),
            )?;

        let bars = plot
            .select_all("rect.bar")?
            .data(rows.iter().cloned())?
            .enter()
            .append("rect")?
            .attr("class", "bar")?
            .attr("x", {
                let (x, key) = (x.clone(), settings.label_key.clone());
                Value::computed(move |d, i| {
                    format_number(x.scale(row_label(d, i, &key).as_str()).unwrap_or(0.0))
                })
            })?
            .attr("y", {
                let key = settings.value_key.clone();
                Value::computed(move |d, _| {
                    let v = row_value(d, &key).unwrap_or(0.0);
                    format_number(y.scale(&v.max(0.0)))
                })
            })?
            .attr("width", format_number(x.bandwidth()))?
            .attr("height", {
                let key = settings.value_key.clone();
                Value::computed(move |d, _| {
                    let v = row_value(d, &key).unwrap_or(0.0);
                    format_number((y.scale(&v) - y.scale(&0.0)).abs())
                })
            })?
            .style("fill", settings.fill.as_str())?;

        plot.select_all("text.label")?
            .data(rows.iter().cloned())?
            .enter()
            .append("text")?
            .attr("class", "label")?
            .attr("x", {
                let (x, key) = (x.clone(), settings.label_key.clone());
                Value::computed(move |d, i| {
                    let start = x.scale(row_label(d, i, &key).as_str()).unwrap_or(0.0);
                    format_number(start + x.bandwidth() / 2.0)
                })
            })?
            .attr("y", format_number(inner_height + margin * 0.6))?
            .attr("text-anchor", "middle")?
            .text({
                let key = settings.label_key.clone();
                Value::computed(move |d, i| row_label(d, i, &key))
            })?;

        if settings.ticks > 0 {
            let tick_values = y.ticks(settings.ticks);
            let ticks = plot
                .append("g")?
                .attr("class", "axis")?
                .select_all("g.tick")?
                .data(tick_values.iter().copied())?
                .enter()
                .append("g")?
                .attr("class", "tick")?
                .attr(
                    "transform",
                    Value::computed(move |d, _| {
                        format!("translate(0,{})", format_number(y.scale(&d.as_f64().unwrap_or(0.0))))
                    }),
                )?;
            ticks.append("line")?.attr("x2", "-6")?.attr("stroke", "currentColor")?;
            // New children carry no datum; rebinding by position gives each its tick value
            ticks
                .append("text")?
                .data(tick_values.iter().copied())?
                .attr("x", "-9")?
                .attr("dy", "0.32em")?
                .attr("text-anchor", "end")?
                .text(Value::computed(|d, _| {
                    format_number(d.as_f64().unwrap_or(0.0))
                }))?;
        }

        info!("Rendered bar chart with {} bars", bars.size());
        let document = host.borrow().clone();
        Ok(BarChart {
            document,
            bars: bars.size(),
            y_domain,
        })
    }

    /// Write the chart markup to `path`, creating parent directories.
    #[instrument(level = "debug", skip(self, chart))]
    pub fn write_svg(&self, chart: &BarChart, path: &Path) -> ApplicationResult<PathBuf> {
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write_atomic(path, &chart.to_markup())
            .with_path_context("write svg", path)?;
        Ok(path.to_path_buf())
    }
}

/// Rounds to two decimals and drops trailing zeros (`40`, `12.5`).
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        // avoid "-0"
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(40.0), "40");
        assert_eq!(format_number(12.499), "12.5");
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(1.0 / 3.0), "0.33");
    }
}
