// Dweve perfmerge - Benchmark Result Aggregation
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Chart rendering from a written report.
//!
//! Charts are derived purely from the report cells: every value is recovered
//! with [`parse_cell`](crate::report::parse_cell), so the charts can be
//! regenerated from any report file without the raw documents. Drawing is
//! delegated to `plotters`; each chart is rendered to SVG and embedded in a
//! single HTML page.

use crate::error::{PerfError, Result};
use crate::record::{Metric, SourceGroup};
use crate::report::{GroupLabels, ParsedReport};
use plotters::prelude::*;
use std::fs;
use std::path::Path;

const SERIES_COLORS: [RGBColor; 2] = [RGBColor(31, 119, 180), RGBColor(255, 127, 14)];

// Font sizes
const TITLE_FONT_SIZE: u32 = 22;
const TICK_LABEL_FONT_SIZE: u32 = 13;
const AXIS_LABEL_FONT_SIZE: u32 = 15;
const LEGEND_FONT_SIZE: u32 = 14;

// Layout
const CHART_HEIGHT: u32 = 520;
const MIN_CHART_WIDTH: u32 = 640;
const CATEGORY_WIDTH: u32 = 110;
const X_LABEL_AREA_SIZE: u32 = 60;
const Y_LABEL_AREA_SIZE: u32 = 100;
const GROUP_WIDTH: f64 = 0.8;

const STYLE: &str = "body { font-family: sans-serif; margin: 2em; color: #222; }\n\
h1 { font-size: 1.5em; }\n\
h2 { font-size: 1.2em; margin-top: 2em; }\n";

/// Chart output options.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Page title.
    pub title: String,
    /// Cell prefixes used in the report.
    pub labels: GroupLabels,
    /// Legend names of groups A and B.
    pub series_names: [String; 2],
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "SharedMatrix vs SharedTree".to_string(),
            labels: GroupLabels::default(),
            series_names: ["SharedMatrix".to_string(), "SharedTree".to_string()],
        }
    }
}

impl ChartConfig {
    fn series_name(&self, group: SourceGroup) -> &str {
        &self.series_names[group as usize]
    }
}

/// One bar: a group's value of a metric for an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub operation: String,
    pub metric: Metric,
    pub source_group: SourceGroup,
    pub value: f64,
}

/// A heap usage bar with its margin of error.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBarPoint {
    pub operation: String,
    pub source_group: SourceGroup,
    pub heap_avg: f64,
    pub margin_of_error: f64,
}

/// Every present value of the report, in row then metric then group order.
pub fn chart_points(report: &ParsedReport, labels: &GroupLabels) -> Vec<ChartPoint> {
    let mut points = Vec::new();
    for row in &report.rows {
        for metric in &report.metrics {
            for group in SourceGroup::ALL {
                if let Some(value) = row.value(*metric, labels.label(group)) {
                    points.push(ChartPoint {
                        operation: row.operation.clone(),
                        metric: *metric,
                        source_group: group,
                        value,
                    });
                }
            }
        }
    }
    points
}

/// Heap usage bars for groups that report both heap average and margin of error.
pub fn heap_error_bars(report: &ParsedReport, labels: &GroupLabels) -> Vec<ErrorBarPoint> {
    let mut points = Vec::new();
    for row in &report.rows {
        for group in SourceGroup::ALL {
            let label = labels.label(group);
            let heap = row.value(Metric::HeapAvg, label);
            let error = row.value(Metric::MarginOfError, label);
            if let (Some(heap_avg), Some(margin_of_error)) = (heap, error) {
                points.push(ErrorBarPoint {
                    operation: row.operation.clone(),
                    source_group: group,
                    heap_avg,
                    margin_of_error,
                });
            }
        }
    }
    points
}

struct Bar {
    value: f64,
    error: Option<f64>,
}

struct BarChart {
    title: String,
    y_label: &'static str,
    categories: Vec<String>,
    /// `series[group][category]`
    series: [Vec<Option<Bar>>; 2],
}

impl BarChart {
    fn from_points(points: &[ChartPoint], metric: Metric, config: &ChartConfig) -> Option<Self> {
        let points: Vec<&ChartPoint> = points.iter().filter(|p| p.metric == metric).collect();
        if points.is_empty() {
            return None;
        }
        let mut categories: Vec<String> = points.iter().map(|p| p.operation.clone()).collect();
        categories.dedup();

        let series: [Vec<Option<Bar>>; 2] = SourceGroup::ALL.map(|group| {
            categories
                .iter()
                .map(|operation| {
                    points
                        .iter()
                        .find(|p| p.source_group == group && &p.operation == operation)
                        .map(|p| Bar {
                            value: p.value,
                            error: None,
                        })
                })
                .collect()
        });

        Some(BarChart {
            title: format!(
                "{} - {} vs {}",
                metric,
                config.series_name(SourceGroup::A),
                config.series_name(SourceGroup::B)
            ),
            y_label: metric.column_header(),
            categories,
            series,
        })
    }

    fn from_error_bars(points: &[ErrorBarPoint], config: &ChartConfig) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut categories: Vec<String> = points.iter().map(|p| p.operation.clone()).collect();
        categories.dedup();

        let series: [Vec<Option<Bar>>; 2] = SourceGroup::ALL.map(|group| {
            categories
                .iter()
                .map(|operation| {
                    points
                        .iter()
                        .find(|p| p.source_group == group && &p.operation == operation)
                        .map(|p| Bar {
                            value: p.heap_avg,
                            error: Some(p.margin_of_error.abs()),
                        })
                })
                .collect()
        });

        Some(BarChart {
            title: format!(
                "Heap Memory Usage with Error Bars - {} vs {}",
                config.series_name(SourceGroup::A),
                config.series_name(SourceGroup::B)
            ),
            y_label: "Heap Usage (bytes)",
            categories,
            series,
        })
    }

    /// Value range covered by every bar and whisker, always including zero.
    fn y_range(&self) -> (f64, f64) {
        let (low, high) = self
            .series
            .iter()
            .flatten()
            .flatten()
            .fold((0.0_f64, 0.0_f64), |(low, high), bar| {
                let error = bar.error.unwrap_or(0.0);
                (low.min(bar.value - error), high.max(bar.value + error))
            });
        if high > low {
            (low, high * 1.1)
        } else {
            (0.0, 1.0)
        }
    }

    /// Horizontal span of one bar, centred around its category.
    fn bar_span(&self, category: usize, series: usize) -> (f64, f64) {
        let bar_width = GROUP_WIDTH / self.series.len() as f64;
        let offset = (series as f64 - (self.series.len() as f64 - 1.0) / 2.0) * bar_width;
        let center = category as f64 + offset;
        (center - bar_width / 2.0 + 0.02, center + bar_width / 2.0 - 0.02)
    }

    /// Draws the chart into an SVG document.
    fn to_svg(&self, config: &ChartConfig) -> Result<String> {
        let count = self.categories.len();
        let width = MIN_CHART_WIDTH.max(Y_LABEL_AREA_SIZE + CATEGORY_WIDTH * count as u32);
        let (y_min, y_max) = self.y_range();

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, CHART_HEIGHT)).into_drawing_area();
            root.fill(&WHITE).map_err(PerfError::chart)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(&self.title, ("sans-serif", TITLE_FONT_SIZE))
                .margin(20)
                .x_label_area_size(X_LABEL_AREA_SIZE)
                .y_label_area_size(Y_LABEL_AREA_SIZE)
                .build_cartesian_2d(-0.5..(count as f64 - 0.5), y_min..y_max)
                .map_err(PerfError::chart)?;

            let categories = &self.categories;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(count)
                .x_label_formatter(&|x: &f64| category_label(categories, *x))
                .y_desc(self.y_label)
                .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
                .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
                .draw()
                .map_err(PerfError::chart)?;

            for (s, bars) in self.series.iter().enumerate() {
                let color = SERIES_COLORS[s];
                let rects = bars.iter().enumerate().filter_map(|(i, bar)| {
                    bar.as_ref().map(|bar| {
                        let (left, right) = self.bar_span(i, s);
                        Rectangle::new([(left, 0.0), (right, bar.value)], color.filled())
                    })
                });
                chart
                    .draw_series(rects)
                    .map_err(PerfError::chart)?
                    .label(config.series_name(SourceGroup::ALL[s]))
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled())
                    });

                let whiskers = bars.iter().enumerate().filter_map(|(i, bar)| {
                    let bar = bar.as_ref()?;
                    let error = bar.error?;
                    let (left, right) = self.bar_span(i, s);
                    Some(ErrorBar::new_vertical(
                        (left + right) / 2.0,
                        bar.value - error,
                        bar.value,
                        bar.value + error,
                        BLACK.stroke_width(2),
                        8,
                    ))
                });
                chart.draw_series(whiskers).map_err(PerfError::chart)?;
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(("sans-serif", LEGEND_FONT_SIZE))
                .draw()
                .map_err(PerfError::chart)?;

            root.present().map_err(PerfError::chart)?;
        }
        Ok(svg)
    }
}

/// Maps an axis position back to its operation name; off-centre ticks stay blank.
fn category_label(categories: &[String], x: f64) -> String {
    let index = x.round();
    if index < 0.0 || (x - index).abs() > 0.3 {
        return String::new();
    }
    categories.get(index as usize).cloned().unwrap_or_default()
}

/// Renders every chart into one self-contained HTML page.
///
/// One grouped bar chart per metric column with data, followed by the heap
/// usage chart with margin-of-error bars.
///
/// # Errors
///
/// Returns [`PerfError::Chart`] if a chart cannot be drawn.
pub fn render_html(report: &ParsedReport, config: &ChartConfig) -> Result<String> {
    let points = chart_points(report, &config.labels);
    let error_bars = heap_error_bars(report, &config.labels);

    let mut charts: Vec<BarChart> = report
        .metrics
        .iter()
        .filter_map(|metric| BarChart::from_points(&points, *metric, config))
        .collect();
    charts.extend(BarChart::from_error_bars(&error_bars, config));

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&config.title)));
    html.push_str("<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&config.title)));

    if charts.is_empty() {
        html.push_str("<p>No data to plot.</p>\n");
    }
    for chart in &charts {
        html.push_str(&format!("<h2>{}</h2>\n", escape_html(&chart.title)));
        html.push_str(&chart.to_svg(config)?);
        html.push('\n');
    }

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

/// Writes [`render_html`] output to a file.
///
/// # Errors
///
/// Returns [`PerfError::Chart`] if drawing fails and
/// [`PerfError::Io`] if the file cannot be written.
pub fn export_html(report: &ParsedReport, config: &ChartConfig, path: &Path) -> Result<()> {
    let html = render_html(report, config)?;
    fs::write(path, html)?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const REPORT: &str = "Operation,Elapsed Time (s),Heap Used Avg,Heap Used StdDev,Margin of Error,Relative Margin of Error\n\
Insert row,\"SM: 0.5\nST: 0.25\",\"SM: 2000\nST: 500\",,\"SM: 10\",\n\
Remove <row>,,\"ST: 42\",,\"ST: 2\",\n";

    fn parsed() -> ParsedReport {
        ParsedReport::from_reader(REPORT.as_bytes(), b',').unwrap()
    }

    #[test]
    fn test_chart_points() {
        let points = chart_points(&parsed(), &GroupLabels::default());
        assert_eq!(points.len(), 7);
        assert_eq!(
            points[0],
            ChartPoint {
                operation: "Insert row".into(),
                metric: Metric::ElapsedTime,
                source_group: SourceGroup::A,
                value: 0.5,
            }
        );
        assert!(points
            .iter()
            .any(|p| p.operation == "Remove <row>" && p.metric == Metric::HeapAvg && p.value == 42.0));
    }

    #[test]
    fn test_error_bars_need_both_values() {
        let bars = heap_error_bars(&parsed(), &GroupLabels::default());
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].source_group, SourceGroup::A);
        assert_eq!(bars[0].heap_avg, 2000.0);
        assert_eq!(bars[0].margin_of_error, 10.0);
        assert_eq!(bars[1].operation, "Remove <row>");
        assert_eq!(bars[1].source_group, SourceGroup::B);
    }

    #[test]
    fn test_render_html_contains_charts() {
        let html = render_html(&parsed(), &ChartConfig::default()).unwrap();
        assert!(html.contains("<h1>SharedMatrix vs SharedTree</h1>"));
        assert!(html.contains("<h2>Heap Used Avg - SharedMatrix vs SharedTree</h2>"));
        assert!(html.contains("Heap Memory Usage with Error Bars"));
        assert!(html.contains("Remove &lt;row&gt;"));
        assert!(!html.contains("Heap Used StdDev - "));
        // Elapsed, heap, margin of error, and the error-bar chart
        assert_eq!(html.matches("<svg").count(), 4);
    }

    #[test]
    fn test_render_html_without_data() {
        let report = ParsedReport::from_reader(
            "Operation,Heap Used Avg\nInsert row,\n".as_bytes(),
            b',',
        )
        .unwrap();
        let html = render_html(&report, &ChartConfig::default()).unwrap();
        assert!(html.contains("No data to plot."));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_bar_chart_layout() {
        let config = ChartConfig::default();
        let bars = heap_error_bars(&parsed(), &config.labels);
        let chart = BarChart::from_error_bars(&bars, &config).unwrap();

        assert_eq!(chart.categories, vec!["Insert row", "Remove <row>"]);
        assert!(chart.series[0][1].is_none());
        let (low, high) = chart.y_range();
        assert_eq!(low, 0.0);
        assert!(high >= 2010.0);

        let (a_left, a_right) = chart.bar_span(0, 0);
        let (b_left, b_right) = chart.bar_span(0, 1);
        assert!(a_left > -0.5 && a_right <= b_left && b_right < 0.5);
    }

    #[test]
    fn test_category_label() {
        let categories = vec!["Insert row".to_string(), "Remove row".to_string()];
        assert_eq!(category_label(&categories, 0.0), "Insert row");
        assert_eq!(category_label(&categories, 1.1), "Remove row");
        assert_eq!(category_label(&categories, 0.5), "");
        assert_eq!(category_label(&categories, -1.0), "");
        assert_eq!(category_label(&categories, 2.0), "");
    }

    #[test]
    fn test_svg_has_legend_entries() {
        let config = ChartConfig {
            title: "Comparison".to_string(),
            series_names: ["Alpha".to_string(), "Beta".to_string()],
            ..ChartConfig::default()
        };
        let html = render_html(&parsed(), &config).unwrap();
        assert!(html.contains("<h2>Heap Used Avg - Alpha vs Beta</h2>"));
        // Headings and captions name both series; legends add more
        assert!(html.matches("Beta").count() > 8);
    }

    #[test]
    fn test_export_html() {
        let temp = NamedTempFile::new().unwrap();
        export_html(&parsed(), &ChartConfig::default(), temp.path()).unwrap();
        let content = fs::read_to_string(temp.path()).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & \"b\""), "a &amp; &quot;b&quot;");
        assert_eq!(escape_html("<row>"), "&lt;row&gt;");
    }
}
