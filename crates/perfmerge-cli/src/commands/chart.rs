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

//! Chart command - render a written report as HTML bar charts

use super::{max_file_size, parse_delimiter, read_file};
use crate::error::CliError;
use colored::Colorize;
use perfmerge_core::{export_html, ChartConfig, GroupLabels, ParsedReport};
use std::path::PathBuf;
use tracing::info;

/// Options of the `chart` command.
#[derive(Debug, Clone)]
pub struct ChartArgs {
    /// Report produced by the `report` command.
    pub input: PathBuf,
    pub output: PathBuf,
    pub delimiter: String,
    /// Cell prefixes used when the report was written.
    pub label_a: String,
    pub label_b: String,
    /// Legend names.
    pub name_a: String,
    pub name_b: String,
    pub title: String,
    pub quiet: bool,
}

/// Reads a CSV report back and writes one HTML page of charts.
///
/// # Errors
///
/// Returns an error if the report cannot be read, does not have the report
/// layout, or the HTML file cannot be written.
pub fn chart(args: &ChartArgs) -> Result<(), CliError> {
    let labels = GroupLabels::new(args.label_a.as_str(), args.label_b.as_str())?;
    let delimiter = parse_delimiter(&args.delimiter)?;

    let content = read_file(&args.input, max_file_size())?;
    let report = ParsedReport::from_reader(content.as_slice(), delimiter)?;
    info!(
        input = %args.input.display(),
        rows = report.rows.len(),
        metrics = report.metrics.len(),
        "read report"
    );

    let config = ChartConfig {
        title: args.title.clone(),
        labels,
        series_names: [args.name_a.clone(), args.name_b.clone()],
    };
    export_html(&report, &config, &args.output)?;
    info!(output = %args.output.display(), "wrote charts");

    if !args.quiet {
        println!(
            "{} {} ({} operations)",
            "Charts written to".green().bold(),
            args.output.display().to_string().bright_white(),
            report.rows.len()
        );
    }
    Ok(())
}
