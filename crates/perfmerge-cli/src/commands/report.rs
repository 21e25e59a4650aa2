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

//! Report command - merge both source groups into one CSV table

use super::{extract_sources, parse_delimiter, GroupSource};
use crate::batch::{BatchConfig, BatchProcessor};
use crate::error::CliError;
use colored::Colorize;
use perfmerge_core::{GroupLabels, Pipeline, PipelineReport, ReportConfig, SourceGroup};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Options of the `report` command.
#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub group_a: PathBuf,
    pub group_b: PathBuf,
    pub label_a: String,
    pub label_b: String,
    /// File-name suffix of result documents.
    pub suffix: String,
    pub delimiter: String,
    pub output: PathBuf,
    /// Worker threads; `None` uses every core.
    pub jobs: Option<usize>,
    pub parallel_threshold: usize,
    pub verbose: bool,
    pub quiet: bool,
}

/// Aggregates every result document and writes the merged CSV report.
///
/// Unreadable documents are skipped with a warning. Nothing is written when
/// neither group yields any operation.
///
/// # Errors
///
/// Returns an error for invalid labels or delimiter, when no data was found
/// ([`perfmerge_core::PerfError::NoData`]), or when the report cannot be
/// written.
///
/// # Examples
///
/// ```no_run
/// use perfmerge_cli::commands::{report, ReportArgs};
///
/// # fn main() -> Result<(), perfmerge_cli::error::CliError> {
/// report(&ReportArgs {
///     group_a: "shared_matrix_memory".into(),
///     group_b: "shared_tree_memory".into(),
///     label_a: "SM".into(),
///     label_b: "ST".into(),
///     suffix: "_perfresult.json".into(),
///     delimiter: ",".into(),
///     output: "generated_memory.csv".into(),
///     jobs: None,
///     parallel_threshold: 10,
///     verbose: false,
///     quiet: false,
/// })?;
/// # Ok(())
/// # }
/// ```
pub fn report(args: &ReportArgs) -> Result<PipelineReport, CliError> {
    let labels = GroupLabels::new(args.label_a.as_str(), args.label_b.as_str())?;
    let delimiter = parse_delimiter(&args.delimiter)?;

    let processor = BatchProcessor::new(BatchConfig {
        parallel_threshold: args.parallel_threshold,
        max_threads: args.jobs,
        progress_interval: if args.verbose { 1 } else { 0 },
        verbose: args.verbose,
    });
    let pipeline = Pipeline::new(labels);
    let sources = [
        GroupSource::new(SourceGroup::A, &args.group_a),
        GroupSource::new(SourceGroup::B, &args.group_b),
    ];

    let extractions = extract_sources(
        &sources,
        &args.suffix,
        None,
        &processor,
        pipeline.extractor(),
        args.verbose,
    )?;
    let result = pipeline.reduce(extractions)?;

    let file = File::create(&args.output).map_err(|e| CliError::io_error(&args.output, e))?;
    let mut writer = BufWriter::new(file);
    let config = ReportConfig {
        delimiter,
        ..Default::default()
    };
    result.table.write_csv(&mut writer, &config)?;
    writer
        .flush()
        .map_err(|e| CliError::io_error(&args.output, e))?;
    info!(output = %args.output.display(), operations = result.table.len(), "wrote report");

    if !args.quiet {
        print_summary(&result, args);
    }
    Ok(result)
}

fn print_summary(result: &PipelineReport, args: &ReportArgs) {
    let labels = result.table.labels();

    println!("{}", "Benchmark Report".bold().underline());
    println!();
    println!("{}", "Operations:".cyan());
    for row in result.table.rows() {
        let counts: Vec<String> = SourceGroup::ALL
            .into_iter()
            .filter(|g| row.summary(*g).is_some())
            .map(|g| format!("{}({})", labels.label(g), row.run_count(g)))
            .collect();
        println!("  {} {}", row.canonical_operation.green(), counts.join(" ").dimmed());
    }

    println!();
    println!("{}", "Files:".cyan());
    for group in SourceGroup::ALL {
        let stats = result.stats(group);
        let failed = if stats.failed > 0 {
            stats.failed.to_string().red().bold().to_string()
        } else {
            stats.failed.to_string()
        };
        println!(
            "  {:<4} {} processed, {} failed, {} records",
            labels.label(group).yellow(),
            stats.documents,
            failed,
            stats.records
        );
    }

    println!();
    println!(
        "{} {}",
        "Report written to".green().bold(),
        args.output.display().to_string().bright_white()
    );
}
