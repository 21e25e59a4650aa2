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

//! Inspect command - show how one operation's averages are built

use super::{extract_sources, GroupSource};
use crate::batch::BatchProcessor;
use crate::error::CliError;
use colored::Colorize;
use perfmerge_core::{
    breakdown, format_value, GroupLabels, MetricRecord, OperationBreakdown, RecordExtractor,
    SourceGroup,
};
use std::path::PathBuf;
use tracing::warn;

/// Options of the `inspect` command.
#[derive(Debug, Clone)]
pub struct InspectArgs {
    pub group_a: PathBuf,
    pub group_b: PathBuf,
    pub label_a: String,
    pub label_b: String,
    pub suffix: String,
    /// Canonical operation name, e.g. `Insert row`.
    pub operation: String,
    /// Maximum number of files read per group.
    pub limit: Option<usize>,
}

/// Prints every contributing value of one canonical operation per group.
///
/// Debug aid for checking an average in the report against the raw runs.
///
/// # Errors
///
/// Returns an error for invalid labels. Unreadable documents are skipped
/// with a warning.
pub fn inspect(args: &InspectArgs) -> Result<Vec<OperationBreakdown>, CliError> {
    let labels = GroupLabels::new(args.label_a.as_str(), args.label_b.as_str())?;
    let extractor = RecordExtractor::new();
    let sources = [
        GroupSource::new(SourceGroup::A, &args.group_a),
        GroupSource::new(SourceGroup::B, &args.group_b),
    ];

    let extractions = extract_sources(
        &sources,
        &args.suffix,
        args.limit,
        &BatchProcessor::default_config(),
        &extractor,
        false,
    )?;

    let mut records: Vec<MetricRecord> = Vec::new();
    for extraction in extractions {
        match extraction.result {
            Ok(r) => records.extend(r),
            Err(error) => warn!(
                file = %extraction.provenance,
                group = %extraction.source_group,
                error = %error,
                "skipping unreadable document"
            ),
        }
    }

    let breakdowns = breakdown(&records, &args.operation);

    println!(
        "{} {}",
        "Operation:".bold().underline(),
        args.operation.green().bold()
    );
    if breakdowns.is_empty() {
        println!();
        println!("  {}", "no records for this operation".dimmed());
    }
    for entry in &breakdowns {
        print_breakdown(entry, &labels);
    }

    Ok(breakdowns)
}

fn print_breakdown(entry: &OperationBreakdown, labels: &GroupLabels) {
    println!();
    println!(
        "{} {} ({} runs)",
        "Group".cyan(),
        labels.label(entry.source_group).yellow(),
        entry.run_count
    );

    for metric in &entry.metrics {
        let mean = metric
            .mean
            .map_or_else(|| "~".dimmed().to_string(), |m| format_value(m).cyan().to_string());
        println!(
            "  {:<26} mean {} over {} values",
            metric.metric.column_header(),
            mean,
            metric.values.len()
        );
        if !metric.values.is_empty() {
            println!("    [{}]", join_values(&metric.values));
        }
    }

    if !entry.iterations.is_empty() {
        let total: f64 = entry.iterations.iter().sum();
        println!("  {:<26} total {}", "Iterations", format_value(total).cyan());
    }

    let mut files = entry.provenance.clone();
    files.dedup();
    println!("  {} {}", "Files:".dimmed(), files.join(", ").dimmed());
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_value(*v))
        .collect::<Vec<_>>()
        .join(", ")
}
