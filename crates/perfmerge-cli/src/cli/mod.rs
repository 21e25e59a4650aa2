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

//! CLI command definitions and argument parsing.

use crate::commands::{self, ChartArgs, InspectArgs, ReportArgs};
use crate::discovery::DEFAULT_SUFFIX;
use crate::error::CliError;
use clap::Subcommand;
use std::path::PathBuf;

/// Top-level CLI commands.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use perfmerge_cli::cli::Commands;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
/// ```
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge result documents of both groups into a CSV report
    ///
    /// Scans both directories for result documents, averages every metric
    /// per canonical operation and writes one row per operation. Documents
    /// that cannot be read are skipped with a warning.
    Report {
        /// Directory with the first group's result documents
        #[arg(long, value_name = "DIR", default_value = "shared_matrix_memory")]
        group_a: PathBuf,

        /// Directory with the second group's result documents
        #[arg(long, value_name = "DIR", default_value = "shared_tree_memory")]
        group_b: PathBuf,

        /// Cell label of the first group
        #[arg(long, default_value = "SM")]
        label_a: String,

        /// Cell label of the second group
        #[arg(long, default_value = "ST")]
        label_b: String,

        /// File-name suffix of result documents
        #[arg(long, default_value = DEFAULT_SUFFIX)]
        suffix: String,

        /// Field delimiter (a single character, or \t)
        #[arg(long, default_value = ",")]
        delimiter: String,

        /// Output CSV path
        #[arg(short, long, default_value = "generated_memory.csv")]
        output: PathBuf,

        /// Number of worker threads (default: all cores)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Minimum number of files per group before extracting in parallel
        #[arg(long, default_value = "10")]
        parallel_threshold: usize,
    },

    /// Render a report as HTML bar charts
    Chart {
        /// Report written by the report command
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Output HTML path
        #[arg(short, long, default_value = "memory_charts.html")]
        output: PathBuf,

        /// Field delimiter of the report
        #[arg(long, default_value = ",")]
        delimiter: String,

        /// Cell label of the first group
        #[arg(long, default_value = "SM")]
        label_a: String,

        /// Cell label of the second group
        #[arg(long, default_value = "ST")]
        label_b: String,

        /// Legend name of the first group
        #[arg(long, default_value = "SharedMatrix")]
        name_a: String,

        /// Legend name of the second group
        #[arg(long, default_value = "SharedTree")]
        name_b: String,

        /// Page title
        #[arg(long, default_value = "SharedMatrix vs SharedTree")]
        title: String,
    },

    /// Show the individual values behind one operation's averages
    Inspect {
        /// Directory with the first group's result documents
        #[arg(long, value_name = "DIR", default_value = "shared_matrix_memory")]
        group_a: PathBuf,

        /// Directory with the second group's result documents
        #[arg(long, value_name = "DIR", default_value = "shared_tree_memory")]
        group_b: PathBuf,

        /// Cell label of the first group
        #[arg(long, default_value = "SM")]
        label_a: String,

        /// Cell label of the second group
        #[arg(long, default_value = "ST")]
        label_b: String,

        /// File-name suffix of result documents
        #[arg(long, default_value = DEFAULT_SUFFIX)]
        suffix: String,

        /// Canonical operation name
        #[arg(long, default_value = "Insert row")]
        operation: String,

        /// Maximum number of files read per group
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

impl Commands {
    /// Execute the command.
    ///
    /// `verbose` enables per-file progress; `quiet` suppresses the console
    /// summary.
    ///
    /// # Errors
    ///
    /// Returns the command's error; see the individual commands.
    pub fn execute(self, verbose: bool, quiet: bool) -> Result<(), CliError> {
        match self {
            Commands::Report {
                group_a,
                group_b,
                label_a,
                label_b,
                suffix,
                delimiter,
                output,
                jobs,
                parallel_threshold,
            } => {
                if jobs == Some(0) {
                    return Err(CliError::invalid_input("--jobs must be at least 1"));
                }
                commands::report(&ReportArgs {
                    group_a,
                    group_b,
                    label_a,
                    label_b,
                    suffix,
                    delimiter,
                    output,
                    jobs,
                    parallel_threshold,
                    verbose,
                    quiet,
                })
                .map(|_| ())
            }
            Commands::Chart {
                input,
                output,
                delimiter,
                label_a,
                label_b,
                name_a,
                name_b,
                title,
            } => commands::chart(&ChartArgs {
                input,
                output,
                delimiter,
                label_a,
                label_b,
                name_a,
                name_b,
                title,
                quiet,
            }),
            Commands::Inspect {
                group_a,
                group_b,
                label_a,
                label_b,
                suffix,
                operation,
                limit,
            } => commands::inspect(&InspectArgs {
                group_a,
                group_b,
                label_a,
                label_b,
                suffix,
                operation,
                limit,
            })
            .map(|_| ()),
        }
    }
}
