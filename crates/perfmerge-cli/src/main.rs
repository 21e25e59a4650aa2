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

//! perfmerge command line interface

use clap::Parser;
use perfmerge_cli::cli::Commands;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// perfmerge - benchmark result aggregation
///
/// Merges per-run benchmark result documents of two implementations into
/// one comparison table.
///
/// # Examples
///
/// ```bash
/// # Merge the default directories into generated_memory.csv
/// perfmerge report
///
/// # Render the report as charts
/// perfmerge chart generated_memory.csv -o memory_charts.html
///
/// # Look at the raw values behind one row
/// perfmerge inspect --operation "Insert row" --limit 5
/// ```
#[derive(Parser)]
#[command(name = "perfmerge")]
#[command(author, version, about = "perfmerge - benchmark result aggregation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show per-file progress and debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_directive = if cli.quiet {
        "perfmerge=warn"
    } else if cli.verbose {
        "perfmerge=debug"
    } else {
        "perfmerge=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command.execute(cli.verbose, cli.quiet) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_no_data() {
                eprintln!(
                    "Hint: check --group-a/--group-b and that file names end with --suffix"
                );
            }
            ExitCode::FAILURE
        }
    }
}
