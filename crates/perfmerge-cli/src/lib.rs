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

//! perfmerge CLI library.
//!
//! Discovers benchmark result documents of two source groups on disk,
//! extracts them in parallel and hands them to [`perfmerge_core`] for
//! aggregation.
//!
//! # Commands
//!
//! - **report**: merge both groups into a CSV table (one row per operation)
//! - **chart**: render a written report as HTML bar charts
//! - **inspect**: print the individual values behind one operation
//!
//! # Limits
//!
//! Single documents larger than 100 MB are rejected before being read. The
//! limit is configurable via `PERFMERGE_MAX_FILE_SIZE` (bytes).

pub mod batch;
pub mod cli;
pub mod commands;
pub mod discovery;
pub mod error;
