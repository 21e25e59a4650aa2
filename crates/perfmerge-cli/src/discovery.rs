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

//! Discovery of result documents on disk.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default file-name suffix of a result document.
pub const DEFAULT_SUFFIX: &str = "_perfresult.json";

/// Recursively collects every file under `dir` whose name ends with `suffix`.
///
/// Paths are returned sorted so runs are reproducible. A missing directory
/// is logged and yields no files; unreadable entries are skipped.
pub fn discover(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "result directory not found, no files for this group");
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(suffix))
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    debug!(dir = %dir.display(), files = files.len(), "discovered result documents");
    files
}
