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

//! Benchmark label classification.
//!
//! Raw benchmark names are free text ("SharedMatrix Undo insert a row in the
//! middle 10 times", "Redo: insert column", ...). The classifier maps them to
//! a small set of canonical operation names using an ordered rule list.
//!
//! Rule order matters: `Undo insert row` contains the text of `Insert row`,
//! so every undo/redo rule is listed before the bare action rules and the
//! first matching rule wins.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Default rules, most specific first.
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    (r"undo.*insert.*row", "Undo insert row"),
    (r"redo.*insert.*row", "Redo insert row"),
    (r"undo.*remove.*row", "Undo remove row"),
    (r"redo.*remove.*row", "Redo remove row"),
    (r"undo.*insert.*column", "Undo insert column"),
    (r"redo.*insert.*column", "Redo insert column"),
    (r"undo.*remove.*column", "Undo remove column"),
    (r"redo.*remove.*column", "Redo remove column"),
    (r"undo.*set.*cell", "Undo set cell value"),
    (r"redo.*set.*cell", "Redo set cell value"),
    (r"insert.*row", "Insert row"),
    (r"remove.*row", "Remove row"),
    (r"insert.*column", "Insert column"),
    (r"remove.*column", "Remove column"),
    (r"set.*cell", "Set cell value"),
];

static DEFAULT_CLASSIFIER: Lazy<OperationClassifier> = Lazy::new(OperationClassifier::new);

static SUITE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+\s+").expect("suite prefix pattern is valid"));
static REPEAT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+\d+\s+times?$").expect("repeat suffix pattern is valid"));
static MIDDLE_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+in the middle").expect("qualifier pattern is valid"));

/// A single (pattern, canonical name) rule.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pattern: Regex,
    canonical: String,
}

impl ClassificationRule {
    /// Compiles a case-insensitive rule.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn new(pattern: &str, canonical: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern,
            canonical: canonical.into(),
        })
    }

    /// Tests the rule against a full label.
    pub fn matches(&self, label: &str) -> bool {
        self.pattern.is_match(label)
    }

    /// Canonical operation name produced by this rule.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Source text of the pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Ordered rule list with a text-cleaning fallback.
#[derive(Debug, Clone)]
pub struct OperationClassifier {
    rules: Vec<ClassificationRule>,
}

impl OperationClassifier {
    /// Creates a classifier with [`DEFAULT_RULES`].
    pub fn new() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(pattern, canonical)| {
                ClassificationRule::new(pattern, *canonical).expect("default rules are valid")
            })
            .collect();
        Self { rules }
    }

    /// Creates a classifier from a custom ordered rule list.
    pub fn with_rules(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// Appends a rule with the lowest priority.
    pub fn push_rule(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Maps a benchmark label to its canonical operation name.
    ///
    /// Never fails: labels no rule recognizes go through [`fallback_label`].
    ///
    /// # Examples
    ///
    /// ```
    /// use perfmerge_core::OperationClassifier;
    ///
    /// let classifier = OperationClassifier::new();
    /// assert_eq!(classifier.classify("Undo insert a row 10 times"), "Undo insert row");
    /// assert_eq!(classifier.classify("Insert a row 10 times"), "Insert row");
    /// assert_eq!(classifier.classify("SharedTree Load document 5 times"), "Load document");
    /// ```
    pub fn classify(&self, label: &str) -> String {
        self.rules
            .iter()
            .find(|rule| rule.matches(label))
            .map(|rule| rule.canonical.clone())
            .unwrap_or_else(|| fallback_label(label))
    }
}

impl Default for OperationClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies a label with the default rule set.
pub fn classify(label: &str) -> String {
    DEFAULT_CLASSIFIER.classify(label)
}

/// Derives a name for a label no rule recognized.
///
/// Drops the leading suite word, a trailing `N time(s)` repeat count and any
/// `in the middle` qualifier. Falls back to the unmodified label when nothing
/// is left.
pub fn fallback_label(label: &str) -> String {
    let cleaned = SUITE_PREFIX.replace(label, "");
    let cleaned = REPEAT_SUFFIX.replace(&cleaned, "");
    let cleaned = MIDDLE_QUALIFIER.replace_all(&cleaned, "");

    if cleaned.trim().is_empty() {
        label.to_string()
    } else {
        cleaned.into_owned()
    }
}
