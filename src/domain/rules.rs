//! Counter rule sets: the versioned configuration that maps bulletin
//! phrasing to column labels.
//!
//! Bulletin wording has changed across eras (labels appear, phrases get
//! reworded), so the label → phrase mapping is data, not code: the parser
//! takes a [`RuleSet`] as a parameter and a new era means a new rule file,
//! not a new branch. `--rules <file.json>` loads an external set;
//! [`RuleSet::bulletin_2022`] is the built-in era this tool started with.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Column labels as they appear in the persisted store.
pub mod columns {
    pub const DATE: &str = "日期";

    pub const LOCAL_CONFIRMED: &str = "新增本土确诊";
    pub const LOCAL_ASYMPTOMATIC: &str = "新增本土无症状";
    pub const IMPORTED_CONFIRMED: &str = "新增输入确诊";
    pub const IMPORTED_ASYMPTOMATIC: &str = "新增输入无症状";
    pub const RECOVERED: &str = "治愈出院";
    pub const RELEASED: &str = "解除观察";
    pub const IN_HOSPITAL: &str = "在院治疗";
    pub const DEATHS: &str = "新增死亡";

    pub const RECLASSIFIED: &str = "转归病例";
    pub const QUARANTINE_CONFIRMED: &str = "管控确诊";
    pub const QUARANTINE_ASYMPTOMATIC: &str = "管控无症状";
}

/// Columns filled from the fixed sentence templates rather than label
/// rules, in output order. See [`crate::extract::counters`].
pub const TEMPLATE_COLUMNS: [&str; 3] = [
    columns::RECLASSIFIED,
    columns::QUARANTINE_CONFIRMED,
    columns::QUARANTINE_ASYMPTOMATIC,
];

/// One labeled counter: alternative announcement phrases tried in order,
/// first phrase with a usable match wins, none → 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterRule {
    pub label: String,
    pub phrases: Vec<String>,
}

impl CounterRule {
    fn new(label: &str, phrases: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            phrases: phrases.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// An ordered set of counter rules. Rule order defines the column order of
/// everything downstream (store, tables, exports).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<CounterRule>,
}

impl RuleSet {
    /// The phrasing in use on wsjkw.sh.gov.cn daily bulletins since
    /// 2022-02-26.
    pub fn bulletin_2022() -> Self {
        Self {
            rules: vec![
                CounterRule::new(columns::LOCAL_CONFIRMED, &["新增本土新冠肺炎确诊病例"]),
                CounterRule::new(columns::LOCAL_ASYMPTOMATIC, &["新增本土无症状感染者"]),
                CounterRule::new(
                    columns::IMPORTED_CONFIRMED,
                    &["新增境外输入性新冠肺炎确诊病例"],
                ),
                CounterRule::new(
                    columns::IMPORTED_ASYMPTOMATIC,
                    &["新增境外输入性无症状感染者"],
                ),
                CounterRule::new(columns::RECOVERED, &["治愈出院"]),
                CounterRule::new(
                    columns::RELEASED,
                    &["解除医学观察无症状感染者", "解除医学观察本土无症状感染者"],
                ),
                CounterRule::new(columns::IN_HOSPITAL, &["在院治疗"]),
                CounterRule::new(columns::DEATHS, &["新增本土死亡病例", "新增本土死亡"]),
            ],
        }
    }

    /// Load a rule set from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::config(format!("Failed to open rules file '{}': {e}", path.display()))
        })?;
        let rules: RuleSet = serde_json::from_reader(file)
            .map_err(|e| AppError::config(format!("Invalid rules file '{}': {e}", path.display())))?;
        if rules.rules.is_empty() {
            return Err(AppError::config(format!(
                "Rules file '{}' declares no counters.",
                path.display()
            )));
        }
        Ok(rules)
    }

    /// Full column schema: rule labels in declaration order, then the
    /// template columns.
    pub fn schema(&self) -> Vec<String> {
        let mut out: Vec<String> = self.rules.iter().map(|r| r.label.clone()).collect();
        out.extend(TEMPLATE_COLUMNS.iter().map(|s| s.to_string()));
        out
    }
}
