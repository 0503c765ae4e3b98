//! Counter parsing: one bulletin's text → per-label integer counts.
//!
//! The announcement wording is a fixed construction, `<phrase><N>例`
//! ("N cases of <phrase>"). For each rule the alternative phrases are tried
//! in declaration order; the first phrase with a usable occurrence supplies
//! the value and no further alternatives are consulted. A label with no
//! usable occurrence anywhere is 0, since bulletins routinely omit
//! categories with nothing to report.
//!
//! An occurrence immediately preceded by the negation marker `无` does not
//! count: `无新增本土死亡病例…` announces the *absence* of the category and
//! must not be read as a count.
//!
//! Two more counters come from fixed sentence templates rather than label
//! rules:
//!
//! - `其中<N>例确诊病例为此前无症状感染者转归`: confirmed cases that are
//!   reclassified former asymptomatic cases
//! - `<N>例确诊病例和<M>例无症状感染者在隔离管控中发现`: cases found
//!   while already under quarantine
//!
//! Both default to 0 when the template is absent.

use regex::Regex;

use crate::domain::RuleSet;
use crate::error::AppError;

const NEGATION_MARKER: char = '无';

const RECLASSIFIED_TEMPLATE: &str = r"其中(\d+)例确诊病例为此前无症状感染者转归";
const QUARANTINE_TEMPLATE: &str = r"(\d+)例确诊病例和(\d+)例无症状感染者在隔离管控中发现";

/// A [`RuleSet`] with its phrase patterns compiled once per run.
pub struct CompiledRules {
    matchers: Vec<Vec<Regex>>,
    reclassified: Regex,
    quarantine: Regex,
    schema: Vec<String>,
}

impl CompiledRules {
    pub fn compile(rules: &RuleSet) -> Result<Self, AppError> {
        let mut matchers = Vec::with_capacity(rules.rules.len());
        for rule in &rules.rules {
            if rule.phrases.is_empty() {
                return Err(AppError::config(format!(
                    "Counter '{}' declares no phrases.",
                    rule.label
                )));
            }
            let mut alternatives = Vec::with_capacity(rule.phrases.len());
            for phrase in &rule.phrases {
                let pattern = format!(r"{}(\d+)例", regex::escape(phrase));
                let re = Regex::new(&pattern).map_err(|e| {
                    AppError::config(format!("Counter '{}' phrase '{phrase}': {e}", rule.label))
                })?;
                alternatives.push(re);
            }
            matchers.push(alternatives);
        }

        Ok(Self {
            matchers,
            reclassified: Regex::new(RECLASSIFIED_TEMPLATE).expect("valid reclassified template"),
            quarantine: Regex::new(QUARANTINE_TEMPLATE).expect("valid quarantine template"),
            schema: rules.schema(),
        })
    }

    /// Column labels in output order (rule labels, then template columns).
    pub fn schema(&self) -> &[String] {
        &self.schema
    }
}

/// Extract all counter values from one bulletin's text, in schema order.
pub fn parse_counters(text: &str, rules: &CompiledRules) -> Vec<i64> {
    let mut values = Vec::with_capacity(rules.schema.len());

    for alternatives in &rules.matchers {
        let mut value = 0;
        'alts: for re in alternatives {
            for caps in re.captures_iter(text) {
                let m = caps.get(0).expect("whole match");
                if negated(text, m.start()) {
                    continue;
                }
                // Digit runs in bulletins are ASCII; anything else is not a
                // count we can use.
                let Ok(n) = caps[1].parse::<i64>() else {
                    continue;
                };
                value = n;
                break 'alts;
            }
        }
        values.push(value);
    }

    values.push(
        rules
            .reclassified
            .captures(text)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or(0),
    );

    let (qc, qa) = rules
        .quarantine
        .captures(text)
        .and_then(|c| Some((c[1].parse().ok()?, c[2].parse().ok()?)))
        .unwrap_or((0, 0));
    values.push(qc);
    values.push(qa);

    values
}

fn negated(text: &str, match_start: usize) -> bool {
    text[..match_start].chars().next_back() == Some(NEGATION_MARKER)
}
