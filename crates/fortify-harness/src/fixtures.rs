//! Fixture loading and management.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// Expected outcome string for a call that runs.
pub const PROCEED: &str = "proceed";

/// A single checked-call scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Intercepted symbol, e.g. `strcpy` or `FD_ISSET`.
    pub function: String,
    /// What the scenario exercises.
    #[serde(default)]
    pub scenario: String,
    /// Call arguments and declared capacities.
    pub inputs: serde_json::Value,
    /// `proceed`, or `abort:<violation kind>`.
    #[serde(deserialize_with = "deserialize_expected_output")]
    pub expected_output: String,
}

/// A collection of fixture cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Fixture family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Individual cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let set = Self::from_json(&content)?;
        Ok(set)
    }

    /// Distinct symbols the set covers, in first-seen order.
    #[must_use]
    pub fn functions(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for case in &self.cases {
            if !seen.contains(&case.function.as_str()) {
                seen.push(case.function.as_str());
            }
        }
        seen
    }
}

fn deserialize_expected_output<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(normalize_expected_output_value(&value))
}

pub(crate) fn normalize_expected_output_value(value: &serde_json::Value) -> String {
    if let Some(text) = value.as_str() {
        return text.trim().to_ascii_lowercase();
    }
    serde_json::to_string(value).unwrap_or_else(|_| String::from("null"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_output_is_normalized() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"fortify/string",
                "captured_at":"2026-10-01T00:00:00Z",
                "cases":[
                    {
                        "name":"mixed_case",
                        "function":"strcpy",
                        "inputs":{"dst_capacity":10,"src":"abc"},
                        "expected_output":" Proceed "
                    }
                ]
            }"#,
        )
        .expect("fixture should deserialize");

        assert_eq!(fixture.cases[0].expected_output, PROCEED);
        assert!(fixture.cases[0].scenario.is_empty());
    }

    #[test]
    fn non_string_expected_output_is_kept_as_json() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"fortify/string",
                "captured_at":"2026-10-01T00:00:00Z",
                "cases":[
                    {
                        "name":"typed",
                        "function":"strlen",
                        "inputs":{},
                        "expected_output":{"abort":true}
                    }
                ]
            }"#,
        )
        .expect("fixture should deserialize");

        assert_eq!(fixture.cases[0].expected_output, r#"{"abort":true}"#);
    }

    #[test]
    fn functions_are_deduplicated_in_order() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"fortify/mixed",
                "captured_at":"2026-10-01T00:00:00Z",
                "cases":[
                    {"name":"a","function":"read","inputs":{},"expected_output":"proceed"},
                    {"name":"b","function":"poll","inputs":{},"expected_output":"proceed"},
                    {"name":"c","function":"read","inputs":{},"expected_output":"proceed"}
                ]
            }"#,
        )
        .expect("fixture should deserialize");

        assert_eq!(fixture.functions(), vec!["read", "poll"]);
    }
}
