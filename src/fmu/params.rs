use std::collections::HashMap;

/// One parameter's schedule: a value per context (checked in declared
/// order) plus a default. `spec.md` §4.2: "on each step the adapter
/// writes the value for the first listed context whose place currently
/// holds a token, else the default."
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ScheduleEntry {
    #[serde(default)]
    pub by_context: Vec<(String, f64)>,
    pub default: f64,
}

impl ScheduleEntry {
    /// Resolve the value to write, given a predicate for "does this context
    /// currently hold a token".
    pub fn resolve(&self, context_has_token: impl Fn(&str) -> bool) -> f64 {
        self.by_context
            .iter()
            .find(|(context, _)| context_has_token(context))
            .map(|(_, value)| *value)
            .unwrap_or(self.default)
    }
}

/// A mode's full parameter schedule, keyed by FMU variable name.
pub type ParamSchedule = HashMap<String, ScheduleEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_active_context_in_declared_order() {
        let entry = ScheduleEntry {
            by_context: vec![
                ("highPerformanceMode".into(), 8.0),
                ("energySavingMode".into(), 2.0),
            ],
            default: 4.0,
        };
        assert_eq!(
            entry.resolve(|c| c == "highPerformanceMode" || c == "energySavingMode"),
            8.0,
            "first-listed context wins when both are active"
        );
        assert_eq!(entry.resolve(|c| c == "energySavingMode"), 2.0);
        assert_eq!(entry.resolve(|_| false), 4.0);
    }
}
