//! Outcome of the API key permission checks

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Longest response excerpt kept per probe
pub const MESSAGE_LIMIT: usize = 500;

/// Status column of a probe: the HTTP status, or `"Error"` when no
/// response came back at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProbeStatus {
    Code(u16),
    Failed(TransportFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransportFailure {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticResult {
    pub status: ProbeStatus,
    pub success: bool,
    pub message: String,
}

impl DiagnosticResult {
    #[must_use]
    pub fn response(status: u16, success: bool, body: &str) -> Self {
        Self {
            status: ProbeStatus::Code(status),
            success,
            message: truncate_message(body),
        }
    }

    #[must_use]
    pub fn failed(message: &str) -> Self {
        Self {
            status: ProbeStatus::Failed(TransportFailure::Error),
            success: false,
            message: truncate_message(message),
        }
    }
}

/// Probe results in the order the probes ran, serialized as a JSON object
/// keyed by probe name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticReport {
    entries: Vec<(String, DiagnosticResult)>,
}

impl DiagnosticReport {
    pub fn record<S: Into<String>>(&mut self, name: S, result: DiagnosticResult) {
        self.entries.push((name.into(), result));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(|(_, result)| result.success)
    }
}

impl Serialize for DiagnosticReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

fn truncate_message(text: &str) -> String {
    text.chars().take(MESSAGE_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_is_truncated_on_char_boundary() {
        let body = "é".repeat(MESSAGE_LIMIT + 20);
        let result = DiagnosticResult::response(200, true, &body);
        assert_eq!(result.message.chars().count(), MESSAGE_LIMIT);
    }

    #[test]
    fn test_failed_probe_reports_error_status() {
        let result = DiagnosticResult::failed("connection refused");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({ "status": "Error", "success": false, "message": "connection refused" })
        );
    }

    #[test]
    fn test_report_serializes_as_object_in_probe_order() {
        let mut report = DiagnosticReport::default();
        report.record("Geocoding API", DiagnosticResult::response(200, true, "{}"));
        report.record("Routes API", DiagnosticResult::response(403, false, "denied"));

        let serialized = serde_json::to_string(&report).unwrap();
        let geocoding = serialized.find("Geocoding API").unwrap();
        let routes = serialized.find("Routes API").unwrap();
        assert!(geocoding < routes);

        let value: serde_json::Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(value["Routes API"]["status"], 403);
        assert_eq!(value["Routes API"]["success"], false);
        assert!(!report.all_succeeded());
    }
}
