use crate::error::{QhError, Result};
use crate::model::{Candidate, Direction};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unique keys and summed observations of one ranked list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub unique: usize,
    pub total: u64,
}

impl BucketSummary {
    /// Fails rather than clamp when the summed count leaves `u64`.
    pub fn of(section: &str, rows: &[Candidate]) -> Result<Self> {
        let total = rows
            .iter()
            .filter_map(|c| c.count)
            .try_fold(0u64, u64::checked_add)
            .ok_or_else(|| QhError::input(section, "summed count overflows u64"))?;
        Ok(Self {
            unique: rows.len(),
            total,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub request_complete: BucketSummary,
    pub request_names: BucketSummary,
    pub response_complete: BucketSummary,
    pub response_names: BucketSummary,
}

/// The four ranked lists handed to human curation and read back by the table builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationSheet {
    pub request_complete: Vec<Candidate>,
    pub request_names: Vec<Candidate>,
    pub response_complete: Vec<Candidate>,
    pub response_names: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<AggregateSummary>,
}

/// Sections are parsed row by row so a bad row can be reported by position.
#[derive(Deserialize)]
struct RawSheet {
    request_complete: Vec<serde_json::Value>,
    request_names: Vec<serde_json::Value>,
    response_complete: Vec<serde_json::Value>,
    response_names: Vec<serde_json::Value>,
    #[serde(default)]
    summary: Option<AggregateSummary>,
}

impl CurationSheet {
    pub fn complete(&self, direction: Direction) -> &[Candidate] {
        match direction {
            Direction::Request => &self.request_complete,
            Direction::Response => &self.response_complete,
        }
    }

    pub fn names(&self, direction: Direction) -> &[Candidate] {
        match direction {
            Direction::Request => &self.request_names,
            Direction::Response => &self.response_names,
        }
    }

    pub fn summarize(&self) -> Result<AggregateSummary> {
        Ok(AggregateSummary {
            request_complete: BucketSummary::of("request_complete", &self.request_complete)?,
            request_names: BucketSummary::of("request_names", &self.request_names)?,
            response_complete: BucketSummary::of("response_complete", &self.response_complete)?,
            response_names: BucketSummary::of("response_names", &self.response_names)?,
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| QhError::input(path, e))?;
        Self::parse(&path.display().to_string(), &raw)
    }

    /// `origin` names the document in error messages.
    pub fn parse(origin: &str, raw: &str) -> Result<Self> {
        let sheet: RawSheet = serde_json::from_str(raw).map_err(|e| QhError::input(origin, e))?;
        Ok(Self {
            request_complete: rows(origin, "request_complete", sheet.request_complete)?,
            request_names: rows(origin, "request_names", sheet.request_names)?,
            response_complete: rows(origin, "response_complete", sheet.response_complete)?,
            response_names: rows(origin, "response_names", sheet.response_names)?,
            summary: sheet.summary,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| QhError::InvariantViolation(format!("curation sheet serialization: {e}")))
    }
}

fn rows(origin: &str, section: &str, raw: Vec<serde_json::Value>) -> Result<Vec<Candidate>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row)
                .map_err(|e| QhError::malformed(format!("{origin} [{section}]"), index, e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    const SHEET: &str = r#"{
        "request_complete": [
            {"Header Name": "accept-encoding", "Header Value": "gzip", "Count": 5, "Status": "keep"},
            {"Header Name": "accept", "Header Value": "*/*", "Count": 2, "Status": "drop"}
        ],
        "request_names": [{"Header Name": "cookie", "Count": 8}],
        "response_complete": [],
        "response_names": [{"Header Name": "date"}]
    }"#;

    #[test]
    fn parses_sections_and_optional_columns() {
        let sheet = CurationSheet::parse("sheet", SHEET).unwrap();
        assert_eq!(sheet.complete(Direction::Request).len(), 2);
        assert_eq!(sheet.request_complete[1].status, Some(Status::Drop("drop".into())));
        assert_eq!(sheet.names(Direction::Request)[0].status, None);
        assert_eq!(sheet.names(Direction::Response)[0].count, None);
        assert!(sheet.summary.is_none());

        let summary = sheet.summarize().unwrap();
        assert_eq!(summary.request_complete, BucketSummary { unique: 2, total: 7 });
        assert_eq!(summary.response_names, BucketSummary { unique: 1, total: 0 });
    }

    #[test]
    fn row_without_name_is_reported_by_position() {
        let raw = r#"{
            "request_complete": [],
            "request_names": [{"Header Name": "a"}, {"Count": 3}],
            "response_complete": [],
            "response_names": []
        }"#;
        match CurationSheet::parse("sheet", raw).unwrap_err() {
            QhError::MalformedRecord { origin, index, .. } => {
                assert_eq!(origin, "sheet [request_names]");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn summary_total_overflow_is_an_error() {
        let rows = vec![
            Candidate::name_only("a", u64::MAX),
            Candidate::name_only("b", 1),
        ];
        let err = BucketSummary::of("request_names", &rows).unwrap_err();
        assert!(matches!(err, QhError::Input { ref path, .. } if path == "request_names"));
        assert_eq!(BucketSummary::of("request_names", &rows[..1]).unwrap().total, u64::MAX);
    }

    #[test]
    fn missing_section_is_input_error() {
        let err = CurationSheet::parse("sheet", r#"{"request_complete": []}"#).unwrap_err();
        assert!(matches!(err, QhError::Input { .. }));
    }
}
