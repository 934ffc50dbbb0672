use qh_core::{Direction, Observation, ObservedValue, QhError, Result};
use serde::Deserialize;
use std::path::Path;

/// A capture record as exported by the browser plugin. All fields are optional
/// here so a missing one can be reported against its record index.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    value: Option<String>,
    count: Option<u64>,
}

/// Parses one capture document: a JSON array of `{type, name, value, count}`.
pub fn parse_capture(origin: &str, raw: &str, marker: &str) -> Result<Vec<Observation>> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(raw).map_err(|e| QhError::input(origin, e))?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let raw: RawRecord = serde_json::from_value(record)
                .map_err(|e| QhError::malformed(origin, index, e.to_string()))?;
            into_observation(origin, index, raw, marker)
        })
        .collect()
}

fn into_observation(origin: &str, index: usize, raw: RawRecord, marker: &str) -> Result<Observation> {
    let missing = |field: &str| QhError::malformed(origin, index, format!("missing field `{field}`"));

    let direction = match raw.kind.as_deref() {
        Some("request") => Direction::Request,
        Some("response") => Direction::Response,
        Some(other) => {
            return Err(QhError::malformed(
                origin,
                index,
                format!("unknown type `{other}`, expected `request` or `response`"),
            ))
        }
        None => return Err(missing("type")),
    };
    let name = raw.name.ok_or_else(|| missing("name"))?;
    if name.is_empty() {
        return Err(QhError::malformed(origin, index, "empty header name"));
    }
    let value = raw.value.ok_or_else(|| missing("value"))?;
    let count = raw.count.ok_or_else(|| missing("count"))?;

    Ok(Observation::new(direction, &name, ObservedValue::classify(value, marker), count))
}

pub fn load_capture(path: &Path, marker: &str) -> Result<Vec<Observation>> {
    let raw = std::fs::read_to_string(path).map_err(|e| QhError::input(path, e))?;
    parse_capture(&path.display().to_string(), &raw, marker)
}

/// Loads every file in order and concatenates the records.
/// The first failing file aborts the whole load.
pub fn load_captures<P: AsRef<Path>>(paths: &[P], marker: &str) -> Result<Vec<Observation>> {
    let mut all = Vec::new();
    for path in paths {
        let path = path.as_ref();
        tracing::info!("Loading {}...", path.display());
        let records = load_capture(path, marker)?;
        tracing::info!("Loaded {} entries from {}", records.len(), path.display());
        all.extend(records);
    }
    tracing::info!("Total entries loaded: {}", all.len());
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "(anonymized)";

    #[test]
    fn parses_records_and_marker() {
        let raw = r#"[
            {"type": "request", "name": "Accept-Encoding", "value": "gzip", "count": 5},
            {"type": "response", "name": "set-cookie", "value": "(anonymized)", "count": 3}
        ]"#;
        let obs = parse_capture("cap.json", raw, MARKER).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].direction, Direction::Request);
        assert_eq!(obs[0].name, "accept-encoding");
        assert_eq!(obs[1].value, ObservedValue::Anonymized);
        assert_eq!(obs[1].count, 3);
    }

    #[test]
    fn missing_count_is_malformed() {
        let raw = r#"[
            {"type": "request", "name": "a", "value": "b", "count": 1},
            {"type": "request", "name": "a", "value": "b"}
        ]"#;
        match parse_capture("cap.json", raw, MARKER).unwrap_err() {
            QhError::MalformedRecord { index, reason, .. } => {
                assert_eq!(index, 1);
                assert!(reason.contains("count"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_count_and_unknown_type_are_malformed() {
        let negative = r#"[{"type": "request", "name": "a", "value": "b", "count": -1}]"#;
        assert_eq!(parse_capture("c", negative, MARKER).unwrap_err().exit_code(), 3);

        let unknown = r#"[{"type": "push", "name": "a", "value": "b", "count": 1}]"#;
        assert_eq!(parse_capture("c", unknown, MARKER).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn invalid_json_is_input_error() {
        let err = parse_capture("c", "{not json", MARKER).unwrap_err();
        assert!(matches!(err, QhError::Input { .. }));
        let err = parse_capture("c", r#"{"type": "request"}"#, MARKER).unwrap_err();
        assert!(matches!(err, QhError::Input { .. }));
    }

    #[test]
    fn unreadable_file_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"[{"type": "request", "name": "a", "value": "b", "count": 1}]"#)
            .unwrap();
        let missing = dir.path().join("missing.json");

        let err = load_captures(&[good.clone(), missing], MARKER).unwrap_err();
        assert!(matches!(err, QhError::Input { .. }));
        assert_eq!(load_captures(&[good], MARKER).unwrap().len(), 1);
    }
}
