use crate::table::{DirectionTable, StaticTable};
use qh_core::{Direction, EntryKind, HeaderEntry, QhError, Result};
use serde::{Deserialize, Serialize};

/// Schema revision of the interchange document itself.
pub const INTERCHANGE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeEntry {
    /// Two-digit uppercase hex, e.g. `0x0A`.
    pub id: String,
    pub id_dec: u8,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeDirection {
    pub slots_used: usize,
    pub slots_total: u16,
    pub headers: Vec<InterchangeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeDoc {
    pub version: u32,
    pub protocol_version: String,
    pub request: InterchangeDirection,
    pub response: InterchangeDirection,
}

pub fn hex_id(id: u8) -> String {
    format!("0x{id:02X}")
}

impl InterchangeDoc {
    pub fn from_table(table: &StaticTable) -> Self {
        let direction = |t: &DirectionTable| InterchangeDirection {
            slots_used: t.slots_used(),
            slots_total: table.slot_budget,
            headers: t
                .entries()
                .iter()
                .map(|e| InterchangeEntry {
                    id: hex_id(e.id),
                    id_dec: e.id,
                    kind: e.kind(),
                    name: e.name.clone(),
                    value: match e.kind() {
                        EntryKind::CompletePair => Some(e.value.clone()),
                        EntryKind::NameOnly => None,
                    },
                })
                .collect(),
        };
        Self {
            version: INTERCHANGE_VERSION,
            protocol_version: table.protocol_version.clone(),
            request: direction(&table.request),
            response: direction(&table.response),
        }
    }

    /// Rebuilds and validates the table the document describes.
    pub fn into_table(self) -> Result<StaticTable> {
        if self.version != INTERCHANGE_VERSION {
            return Err(QhError::InvariantViolation(format!(
                "unsupported interchange version {}",
                self.version
            )));
        }
        if self.request.slots_total != self.response.slots_total {
            return Err(QhError::InvariantViolation(format!(
                "request and response disagree on slots_total ({} vs {})",
                self.request.slots_total, self.response.slots_total
            )));
        }
        let slot_budget = self.request.slots_total;
        let table = StaticTable {
            protocol_version: self.protocol_version,
            slot_budget,
            request: direction_table(Direction::Request, self.request)?,
            response: direction_table(Direction::Response, self.response)?,
        };
        table.validate()?;
        Ok(table)
    }
}

fn direction_table(direction: Direction, doc: InterchangeDirection) -> Result<DirectionTable> {
    if doc.slots_used != doc.headers.len() {
        return Err(QhError::InvariantViolation(format!(
            "{direction}: slots_used is {} but {} headers are listed",
            doc.slots_used,
            doc.headers.len()
        )));
    }
    let entries = doc
        .headers
        .into_iter()
        .map(|h| {
            if h.id != hex_id(h.id_dec) {
                return Err(QhError::InvariantViolation(format!(
                    "{direction}: id `{}` does not match id_dec {}",
                    h.id, h.id_dec
                )));
            }
            let value = match (h.kind, h.value) {
                (EntryKind::CompletePair, Some(v)) if !v.is_empty() => v,
                (EntryKind::NameOnly, None) => String::new(),
                (kind, _) => {
                    return Err(QhError::InvariantViolation(format!(
                        "{direction}: entry {} is {:?} but its value does not match",
                        h.id, kind
                    )))
                }
            };
            Ok(HeaderEntry {
                id: h.id_dec,
                name: h.name,
                value,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    DirectionTable::from_entries(direction, entries, doc.slots_total)
}

pub fn render_interchange(table: &StaticTable) -> Result<String> {
    serde_json::to_string_pretty(&InterchangeDoc::from_table(table))
        .map_err(|e| QhError::InvariantViolation(format!("interchange serialization: {e}")))
}

impl StaticTable {
    /// Loads a table from its interchange document.
    pub fn from_interchange(raw: &str) -> Result<Self> {
        let doc: InterchangeDoc = serde_json::from_str(raw)
            .map_err(|e| QhError::input("interchange document", e))?;
        doc.into_table()
    }
}
