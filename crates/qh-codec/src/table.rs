use qh_core::{normalize_name, Direction, EntryKind, HeaderEntry, QhError, Result, RESERVED_ID};
use std::collections::HashMap;

/// Encode key of a complete pair: name and exact value joined by a colon.
pub fn pair_key(name: &str, value: &str) -> String {
    format!("{name}:{value}")
}

/// One direction's static table.
///
/// `entries[i]` holds ID `i + 1`. Both encode maps are derived from `entries`
/// at construction and never mutated, so decode and encode sides cannot drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionTable {
    direction: Direction,
    entries: Vec<HeaderEntry>,
    complete_count: usize,
    pair_encode: HashMap<String, u8>,
    name_encode: HashMap<String, u8>,
}

impl DirectionTable {
    /// Validates the decode entries and derives both encode maps from them.
    pub fn from_entries(direction: Direction, entries: Vec<HeaderEntry>, slot_budget: u16) -> Result<Self> {
        if entries.len() > usize::from(slot_budget) {
            return Err(QhError::SlotBudgetExceeded {
                direction,
                required: entries.len(),
                budget: slot_budget,
            });
        }

        let mut complete_count = 0;
        let mut pair_encode = HashMap::new();
        let mut name_encode = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            let violation = |what: String| {
                QhError::InvariantViolation(format!("{direction} table, ID 0x{:02X}: {what}", entry.id))
            };

            if entry.id == RESERVED_ID || usize::from(entry.id) != i + 1 {
                return Err(violation(format!("expected ID 0x{:02X}, IDs must be dense from 0x01", i + 1)));
            }
            if entry.name.is_empty() || entry.name != normalize_name(&entry.name) {
                return Err(violation(format!("name `{}` is not a lowercase header name", entry.name)));
            }

            match entry.kind() {
                EntryKind::CompletePair => {
                    if complete_count != i {
                        return Err(violation("complete pair after a name-only entry".into()));
                    }
                    complete_count += 1;
                    if pair_encode.insert(pair_key(&entry.name, &entry.value), entry.id).is_some() {
                        return Err(QhError::DuplicateName {
                            direction,
                            name: pair_key(&entry.name, &entry.value),
                        });
                    }
                }
                EntryKind::NameOnly => {
                    if name_encode.insert(entry.name.clone(), entry.id).is_some() {
                        return Err(QhError::DuplicateName {
                            direction,
                            name: entry.name.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            direction,
            entries,
            complete_count,
            pair_encode,
            name_encode,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    pub fn slots_used(&self) -> usize {
        self.entries.len()
    }

    pub fn complete_pairs(&self) -> &[HeaderEntry] {
        &self.entries[..self.complete_count]
    }

    pub fn name_only(&self) -> &[HeaderEntry] {
        &self.entries[self.complete_count..]
    }

    /// `None` for the reserved ID and anything past the last slot.
    pub fn decode(&self, id: u8) -> Option<&HeaderEntry> {
        if id == RESERVED_ID {
            return None;
        }
        self.entries.get(usize::from(id) - 1)
    }

    /// Format 1 lookup. The name is case-insensitive, the value is byte-exact.
    pub fn encode_pair(&self, name: &str, value: &str) -> Option<u8> {
        self.pair_encode
            .get(&pair_key(&normalize_name(name), value))
            .copied()
    }

    /// Format 2 lookup.
    pub fn encode_name(&self, name: &str) -> Option<u8> {
        self.name_encode.get(&normalize_name(name)).copied()
    }

    pub fn pair_encode_table(&self) -> &HashMap<String, u8> {
        &self.pair_encode
    }

    pub fn name_encode_table(&self) -> &HashMap<String, u8> {
        &self.name_encode
    }

    /// Every decode entry must encode back to its own ID, and the encode
    /// maps must hold nothing else.
    pub fn check_consistency(&self) -> Result<()> {
        for entry in &self.entries {
            let id = match entry.kind() {
                EntryKind::CompletePair => self.encode_pair(&entry.name, &entry.value),
                EntryKind::NameOnly => self.encode_name(&entry.name),
            };
            if id != Some(entry.id) {
                return Err(QhError::InvariantViolation(format!(
                    "{} table: entry 0x{:02X} `{}` encodes to {:?}",
                    self.direction, entry.id, entry.name, id
                )));
            }
        }
        let expected_names = self.entries.len() - self.complete_count;
        if self.pair_encode.len() != self.complete_count || self.name_encode.len() != expected_names {
            return Err(QhError::InvariantViolation(format!(
                "{} table: encode maps hold {} pairs and {} names, decode table has {} and {}",
                self.direction,
                self.pair_encode.len(),
                self.name_encode.len(),
                self.complete_count,
                expected_names
            )));
        }
        Ok(())
    }
}

/// The request and response tables of one protocol revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTable {
    pub protocol_version: String,
    pub slot_budget: u16,
    pub request: DirectionTable,
    pub response: DirectionTable,
}

impl StaticTable {
    pub fn direction(&self, direction: Direction) -> &DirectionTable {
        match direction {
            Direction::Request => &self.request,
            Direction::Response => &self.response,
        }
    }

    pub fn directions(&self) -> [&DirectionTable; 2] {
        [&self.request, &self.response]
    }

    pub fn validate(&self) -> Result<()> {
        for table in self.directions() {
            if table.slots_used() > usize::from(self.slot_budget) {
                return Err(QhError::SlotBudgetExceeded {
                    direction: table.direction(),
                    required: table.slots_used(),
                    budget: self.slot_budget,
                });
            }
            table.check_consistency()?;
        }
        Ok(())
    }
}
