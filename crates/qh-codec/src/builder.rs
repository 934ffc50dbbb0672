use crate::table::{pair_key, DirectionTable, StaticTable};
use qh_core::{
    normalize_name, Candidate, CurationSheet, Direction, DuplicatePolicy, HeaderEntry, QhError,
    Result, TableConfig,
};
use std::collections::HashSet;

/// Assigns static table IDs from curated candidate lists.
///
/// IDs run 1..=C over the kept complete pairs in the order given, then
/// continue through the kept name-only candidates. Input order is never
/// re-sorted; callers pass frequency-ranked lists.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    config: TableConfig,
}

impl TableBuilder {
    pub fn new(config: TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Builds both directions. Any error aborts the whole table.
    pub fn build(&self, sheet: &CurationSheet) -> Result<StaticTable> {
        let request = self.build_direction(
            Direction::Request,
            sheet.complete(Direction::Request),
            sheet.names(Direction::Request),
        )?;
        let response = self.build_direction(
            Direction::Response,
            sheet.complete(Direction::Response),
            sheet.names(Direction::Response),
        )?;

        let table = StaticTable {
            protocol_version: self.config.protocol_version.clone(),
            slot_budget: self.config.slot_budget,
            request,
            response,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn build_direction(
        &self,
        direction: Direction,
        complete: &[Candidate],
        names: &[Candidate],
    ) -> Result<DirectionTable> {
        let pairs = kept_pairs(direction, complete)?;
        let names = kept_names(direction, names)?;

        let required = pairs.len() + names.len();
        if required > usize::from(self.config.slot_budget) {
            return Err(QhError::SlotBudgetExceeded {
                direction,
                required,
                budget: self.config.slot_budget,
            });
        }

        self.check_duplicates(direction, &pairs, &names)?;

        let mut entries = Vec::with_capacity(required);
        let rows = pairs
            .into_iter()
            .chain(names.into_iter().map(|name| (name, String::new())));
        for (i, (name, value)) in rows.enumerate() {
            let id = u8::try_from(i + 1).map_err(|_| QhError::SlotBudgetExceeded {
                direction,
                required,
                budget: self.config.slot_budget,
            })?;
            entries.push(HeaderEntry { id, name, value });
        }

        let table = DirectionTable::from_entries(direction, entries, self.config.slot_budget)?;
        tracing::info!(
            "{} table: {} complete pairs, {} name-only, {}/{} slots used",
            direction,
            table.complete_pairs().len(),
            table.name_only().len(),
            table.slots_used(),
            self.config.slot_budget
        );
        Ok(table)
    }

    fn check_duplicates(&self, direction: Direction, pairs: &[(String, String)], names: &[String]) -> Result<()> {
        let mut seen_pairs = HashSet::new();
        for (name, value) in pairs {
            if !seen_pairs.insert((name.as_str(), value.as_str())) {
                return Err(QhError::DuplicateName {
                    direction,
                    name: pair_key(name, value),
                });
            }
        }

        let mut seen_names = HashSet::new();
        for name in names {
            if !seen_names.insert(name.as_str()) {
                return Err(QhError::DuplicateName {
                    direction,
                    name: name.clone(),
                });
            }
        }

        let pair_names: HashSet<&str> = pairs.iter().map(|(n, _)| n.as_str()).collect();
        for name in names.iter().filter(|n| pair_names.contains(n.as_str())) {
            match self.config.duplicate_policy {
                DuplicatePolicy::Reject => {
                    return Err(QhError::DuplicateName {
                        direction,
                        name: name.clone(),
                    })
                }
                DuplicatePolicy::Warn => tracing::warn!(
                    "{} table: `{}` is kept as both a complete pair and a name-only header",
                    direction,
                    name
                ),
            }
        }
        Ok(())
    }
}

/// Kept complete pairs with lowercase names. A kept row without a value is malformed.
fn kept_pairs(direction: Direction, rows: &[Candidate]) -> Result<Vec<(String, String)>> {
    let origin = format!("{direction} complete pairs");
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.is_kept())
        .map(|(index, row)| {
            if row.name.is_empty() {
                return Err(QhError::malformed(origin.as_str(), index, "empty header name"));
            }
            match row.value.as_deref() {
                Some(value) if !value.is_empty() => Ok((normalize_name(&row.name), value.to_string())),
                _ => Err(QhError::malformed(
                    origin.as_str(),
                    index,
                    format!("complete pair `{}` has no value", row.name),
                )),
            }
        })
        .collect()
}

fn kept_names(direction: Direction, rows: &[Candidate]) -> Result<Vec<String>> {
    let origin = format!("{direction} name-only");
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.is_kept())
        .map(|(index, row)| {
            if row.name.is_empty() {
                Err(QhError::malformed(origin.as_str(), index, "empty header name"))
            } else {
                Ok(normalize_name(&row.name))
            }
        })
        .collect()
}
