use crate::table::{DirectionTable, StaticTable};
use qh_core::EntryKind;
use std::fmt::Write;

const FORMAT_NOTE: &str = "Complete key-value pairs (Format 1) use a single byte. \
Name-only headers (Format 2) include the value after the header ID.";

/// Human-readable listing, one section per direction.
pub fn render_markdown(table: &StaticTable) -> String {
    let mut out = String::new();
    for (i, direction) in table.directions().into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        section(&mut out, direction, table.slot_budget);
    }
    out
}

fn section(out: &mut String, table: &DirectionTable, budget: u16) {
    let _ = writeln!(out, "## {} Headers\n", table.direction().title());
    let _ = writeln!(out, "**Slot usage: {}/{}**\n", table.slots_used(), budget);
    let _ = writeln!(out, "{FORMAT_NOTE}\n");
    out.push_str("| Header ID | Type | Header Name | Header Value |\n");
    out.push_str("|-----------|------|-------------|--------------|\n");
    for entry in table.entries() {
        let value = match entry.kind() {
            EntryKind::CompletePair => cell(&entry.value),
            EntryKind::NameOnly => "(variable)".to_string(),
        };
        let _ = writeln!(
            out,
            "| 0x{:02X} | {} | {} | {} |",
            entry.id,
            entry.kind().label(),
            cell(&entry.name),
            value
        );
    }
}

/// Keeps a value inside its table cell.
fn cell(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('\r', "")
        .replace('\n', " ")
}
