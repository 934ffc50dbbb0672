use crate::table::{DirectionTable, StaticTable};
use qh_core::{SourceLang, RESERVED_ID};
use std::fmt::Write;

/// Source-code form of the table for a codec to compile in.
pub fn render_source(table: &StaticTable, lang: SourceLang) -> String {
    match lang {
        SourceLang::Rust => render_rust(table),
        SourceLang::Go => render_go(table),
    }
}

/// Rust string literal. `escape_default` covers quotes, backslashes,
/// control characters and non-ASCII, so the literal round-trips exactly.
pub fn rust_literal(text: &str) -> String {
    format!("\"{}\"", text.escape_default())
}

/// Go interpreted string literal. Non-ASCII text stays as UTF-8.
pub fn go_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn upper_ident(table: &DirectionTable) -> &'static str {
    match table.direction() {
        qh_core::Direction::Request => "REQUEST",
        qh_core::Direction::Response => "RESPONSE",
    }
}

fn sorted_encode(map: &std::collections::HashMap<String, u8>) -> Vec<(&str, u8)> {
    let mut rows: Vec<(&str, u8)> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));
    rows
}

fn render_rust(table: &StaticTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// @generated by qh-generate. Do not edit.");
    let _ = writeln!(out, "// Static header table, protocol version {}.\n", table.protocol_version);
    out.push_str("/// `(name, value)`; an empty value marks a name-only (Format 2) entry.\n");
    out.push_str("pub type HeaderPair = (&'static str, &'static str);\n\n");
    let _ = writeln!(out, "pub const PROTOCOL_VERSION: &str = {};", rust_literal(&table.protocol_version));
    let _ = writeln!(out, "pub const RESERVED_ID: u8 = {RESERVED_ID};");
    let _ = writeln!(out, "pub const SLOT_BUDGET: usize = {};", table.slot_budget);

    for direction in table.directions() {
        let ident = upper_ident(direction);
        let pairs = direction.complete_pairs().len();
        out.push('\n');
        let _ = writeln!(
            out,
            "// {} headers: {}/{} slots used. IDs 0x01..=0x{:02X} are complete pairs, the rest name-only.",
            direction.direction().title(),
            direction.slots_used(),
            table.slot_budget,
            pairs
        );
        let _ = writeln!(
            out,
            "pub static {ident}_DECODE: [HeaderPair; {}] = [",
            direction.slots_used() + 1
        );
        out.push_str("    (\"\", \"\"), // 0x00 reserved\n");
        for entry in direction.entries() {
            let _ = writeln!(
                out,
                "    ({}, {}), // 0x{:02X}",
                rust_literal(&entry.name),
                rust_literal(&entry.value),
                entry.id
            );
        }
        out.push_str("];\n\n");

        let encode_tables = [
            ("PAIR", "`name:value`", sorted_encode(direction.pair_encode_table())),
            ("NAME", "name", sorted_encode(direction.name_encode_table())),
        ];
        for (suffix, keyed_by, rows) in encode_tables {
            let _ = writeln!(out, "/// Keyed by {keyed_by}, sorted for `lookup`.");
            let _ = writeln!(
                out,
                "pub static {ident}_{suffix}_ENCODE: [(&str, u8); {}] = [",
                rows.len()
            );
            for (key, id) in rows {
                let _ = writeln!(out, "    ({}, 0x{:02X}),", rust_literal(key), id);
            }
            out.push_str("];\n\n");
        }
    }

    out.push_str("/// Binary search over an encode table.\n");
    out.push_str("pub fn lookup(table: &[(&str, u8)], key: &str) -> Option<u8> {\n");
    out.push_str("    table\n        .binary_search_by(|(k, _)| (*k).cmp(key))\n");
    out.push_str("        .ok()\n        .map(|i| table[i].1)\n}\n");
    out
}

fn go_prefix(table: &DirectionTable) -> &'static str {
    match table.direction() {
        qh_core::Direction::Request => "request",
        qh_core::Direction::Response => "response",
    }
}

fn render_go(table: &StaticTable) -> String {
    let mut out = String::new();
    out.push_str("// Code generated by qh-generate. DO NOT EDIT.\n\n");
    out.push_str("package qh\n\n");
    out.push_str("type HeaderPair struct {\n\tKey   string\n\tValue string\n}\n\n");
    let _ = writeln!(out, "const ProtocolVersion = {}\n", go_literal(&table.protocol_version));

    for direction in table.directions() {
        let prefix = go_prefix(direction);
        let title = direction.direction().title();
        let _ = writeln!(
            out,
            "// {title} complete key-value pairs (Format 1) - {}/{} slots used",
            direction.slots_used(),
            table.slot_budget
        );
        out.push_str("// Index 0 is reserved for CustomHeader\n");
        out.push_str("// IDs 1 to N are complete pairs, N+1 onwards are name-only headers\n");
        let _ = writeln!(out, "var {prefix}HeaderCompletePairs = []HeaderPair{{");
        out.push_str("\t{}, // Index 0 reserved\n");
        for entry in direction.complete_pairs() {
            let _ = writeln!(
                out,
                "\t{{{}, {}}}, // ID 0x{:02X}",
                go_literal(&entry.name),
                go_literal(&entry.value),
                entry.id
            );
        }
        out.push_str("}\n\n");

        let _ = writeln!(out, "// Reverse lookup for encoding {prefix} complete pairs (Format 1)");
        let _ = writeln!(out, "var {prefix}HeaderCompleteLookup map[string]byte\n");

        let _ = writeln!(out, "var {prefix}HeaderTable = map[string]byte{{");
        for entry in direction.name_only() {
            let _ = writeln!(out, "\t{}: 0x{:02X},", go_literal(&entry.name), entry.id);
        }
        out.push_str("}\n\n");
    }

    out.push_str("func init() {\n");
    for (i, direction) in table.directions().into_iter().enumerate() {
        let prefix = go_prefix(direction);
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "\t{prefix}HeaderCompleteLookup = make(map[string]byte)");
        let _ = writeln!(out, "\tfor i, pair := range {prefix}HeaderCompletePairs {{");
        out.push_str("\t\tif i == 0 {\n\t\t\tcontinue\n\t\t}\n");
        out.push_str("\t\tkey := pair.Key + \":\" + pair.Value\n");
        let _ = writeln!(out, "\t\t{prefix}HeaderCompleteLookup[key] = byte(i)");
        out.push_str("\t}\n");
    }
    out.push_str("}\n");
    out
}
