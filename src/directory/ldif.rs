//! Minimal LDIF reader for `ldapsearch -LLL` output.

use base64::{Engine as _, engine::general_purpose};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LdifEntry {
    pub dn: String,
    attributes: Vec<(String, String)>,
}

impl LdifEntry {
    /// First value of `name`, compared case-insensitively.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Parse LDIF content records.
///
/// Folded lines are joined, `::` values are base64-decoded and comment lines
/// are skipped. Values given by URL (`:<`) are ignored.
pub fn parse(input: &str) -> Vec<LdifEntry> {
    let mut entries = Vec::new();
    let mut current: Option<LdifEntry> = None;

    for line in unfold(input) {
        if line.is_empty() {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let Some((name, value)) = parse_attribute(&line) else {
            continue;
        };

        if name.eq_ignore_ascii_case("dn") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            current = Some(LdifEntry {
                dn: value,
                attributes: Vec::new(),
            });
            continue;
        }

        current
            .get_or_insert_with(LdifEntry::default)
            .attributes
            .push((name.to_string(), value));
    }

    if let Some(entry) = current {
        entries.push(entry);
    }
    entries
}

fn unfold(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in input.lines() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(continuation) = raw.strip_prefix(' ') {
            if let Some(last) = lines.last_mut().filter(|last| !last.is_empty()) {
                last.push_str(continuation);
                continue;
            }
        }
        lines.push(raw.to_string());
    }
    lines
}

fn parse_attribute(line: &str) -> Option<(&str, String)> {
    let (name, rest) = line.split_once(':')?;

    if let Some(encoded) = rest.strip_prefix(':') {
        let bytes = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
        return Some((name, String::from_utf8_lossy(&bytes).into_owned()));
    }
    if rest.starts_with('<') {
        return None;
    }

    Some((name, rest.strip_prefix(' ').unwrap_or(rest).to_string()))
}
