//! entry_points.txt parser

use crate::entry_point::EntryPointDescriptor;
use crate::errors::EntryPointError;
use eptest_logger as logger;

/// Parse every entry point from entry_points.txt content.
///
/// Section headers name the group; `name = value` lines inside a section
/// become descriptors in file order. Blank lines and `#`/`;` comments are
/// skipped. A definition outside any section or without `=` is an error.
pub fn parse_entry_points_txt(content: &str) -> Result<Vec<EntryPointDescriptor>, EntryPointError> {
    let mut entries = Vec::new();
    let mut current_group: Option<&str> = None;

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(group) = parse_section_header(line) {
            current_group = Some(group);
            continue;
        }

        let Some(group) = current_group else {
            return Err(EntryPointError::InvalidLine(line.to_string()));
        };
        entries.push(parse_entry_point_line(line, group)?);
    }

    logger::debug(&format!(
        "Parsed {} entry points from entry_points.txt",
        entries.len()
    ));
    Ok(entries)
}

/// Group name of a `[group]` header line
pub fn parse_section_header(line: &str) -> Option<&str> {
    let group = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    (!group.is_empty()).then_some(group)
}

/// Parse a single line in the format `name = module[:attr] [extras]`
pub fn parse_entry_point_line(line: &str, group: &str) -> Result<EntryPointDescriptor, EntryPointError> {
    let (name, value) = line
        .split_once('=')
        .ok_or_else(|| EntryPointError::InvalidLine(line.to_string()))?;
    EntryPointDescriptor::parse(name.trim(), group, value)
}
