use std::fmt::Write as _;

use crate::error::ExportError;
use crate::measurement::Tags;

pub(super) fn write_line(output: &mut String, line: &str) -> Result<(), ExportError> {
    writeln!(output, "{}", line).map_err(|err| ExportError::WriteLine { source: err })
}

/// Maps a metric name onto the Prometheus name alphabet `[a-zA-Z0-9_:]`.
pub(super) fn prometheus_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == ':' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.starts_with(|ch: char| ch.is_ascii_digit()) {
        sanitized.insert(0, '_');
    }
    sanitized
}

/// Renders `{k="v",...}` including any extra labels; empty when there are
/// no labels at all.
pub(super) fn prometheus_labels(tags: &Tags, extra: &[(&str, &str)]) -> String {
    let mut parts: Vec<String> = tags
        .iter()
        .map(|(key, value)| {
            format!(
                "{}=\"{}\"",
                prometheus_name(key),
                escape_label_value(value)
            )
        })
        .collect();
    parts.extend(
        extra
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, escape_label_value(value))),
    );
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escapes measurement names and tag keys/values for Influx line protocol.
pub(super) fn influx_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

pub(super) fn influx_tags(kind: &str, tags: &Tags) -> String {
    let mut rendered = format!(",kind={}", kind);
    for (key, value) in tags {
        rendered.push(',');
        rendered.push_str(&influx_escape(key));
        rendered.push('=');
        rendered.push_str(&influx_escape(value));
    }
    rendered
}
