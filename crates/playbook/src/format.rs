//! Human-readable formatting for response metadata and bodies.

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use serde::Serialize;
use std::time::Duration;

const UNITS: [(u64, &str); 6] = [
    (1 << 60, "EB"),
    (1 << 50, "PB"),
    (1 << 40, "TB"),
    (1 << 30, "GB"),
    (1 << 20, "MB"),
    (1 << 10, "KB"),
];

/// Format a byte count with binary units, e.g. `1.5KB`.
///
/// `None` (length not known) renders as `Unknown`.
pub fn format_bytes(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes else {
        return "Unknown".to_string();
    };
    if bytes == 0 {
        return "0B".to_string();
    }

    let (divisor, unit) = UNITS
        .iter()
        .copied()
        .find(|(size, _)| bytes >= *size)
        .unwrap_or((1, "B"));

    let value = format!("{:.2}", bytes as f64 / divisor as f64);
    let value = value.strip_suffix(".00").unwrap_or(&value);
    format!("{}{}", value, unit)
}

/// Format elapsed time rounded to milliseconds, e.g. `120ms` or `1.5s`.
pub fn format_duration(duration: Duration) -> String {
    let millis = (duration.as_micros() + 500) / 1000;
    if millis < 1000 {
        return format!("{}ms", millis);
    }
    let secs = format!("{}.{:03}", millis / 1000, millis % 1000);
    let secs = secs.trim_end_matches('0').trim_end_matches('.');
    format!("{}s", secs)
}

/// Format a response body for display.
///
/// With `pretty`, JSON, XML and HTML bodies are re-indented with tabs.
/// Anything else, or a body that fails to parse, is returned as text
/// unchanged.
pub fn format_body(content_type: &str, body: &[u8], pretty: bool) -> String {
    if pretty {
        let content_type = content_type.to_ascii_lowercase();
        let indented = if is_json(&content_type) {
            indent_json(body)
        } else if is_markup(&content_type) {
            indent_markup(body)
        } else {
            None
        };
        if let Some(indented) = indented {
            return indented;
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

fn is_json(content_type: &str) -> bool {
    content_type.contains("application/json") || content_type.contains("+json")
}

fn is_markup(content_type: &str) -> bool {
    content_type.contains("text/html")
        || content_type.contains("text/xml")
        || content_type.contains("application/xml")
        || content_type.contains("+xml")
}

fn indent_json(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(out).ok()
}

/// Re-indent well-formed markup. HTML with unclosed tags fails to parse.
fn indent_markup(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    loop {
        match reader.read_event().ok()? {
            Event::Eof => break,
            event => writer.write_event(event).ok()?,
        }
    }
    String::from_utf8(writer.into_inner()).ok()
}
