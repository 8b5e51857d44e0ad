//! Text, JSON and CSV output for annotated results.
//!
//! Every writer returns its encode or IO failure; nothing is dropped on the
//! floor, so a truncated output is always accompanied by an error.

use miburi_core::{AnnotatedResult, SchemaEntry};
use std::io::{self, Write};

/// Column headers of the CSV output, in field order.
pub const CSV_HEADERS: [&str; 8] = ["OID", "Name", "MIB", "Type", "Value", "Enum", "Unit", "Desc"];

/// Output could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Writing to the sink failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    /// JSON encoding failed.
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format of annotated results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// `Key: value` blocks separated by blank lines.
    #[default]
    Text,
    /// One JSON array.
    Json,
    /// CSV with a header row.
    Csv,
}

/// Write `results` in `format`.
///
/// # Errors
///
/// Returns the first encode or write failure.
pub fn write_results<W: Write>(
    w: &mut W,
    results: &[AnnotatedResult],
    format: Format,
) -> Result<(), ReportError> {
    match format {
        Format::Text => write_text(w, results),
        Format::Json => write_json(w, results),
        Format::Csv => write_csv(w, results),
    }
}

fn write_description<W: Write>(w: &mut W, description: &str) -> io::Result<()> {
    writeln!(w, "Description: ---\n{description}\n---")
}

/// Write walk results as text blocks.
///
/// # Errors
///
/// Returns the first write failure.
pub fn write_text<W: Write>(w: &mut W, results: &[AnnotatedResult]) -> Result<(), ReportError> {
    for r in results {
        writeln!(w, "OID: {}", r.oid)?;
        writeln!(w, "Name: {}", r.name)?;
        writeln!(w, "MIB: {}", r.module)?;
        writeln!(w, "Type: {}", r.type_tag)?;
        writeln!(w, "Value: {}", r.value)?;
        if let Some(e) = non_empty(&r.enumeration) {
            writeln!(w, "Enum: {e}")?;
        }
        if let Some(u) = non_empty(&r.units) {
            writeln!(w, "Unit: {u}")?;
        }
        if let Some(d) = non_empty(&r.description) {
            write_description(w, d)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Write one `find` lookup.
///
/// The type line and the description block are only written when `verbose`
/// is set; the description block is written even when empty.
///
/// # Errors
///
/// Returns the first write failure.
pub fn write_find_text<W: Write>(
    w: &mut W,
    result: &AnnotatedResult,
    verbose: bool,
) -> Result<(), ReportError> {
    writeln!(w, "OID: {}", result.oid)?;
    writeln!(w, "Name: {}", result.name)?;
    writeln!(w, "MIB: {}", result.module)?;
    if verbose {
        writeln!(w, "Type: {}", result.type_tag)?;
        if let Some(e) = non_empty(&result.enumeration) {
            writeln!(w, "Enum: {e}")?;
        }
        if let Some(u) = non_empty(&result.units) {
            writeln!(w, "Unit: {u}")?;
        }
        write_description(w, result.description.as_deref().unwrap_or_default())?;
    }
    Ok(())
}

/// Write results as a JSON array followed by a newline.
///
/// # Errors
///
/// Returns the encode or write failure.
pub fn write_json<W: Write>(w: &mut W, results: &[AnnotatedResult]) -> Result<(), ReportError> {
    serde_json::to_writer(&mut *w, results)?;
    writeln!(w)?;
    Ok(())
}

/// Write results as CSV with a header row.
///
/// # Errors
///
/// Returns the first write failure.
pub fn write_csv<W: Write>(w: &mut W, results: &[AnnotatedResult]) -> Result<(), ReportError> {
    write_csv_record(w, &CSV_HEADERS)?;
    for r in results {
        write_csv_record(
            w,
            &[
                r.oid.as_str(),
                r.name.as_str(),
                r.module.as_str(),
                r.type_tag.as_str(),
                r.value.as_str(),
                r.enumeration.as_deref().unwrap_or_default(),
                r.units.as_deref().unwrap_or_default(),
                r.description.as_deref().unwrap_or_default(),
            ],
        )?;
    }
    w.flush()?;
    Ok(())
}

/// Write every entry of a snapshot as one JSON array.
///
/// # Errors
///
/// Returns the encode or write failure.
pub fn export_entries_json<W: Write>(w: &mut W, entries: &[SchemaEntry]) -> Result<(), ReportError> {
    serde_json::to_writer(&mut *w, entries)?;
    writeln!(w)?;
    Ok(())
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Whether a CSV field must be quoted: it holds a separator, quote or line
/// break, starts with whitespace, or is the lone `\.` marker.
fn needs_quotes(field: &str) -> bool {
    field == "\\."
        || field.contains([',', '"', '\r', '\n'])
        || field.starts_with(char::is_whitespace)
}

/// RFC 4180 quoting with embedded quotes doubled. Records end with a bare
/// `\n`.
fn write_csv_record<W: Write>(w: &mut W, fields: &[&str]) -> io::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(field) {
            write!(w, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            w.write_all(field.as_bytes())?;
        }
    }
    w.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sys_descr() -> AnnotatedResult {
        AnnotatedResult {
            oid: "1.3.6.1.2.1.1.1.0".into(),
            name: "sysDescr.0".into(),
            module: "SNMPv2-MIB".into(),
            type_tag: "OctetString".into(),
            value: "Linux router".into(),
            ..AnnotatedResult::default()
        }
    }

    fn if_oper_status() -> AnnotatedResult {
        AnnotatedResult {
            oid: "1.3.6.1.2.1.2.2.1.8.1".into(),
            name: "ifOperStatus.1".into(),
            module: "IF-MIB".into(),
            type_tag: "Integer".into(),
            value: "1".into(),
            enumeration: Some("up = 1, down = 2".into()),
            units: None,
            description: Some("The current \"operational\" state.".into()),
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<(), ReportError>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_output() {
        let out = render(|w| write_text(w, &[sys_descr(), if_oper_status()]));
        let expected = "\
OID: 1.3.6.1.2.1.1.1.0
Name: sysDescr.0
MIB: SNMPv2-MIB
Type: OctetString
Value: Linux router

OID: 1.3.6.1.2.1.2.2.1.8.1
Name: ifOperStatus.1
MIB: IF-MIB
Type: Integer
Value: 1
Enum: up = 1, down = 2
Description: ---
The current \"operational\" state.
---

";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_find_text_output() {
        let result = sys_descr();
        let out = render(|w| write_find_text(w, &result, false));
        assert_eq!(out, "OID: 1.3.6.1.2.1.1.1.0\nName: sysDescr.0\nMIB: SNMPv2-MIB\n");

        let out = render(|w| write_find_text(w, &result, true));
        assert!(out.ends_with("Type: OctetString\nDescription: ---\n\n---\n"));
    }

    #[test]
    fn test_json_output() {
        let out = render(|w| write_json(w, &[if_oper_status()]));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value[0]["OID"], "1.3.6.1.2.1.2.2.1.8.1");
        assert_eq!(value[0]["MIB"], "IF-MIB");
        assert_eq!(value[0]["Enum"], "up = 1, down = 2");
        assert!(value[0]["Unit"].is_null());
    }

    #[test]
    fn test_csv_output() {
        let out = render(|w| write_csv(w, &[sys_descr(), if_oper_status()]));
        let lines: Vec<&str> = out.split('\n').collect();

        assert_eq!(lines[0], "OID,Name,MIB,Type,Value,Enum,Unit,Desc");
        assert_eq!(lines[1], "1.3.6.1.2.1.1.1.0,sysDescr.0,SNMPv2-MIB,OctetString,Linux router,,,");
        assert_eq!(
            lines[2],
            "1.3.6.1.2.1.2.2.1.8.1,ifOperStatus.1,IF-MIB,Integer,1,\"up = 1, down = 2\",,\"The current \"\"operational\"\" state.\""
        );
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_csv_quotes_line_breaks() {
        let mut r = sys_descr();
        r.value = "line one\nline two".into();
        let out = render(|w| write_csv(w, &[r]));
        assert!(out.contains(",\"line one\nline two\",,,\n"));
        assert!(!out.contains('\r'));
    }

    #[test]
    fn test_csv_quotes_leading_space() {
        let mut r = sys_descr();
        r.value = " padded".into();
        r.units = Some("\\.".into());
        let out = render(|w| write_csv(w, &[r]));
        assert!(out.ends_with(",\" padded\",,\"\\.\",\n"), "{out}");
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failures_propagate() {
        let results = [sys_descr()];
        assert!(matches!(write_text(&mut FailingSink, &results), Err(ReportError::Io(_))));
        assert!(matches!(write_csv(&mut FailingSink, &results), Err(ReportError::Io(_))));
        assert!(write_json(&mut FailingSink, &results).is_err());
    }

    #[test]
    fn test_write_results_dispatch() {
        let csv = render(|w| write_results(w, &[sys_descr()], Format::Csv));
        assert!(csv.starts_with("OID,Name,"));
        let text = render(|w| write_results(w, &[sys_descr()], Format::default()));
        assert!(text.starts_with("OID: "));
    }
}
