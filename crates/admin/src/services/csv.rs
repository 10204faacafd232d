//! Minimal CSV writer for the exports.
//!
//! Fields are quoted per RFC 4180 only when they contain a comma, a double
//! quote, a carriage return or a line feed. Records end with CRLF.

/// Quote a field if it needs quoting.
#[must_use]
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Builds a CSV document record by record.
#[derive(Debug, Default)]
pub struct CsvWriter {
    buf: String,
}

impl CsvWriter {
    /// A document starting with `header`.
    #[must_use]
    pub fn with_header(header: &[&str]) -> Self {
        let mut writer = Self::default();
        writer.record(header);
        writer
    }

    /// Append one record.
    pub fn record<S: AsRef<str>>(&mut self, fields: &[S]) {
        let line = fields
            .iter()
            .map(|f| escape_field(f.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        self.buf.push_str(&line);
        self.buf.push_str("\r\n");
    }

    /// The finished document.
    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields_are_not_quoted() {
        assert_eq!(escape_field("LAPTOP001"), "LAPTOP001");
        assert_eq!(escape_field(""), "");
        assert_eq!(escape_field("12.50"), "12.50");
    }

    #[test]
    fn test_special_fields_are_quoted() {
        assert_eq!(escape_field("Desk, oak"), "\"Desk, oak\"");
        assert_eq!(escape_field("6\" ruler"), "\"6\"\" ruler\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape_field("cr\rhere"), "\"cr\rhere\"");
    }

    #[test]
    fn test_writer_builds_document() {
        let mut csv = CsvWriter::with_header(&["id", "name"]);
        csv.record(&["1", "Chair"]);
        csv.record(&["2".to_string(), "Table, round".to_string()]);
        assert_eq!(
            csv.finish(),
            "id,name\r\n1,Chair\r\n2,\"Table, round\"\r\n"
        );
    }

    #[test]
    fn test_json_field_is_quoted() {
        let items = r#"[{"name":"Lamp","quantity":1,"price":"19.99"}]"#;
        assert_eq!(
            escape_field(items),
            r#""[{""name"":""Lamp"",""quantity"":1,""price"":""19.99""}]""#
        );
    }
}
