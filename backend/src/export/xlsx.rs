//! Minimal Office Open XML spreadsheet writer.
//!
//! A workbook is a zip container holding the package content types, the
//! package and workbook relationships, the workbook part and one worksheet
//! part per sheet. Text is written as inline strings so no shared string
//! table is needed.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{Cursor, Write};

use serde_json::Value;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::ExportError;

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const DOC_RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Cell::Empty, Cell::Number),
            Value::String(s) => Cell::Text(s.clone()),
            Value::Array(items) => Cell::Text(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Object(_) => Cell::Text(value.to_string()),
        }
    }
}

/// A named worksheet: a header row followed by data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> &mut Self {
        self.rows.push(row);
        self
    }

    /// Append one row per record, picking `keys` out of each JSON object.
    pub fn push_records(&mut self, keys: &[&str], records: &[Value]) -> &mut Self {
        for record in records {
            let row = keys
                .iter()
                .map(|key| record.get(*key).map_or(Cell::Empty, Cell::from))
                .collect();
            self.rows.push(row);
        }
        self
    }

    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rows.len() * 64);
        xml.push_str(XML_DECLARATION);
        let _ = write!(xml, r#"<worksheet xmlns="{}"><sheetData>"#, MAIN_NS);
        for (r, row) in self.rows.iter().enumerate() {
            let row_number = r + 1;
            let _ = write!(xml, r#"<row r="{}">"#, row_number);
            for (c, cell) in row.iter().enumerate() {
                let reference = format!("{}{}", column_name(c), row_number);
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        let _ = write!(
                            xml,
                            r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                            reference,
                            escape_xml(text)
                        );
                    }
                    Cell::Number(n) if n.is_finite() => {
                        let _ = write!(xml, r#"<c r="{}"><v>{}</v></c>"#, reference, n);
                    }
                    Cell::Number(_) => {}
                    Cell::Bool(b) => {
                        let _ = write!(
                            xml,
                            r#"<c r="{}" t="b"><v>{}</v></c>"#,
                            reference,
                            u8::from(*b)
                        );
                    }
                }
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

/// Spreadsheet document built in memory and serialized with [`Workbook::to_bytes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet whose first row holds `headers`.
    pub fn add_sheet(&mut self, name: &str, headers: &[&str]) -> &mut Sheet {
        let header_row = headers.iter().map(|h| Cell::from(*h)).collect();
        self.sheets.push(Sheet {
            name: name.to_string(),
            rows: vec![header_row],
        });
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Serialize the workbook as an `.xlsx` package.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ExportError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("[Content_Types].xml", SimpleFileOptions::default())?;
        zip.write_all(self.content_types().as_bytes())?;

        zip.start_file("_rels/.rels", SimpleFileOptions::default())?;
        zip.write_all(package_relationships().as_bytes())?;

        zip.start_file("xl/workbook.xml", SimpleFileOptions::default())?;
        zip.write_all(self.workbook_xml().as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", SimpleFileOptions::default())?;
        zip.write_all(self.workbook_relationships().as_bytes())?;

        for (index, sheet) in self.sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), SimpleFileOptions::default())?;
            zip.write_all(sheet.to_xml().as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }

    fn content_types(&self) -> String {
        let mut xml = String::from(XML_DECLARATION);
        let _ = write!(
            xml,
            r#"<Types xmlns="{}"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            CONTENT_TYPES_NS
        );
        for index in 1..=self.sheets.len() {
            let _ = write!(
                xml,
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                index
            );
        }
        xml.push_str("</Types>");
        xml
    }

    fn workbook_xml(&self) -> String {
        let mut xml = String::from(XML_DECLARATION);
        let _ = write!(
            xml,
            r#"<workbook xmlns="{}" xmlns:r="{}"><sheets>"#,
            MAIN_NS, DOC_RELATIONSHIPS_NS
        );
        for (index, sheet) in self.sheets.iter().enumerate() {
            let _ = write!(
                xml,
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(&sheet.name),
                index + 1,
                index + 1
            );
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn workbook_relationships(&self) -> String {
        let mut xml = String::from(XML_DECLARATION);
        let _ = write!(xml, r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS);
        for index in 1..=self.sheets.len() {
            let _ = write!(
                xml,
                r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                index, DOC_RELATIONSHIPS_NS, index
            );
        }
        xml.push_str("</Relationships>");
        xml
    }
}

fn package_relationships() -> String {
    format!(
        r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        XML_DECLARATION, RELATIONSHIPS_NS, DOC_RELATIONSHIPS_NS
    )
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("plain"), "plain");
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_sheet_xml_contains_cells() {
        let mut workbook = Workbook::new();
        workbook
            .add_sheet("Contracts", &["Name", "Count", "Basket"])
            .push_row(vec![Cell::from("R&D"), Cell::from(3i64), Cell::from(true)]);
        let xml = workbook.sheets()[0].to_xml();
        assert!(xml.contains(r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">Name</t></is></c>"#));
        assert!(xml.contains("R&amp;D"));
        assert!(xml.contains(r#"<c r="B2"><v>3</v></c>"#));
        assert!(xml.contains(r#"<c r="C2" t="b"><v>1</v></c>"#));
    }

    #[test]
    fn test_workbook_is_a_zip_package() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Hosts", &["Hostname"]);
        let bytes = workbook.to_bytes().unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
