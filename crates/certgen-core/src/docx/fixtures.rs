//! Builder for small .docx files used in tests.

use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use zip::write::FileOptions;
use zip::ZipWriter;

use super::paragraph::RunFormat;

pub const STYLES_PART: &str = "word/styles.xml";

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

enum Block {
    Paragraph(Vec<(String, RunFormat)>),
    Table(Vec<Vec<String>>),
    SectionBreak { with_refs: bool },
}

/// In-memory description of a document to be written as .docx.
pub struct DocxFixture {
    blocks: Vec<Block>,
    header: Option<Vec<(String, RunFormat)>>,
    footer: Option<Vec<(String, RunFormat)>>,
    final_refs: bool,
    skipped: Vec<String>,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            header: None,
            footer: None,
            final_refs: true,
            skipped: Vec::new(),
        }
    }

    /// Body paragraph with a single unformatted run.
    pub fn body_paragraph(self, text: &str) -> Self {
        self.body_runs(vec![(text, RunFormat::default())])
    }

    /// Body paragraph with explicit runs.
    pub fn body_runs(mut self, runs: Vec<(&str, RunFormat)>) -> Self {
        self.blocks.push(Block::Paragraph(owned_runs(runs)));
        self
    }

    /// Table with one single-run paragraph per cell.
    pub fn table(mut self, rows: Vec<Vec<&str>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect();
        self.blocks.push(Block::Table(rows));
        self
    }

    /// End the current section; `with_refs` gives it the header/footer refs.
    pub fn section_break(mut self, with_refs: bool) -> Self {
        self.blocks.push(Block::SectionBreak { with_refs });
        self
    }

    pub fn header(mut self, text: &str) -> Self {
        self.header = Some(owned_runs(vec![(text, RunFormat::default())]));
        self
    }

    pub fn footer(mut self, text: &str) -> Self {
        self.footer = Some(owned_runs(vec![(text, RunFormat::default())]));
        self
    }

    /// The last section gets no header/footer references of its own.
    pub fn final_section_without_refs(mut self) -> Self {
        self.final_refs = false;
        self
    }

    /// Leave an entry out of the written package.
    pub fn without_entry(mut self, name: &str) -> Self {
        self.skipped.push(name.to_string());
        self
    }

    /// Write the package to `dir/name` and return its path.
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = ZipWriter::new(file);

        for (entry, content) in self.entries() {
            if self.skipped.iter().any(|s| *s == entry) {
                continue;
            }
            zip.start_file(entry, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    fn entries(&self) -> Vec<(String, String)> {
        let mut entries = vec![
            ("[Content_Types].xml".to_string(), self.content_types()),
            (
                "_rels/.rels".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#
                ),
            ),
            ("word/document.xml".to_string(), self.document_xml()),
            ("word/_rels/document.xml.rels".to_string(), self.document_rels()),
            (
                STYLES_PART.to_string(),
                format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="{W_NS}"/>"#),
            ),
        ];
        if let Some(runs) = &self.header {
            entries.push(("word/header1.xml".to_string(), story_xml("hdr", runs)));
        }
        if let Some(runs) = &self.footer {
            entries.push(("word/footer1.xml".to_string(), story_xml("ftr", runs)));
        }
        entries
    }

    fn content_types(&self) -> String {
        let mut overrides = String::from(
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        );
        if self.header.is_some() {
            overrides.push_str(r#"<Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#);
        }
        if self.footer.is_some() {
            overrides.push_str(r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#);
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{overrides}</Types>"#
        )
    }

    fn document_rels(&self) -> String {
        let mut rels = String::from(
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );
        if self.header.is_some() {
            rels.push_str(r#"<Relationship Id="rIdHeader1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>"#);
        }
        if self.footer.is_some() {
            rels.push_str(r#"<Relationship Id="rIdFooter1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#);
        }
        rels.push_str(r#"<Relationship Id="rIdLink" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>"#);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{REL_NS}">{rels}</Relationships>"#
        )
    }

    fn sect_pr(&self, with_refs: bool) -> String {
        let mut refs = String::new();
        if with_refs {
            if self.header.is_some() {
                refs.push_str(r#"<w:headerReference w:type="default" r:id="rIdHeader1"/>"#);
            }
            if self.footer.is_some() {
                refs.push_str(r#"<w:footerReference w:type="default" r:id="rIdFooter1"/>"#);
            }
        }
        format!(r#"<w:sectPr>{refs}<w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#)
    }

    fn document_xml(&self) -> String {
        let mut body = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(runs) => body.push_str(&paragraph_xml(runs)),
                Block::Table(rows) => {
                    body.push_str("<w:tbl><w:tblPr/>");
                    for row in rows {
                        body.push_str("<w:tr>");
                        for cell in row {
                            body.push_str("<w:tc><w:tcPr/>");
                            body.push_str(&paragraph_xml(&[(cell.clone(), RunFormat::default())]));
                            body.push_str("</w:tc>");
                        }
                        body.push_str("</w:tr>");
                    }
                    body.push_str("</w:tbl>");
                }
                Block::SectionBreak { with_refs } => {
                    body.push_str(&format!(
                        "<w:p><w:pPr>{}</w:pPr></w:p>",
                        self.sect_pr(*with_refs)
                    ));
                }
            }
        }
        body.push_str(&self.sect_pr(self.final_refs));

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>{body}</w:body></w:document>"#
        )
    }
}

fn owned_runs(runs: Vec<(&str, RunFormat)>) -> Vec<(String, RunFormat)> {
    runs.into_iter().map(|(t, f)| (t.to_string(), f)).collect()
}

fn story_xml(root: &str, runs: &[(String, RunFormat)]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{root} xmlns:w="{W_NS}" xmlns:r="{R_NS}">{}</w:{root}>"#,
        paragraph_xml(runs)
    )
}

fn paragraph_xml(runs: &[(String, RunFormat)]) -> String {
    let mut xml = String::from("<w:p>");
    for (text, format) in runs {
        xml.push_str("<w:r>");
        xml.push_str(&rpr_xml(format));
        xml.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape(text.as_str())
        ));
        xml.push_str("</w:r>");
    }
    xml.push_str("</w:p>");
    xml
}

fn rpr_xml(format: &RunFormat) -> String {
    if *format == RunFormat::default() {
        return String::new();
    }
    let mut xml = String::from("<w:rPr>");
    if let Some(font) = &format.font_name {
        xml.push_str(&format!(r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}"/>"#));
    }
    match format.bold {
        Some(true) => xml.push_str("<w:b/>"),
        Some(false) => xml.push_str(r#"<w:b w:val="0"/>"#),
        None => {}
    }
    match format.italic {
        Some(true) => xml.push_str("<w:i/>"),
        Some(false) => xml.push_str(r#"<w:i w:val="0"/>"#),
        None => {}
    }
    if let Some(size) = format.size_half_points {
        xml.push_str(&format!(r#"<w:sz w:val="{size}"/>"#));
    }
    xml.push_str("</w:rPr>");
    xml
}
