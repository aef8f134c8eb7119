//! Loaded .docx document exposing its text regions.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use tracing::{debug, trace};

use super::package::Package;
use super::paragraph::Paragraph;
use super::xml::{Element, XmlPart};
use crate::error::DocxError;

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// Where a region sits in the document. Indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionLocation {
    Body {
        paragraph: usize,
    },
    TableCell {
        table: usize,
        row: usize,
        cell: usize,
        paragraph: usize,
    },
    Header {
        section: usize,
        paragraph: usize,
    },
    Footer {
        section: usize,
        paragraph: usize,
    },
}

impl fmt::Display for RegionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body { paragraph } => write!(f, "body paragraph {}", paragraph + 1),
            Self::TableCell {
                table,
                row,
                cell,
                paragraph,
            } => write!(
                f,
                "table {} row {} cell {} paragraph {}",
                table + 1,
                row + 1,
                cell + 1,
                paragraph + 1
            ),
            Self::Header { section, paragraph } => {
                write!(f, "header of section {} paragraph {}", section + 1, paragraph + 1)
            }
            Self::Footer { section, paragraph } => {
                write!(f, "footer of section {} paragraph {}", section + 1, paragraph + 1)
            }
        }
    }
}

/// Header and footer parts in effect for one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionParts {
    pub header: Option<String>,
    pub footer: Option<String>,
}

/// A .docx document loaded into memory.
///
/// The main part is parsed on open; header and footer parts are parsed the
/// first time regions are visited.
pub struct Document {
    package: Package,
    main: XmlPart,
    /// Relationship id -> part name, for the main part.
    relationships: HashMap<String, String>,
    /// Parsed header/footer parts by part name.
    parts: HashMap<String, XmlPart>,
}

impl Document {
    /// Load a document from disk. The file is only read.
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        Self::from_package(Package::open(path)?)
    }

    /// Build a document from an already loaded package.
    pub fn from_package(package: Package) -> Result<Self, DocxError> {
        let main_name = main_part_name(&package)?;
        let main_data = package
            .get(&main_name)
            .ok_or_else(|| DocxError::MissingPart(main_name.clone()))?;
        let main = XmlPart::parse(&main_name, main_data)?;

        let relationships = match package.get(&rels_path_for(&main_name)) {
            Some(data) => parse_relationships(&rels_path_for(&main_name), data, &main_name)?
                .into_iter()
                .map(|rel| (rel.id, rel.target))
                .collect(),
            None => HashMap::new(),
        };
        debug!(
            "Opened {} with {} relationships",
            main_name,
            relationships.len()
        );

        Ok(Self {
            package,
            main,
            relationships,
            parts: HashMap::new(),
        })
    }

    /// Header/footer parts per section, in document order.
    ///
    /// Only default-type references count. A section without its own
    /// reference inherits the previous section's part.
    pub fn sections(&self) -> Vec<SectionParts> {
        let Some(body) = self.main.root.child("body") else {
            return Vec::new();
        };

        let mut sect_prs: Vec<&Element> = Vec::new();
        for child in body.elements() {
            match child.local_name() {
                "p" => {
                    if let Some(sect_pr) = child.child("pPr").and_then(|ppr| ppr.child("sectPr")) {
                        sect_prs.push(sect_pr);
                    }
                }
                "sectPr" => sect_prs.push(child),
                _ => {}
            }
        }

        let mut sections = Vec::with_capacity(sect_prs.len());
        let mut previous = SectionParts::default();
        for sect_pr in sect_prs {
            let current = SectionParts {
                header: self
                    .default_reference(sect_pr, "headerReference")
                    .or_else(|| previous.header.clone()),
                footer: self
                    .default_reference(sect_pr, "footerReference")
                    .or_else(|| previous.footer.clone()),
            };
            sections.push(current.clone());
            previous = current;
        }
        sections
    }

    fn default_reference(&self, sect_pr: &Element, local: &str) -> Option<String> {
        sect_pr
            .elements()
            .filter(|e| e.local_name() == local)
            .find(|e| matches!(e.attr("type").as_deref(), None | Some("default")))
            .and_then(|e| e.attr("id"))
            .and_then(|id| self.relationships.get(&id).cloned())
    }

    /// Visit every region: body paragraphs, then table cell paragraphs,
    /// then header paragraphs per section, then footer paragraphs per section.
    ///
    /// A header or footer part shared by several sections is visited once.
    pub fn for_each_region<F>(&mut self, mut visit: F) -> Result<(), DocxError>
    where
        F: FnMut(RegionLocation, &mut Paragraph<'_>),
    {
        let sections = self.sections();
        self.load_parts(&sections)?;

        if let Some(body) = self.main.root.child_mut("body") {
            let paragraphs = body.elements_mut().filter(|e| e.local_name() == "p");
            for (paragraph, element) in paragraphs.enumerate() {
                visit(RegionLocation::Body { paragraph }, &mut Paragraph::new(element));
            }

            let tables = body.elements_mut().filter(|e| e.local_name() == "tbl");
            for (table, tbl) in tables.enumerate() {
                let rows = tbl.elements_mut().filter(|e| e.local_name() == "tr");
                for (row, tr) in rows.enumerate() {
                    let cells = tr.elements_mut().filter(|e| e.local_name() == "tc");
                    for (cell, tc) in cells.enumerate() {
                        let paragraphs = tc.elements_mut().filter(|e| e.local_name() == "p");
                        for (paragraph, element) in paragraphs.enumerate() {
                            let location = RegionLocation::TableCell {
                                table,
                                row,
                                cell,
                                paragraph,
                            };
                            visit(location, &mut Paragraph::new(element));
                        }
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        for (section, parts) in sections.iter().enumerate() {
            let Some(name) = &parts.header else { continue };
            if !seen.insert(name.clone()) {
                continue;
            }
            self.visit_part(name, &mut |paragraph: usize, element: &mut Paragraph<'_>| {
                visit(RegionLocation::Header { section, paragraph }, element)
            });
        }

        for (section, parts) in sections.iter().enumerate() {
            let Some(name) = &parts.footer else { continue };
            if !seen.insert(name.clone()) {
                continue;
            }
            self.visit_part(name, &mut |paragraph: usize, element: &mut Paragraph<'_>| {
                visit(RegionLocation::Footer { section, paragraph }, element)
            });
        }

        Ok(())
    }

    fn visit_part(&mut self, name: &str, visit: &mut dyn FnMut(usize, &mut Paragraph<'_>)) {
        let Some(part) = self.parts.get_mut(name) else {
            return;
        };
        let paragraphs = part.root.elements_mut().filter(|e| e.local_name() == "p");
        for (index, element) in paragraphs.enumerate() {
            visit(index, &mut Paragraph::new(element));
        }
    }

    fn load_parts(&mut self, sections: &[SectionParts]) -> Result<(), DocxError> {
        let names = sections
            .iter()
            .flat_map(|s| s.header.iter().chain(s.footer.iter()));
        for name in names {
            if self.parts.contains_key(name) {
                continue;
            }
            let data = self
                .package
                .get(name)
                .ok_or_else(|| DocxError::MissingPart(name.clone()))?;
            let part = XmlPart::parse(name, data)?;
            trace!("Parsed {}", name);
            self.parts.insert(name.clone(), part);
        }
        Ok(())
    }

    /// Write the document, including any modified parts, to `path`.
    pub fn save(&mut self, path: &Path) -> Result<(), DocxError> {
        let main = self.main.to_bytes()?;
        self.package.set(&self.main.name, main);
        for part in self.parts.values() {
            self.package.set(&part.name, part.to_bytes()?);
        }
        self.package.save(path)
    }
}

struct Relationship {
    id: String,
    rel_type: String,
    /// Resolved part name.
    target: String,
}

fn main_part_name(package: &Package) -> Result<String, DocxError> {
    let Some(data) = package.get(PACKAGE_RELS) else {
        return Ok(DEFAULT_MAIN_PART.to_string());
    };
    let main = parse_relationships(PACKAGE_RELS, data, "")?
        .into_iter()
        .find(|rel| rel.rel_type.ends_with(OFFICE_DOCUMENT_REL))
        .map(|rel| rel.target)
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
    Ok(main)
}

/// Relationships of `source` (a part name, or "" for the package).
fn parse_relationships(
    rels_name: &str,
    data: &[u8],
    source: &str,
) -> Result<Vec<Relationship>, DocxError> {
    let part = XmlPart::parse(rels_name, data)?;
    let base = match source.rfind('/') {
        Some(i) => &source[..i],
        None => "",
    };

    let rels = part
        .root
        .elements()
        .filter(|e| e.local_name() == "Relationship")
        .filter(|e| e.attr("TargetMode").as_deref() != Some("External"))
        .filter_map(|e| {
            Some(Relationship {
                id: e.attr("Id")?,
                rel_type: e.attr("Type").unwrap_or_default(),
                target: resolve_target(base, &e.attr("Target")?),
            })
        })
        .collect();
    Ok(rels)
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`
fn rels_path_for(part: &str) -> String {
    match part.rfind('/') {
        Some(i) => format!("{}/_rels/{}.rels", &part[..i], &part[i + 1..]),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the source part's directory.
fn resolve_target(base: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
