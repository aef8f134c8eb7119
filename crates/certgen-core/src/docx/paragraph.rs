//! Paragraph and run views over `w:p` elements.

use serde::{Deserialize, Serialize};

use super::xml::{Element, XmlNode};

/// Character formatting carried over when a paragraph is rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFormat {
    /// Font family (`w:rFonts/@w:ascii`, falling back to `@w:hAnsi`).
    pub font_name: Option<String>,
    /// Font size in half-points (`w:sz/@w:val`).
    pub size_half_points: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl RunFormat {
    /// Read the formatting of a `w:r` element.
    pub fn from_run(run: &Element) -> Self {
        let Some(rpr) = run.child("rPr") else {
            return Self::default();
        };

        let font_name = rpr
            .child("rFonts")
            .and_then(|fonts| fonts.attr("ascii").or_else(|| fonts.attr("hAnsi")));
        let size_half_points = rpr
            .child("sz")
            .and_then(|sz| sz.attr("val"))
            .and_then(|v| v.trim().parse().ok());

        Self {
            font_name,
            size_half_points,
            bold: rpr.child("b").map(toggle_value),
            italic: rpr.child("i").map(toggle_value),
        }
    }

    /// Build a `w:rPr` element, or `None` when nothing is set.
    fn to_element(&self, prefix: &str) -> Option<Element> {
        if *self == Self::default() {
            return None;
        }

        let mut rpr = Element::new(format!("{prefix}rPr"));
        if let Some(font) = &self.font_name {
            rpr = rpr.with_child(
                Element::new(format!("{prefix}rFonts"))
                    .with_attr(format!("{prefix}ascii"), font)
                    .with_attr(format!("{prefix}hAnsi"), font),
            );
        }
        if let Some(bold) = self.bold {
            rpr = rpr.with_child(toggle_element(prefix, "b", bold));
        }
        if let Some(italic) = self.italic {
            rpr = rpr.with_child(toggle_element(prefix, "i", italic));
        }
        if let Some(size) = self.size_half_points {
            rpr = rpr.with_child(
                Element::new(format!("{prefix}sz")).with_attr(format!("{prefix}val"), &size.to_string()),
            );
        }
        Some(rpr)
    }
}

fn toggle_value(element: &Element) -> bool {
    !matches!(
        element.attr("val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

fn toggle_element(prefix: &str, local: &str, on: bool) -> Element {
    let element = Element::new(format!("{prefix}{local}"));
    if on {
        element
    } else {
        element.with_attr(format!("{prefix}val"), "0")
    }
}

/// Mutable view over a `w:p` element.
pub struct Paragraph<'a> {
    element: &'a mut Element,
}

impl<'a> Paragraph<'a> {
    pub fn new(element: &'a mut Element) -> Self {
        Self { element }
    }

    /// Runs in document order, including runs wrapped in hyperlinks.
    pub fn runs(&self) -> Vec<&Element> {
        let mut runs = Vec::new();
        for child in self.element.elements() {
            match child.local_name() {
                "r" => runs.push(child),
                "hyperlink" => runs.extend(child.elements().filter(|e| e.local_name() == "r")),
                _ => {}
            }
        }
        runs
    }

    /// Plain text of all runs.
    pub fn text(&self) -> String {
        self.runs().into_iter().map(run_text).collect()
    }

    /// Formatting of the first run, if there is one.
    pub fn first_run_format(&self) -> Option<RunFormat> {
        self.runs().first().map(|run| RunFormat::from_run(run))
    }

    /// Remove all content except paragraph properties.
    pub fn clear(&mut self) {
        self.element.children.retain(|node| match node {
            XmlNode::Element(e) => e.local_name() == "pPr",
            _ => false,
        });
    }

    /// Append a run holding `text` with the given formatting.
    ///
    /// Tabs and line breaks become `w:tab` and `w:br`.
    pub fn add_run(&mut self, text: &str, format: &RunFormat) {
        let prefix = self.element.prefix().to_string();
        let mut run = Element::new(format!("{prefix}r"));
        if let Some(rpr) = format.to_element(&prefix) {
            run = run.with_child(rpr);
        }

        let mut segment = String::new();
        for c in text.chars() {
            match c {
                '\t' | '\n' | '\r' => {
                    push_text_segment(&mut run, &prefix, &mut segment);
                    let local = if c == '\t' { "tab" } else { "br" };
                    run = run.with_child(Element::new(format!("{prefix}{local}")));
                }
                _ => segment.push(c),
            }
        }
        push_text_segment(&mut run, &prefix, &mut segment);

        self.element.children.push(XmlNode::Element(run));
    }
}

fn push_text_segment(run: &mut Element, prefix: &str, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    let mut t = Element::new(format!("{prefix}t")).with_attr("xml:space", "preserve");
    t.push_text(segment);
    run.children.push(XmlNode::Element(t));
    segment.clear();
}

/// Plain text of a single run.
pub fn run_text(run: &Element) -> String {
    let mut out = String::new();
    for child in run.elements() {
        match child.local_name() {
            "t" => out.push_str(&child.text()),
            "tab" | "ptab" => out.push('\t'),
            "cr" => out.push('\n'),
            "br" => {
                let kind = child.attr("type");
                if matches!(kind.as_deref(), None | Some("textWrapping")) {
                    out.push('\n');
                }
            }
            "noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
    out
}
