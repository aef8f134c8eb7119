//! Report which markers a template contains, and where.

use crate::docx::{Document, RegionLocation};
use crate::error::DocxError;

const EXCERPT_CHARS: usize = 50;

/// One marker occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHit {
    pub marker: String,
    pub location: RegionLocation,
    /// Start of the region's text.
    pub excerpt: String,
    /// Text of each run, showing how the marker is split.
    pub runs: Vec<String>,
}

/// Result of scanning a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateReport {
    pub regions: usize,
    pub hits: Vec<MarkerHit>,
}

impl TemplateReport {
    /// Markers that occur at least once, in first-seen order.
    pub fn found_markers(&self) -> Vec<&str> {
        let mut found: Vec<&str> = Vec::new();
        for hit in &self.hits {
            if !found.contains(&hit.marker.as_str()) {
                found.push(&hit.marker);
            }
        }
        found
    }

    /// Markers from `markers` that never occur.
    pub fn missing<'a>(&self, markers: &[&'a str]) -> Vec<&'a str> {
        markers
            .iter()
            .copied()
            .filter(|m| !self.hits.iter().any(|hit| hit.marker == *m))
            .collect()
    }
}

/// Scan every region of `document` for `markers`. The document is not modified.
pub fn inspect_template(
    document: &mut Document,
    markers: &[&str],
) -> Result<TemplateReport, DocxError> {
    let mut report = TemplateReport::default();

    document.for_each_region(|location, paragraph| {
        report.regions += 1;
        let text = paragraph.text();
        for marker in markers.iter().filter(|m| text.contains(**m)) {
            report.hits.push(MarkerHit {
                marker: marker.to_string(),
                location,
                excerpt: text.chars().take(EXCERPT_CHARS).collect(),
                runs: paragraph.runs().into_iter().map(crate::docx::run_text).collect(),
            });
        }
    })?;

    Ok(report)
}
