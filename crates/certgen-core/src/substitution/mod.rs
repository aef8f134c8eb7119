//! Marker substitution over document regions.

pub mod inspect;
pub mod profile;
pub mod replacements;

pub use inspect::{MarkerHit, TemplateReport, inspect_template};
pub use profile::{FieldSource, MarkerEntry, TemplateProfile};
pub use replacements::ReplacementMap;

use tracing::{debug, trace};

use crate::docx::{Document, Paragraph, RunFormat};
use crate::error::DocxError;

/// A paragraph-shaped unit of formatted runs.
pub trait Region {
    fn run_count(&self) -> usize;

    /// Concatenated text of all runs.
    fn text(&self) -> String;

    fn first_run_format(&self) -> Option<RunFormat>;

    /// Drop all runs and write `text` as a single run.
    fn replace_runs(&mut self, text: &str, format: &RunFormat);
}

impl Region for Paragraph<'_> {
    fn run_count(&self) -> usize {
        self.runs().len()
    }

    fn text(&self) -> String {
        Paragraph::text(self)
    }

    fn first_run_format(&self) -> Option<RunFormat> {
        Paragraph::first_run_format(self)
    }

    fn replace_runs(&mut self, text: &str, format: &RunFormat) {
        self.clear();
        self.add_run(text, format);
    }
}

/// Replace markers in one region. Returns whether the region was rewritten.
///
/// Markers are matched against the text of all runs together, so a marker
/// split across runs is still found. The rewritten region is a single run
/// with the first run's font, size, bold and italic; any other formatting
/// inside the region is lost.
pub fn substitute<R: Region + ?Sized>(region: &mut R, replacements: &ReplacementMap) -> bool {
    if region.run_count() == 0 {
        return false;
    }

    let text = region.text();
    if !replacements.matches(&text) {
        return false;
    }

    let format = region.first_run_format().unwrap_or_default();
    let replaced = replacements.apply(&text);
    trace!("{:?} -> {:?}", text, replaced);
    region.replace_runs(&replaced, &format);
    true
}

/// Counts from one pass over a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    pub visited: usize,
    pub replaced: usize,
}

/// Substitute markers in every region of `document`, in traversal order.
pub fn apply_to_document(
    document: &mut Document,
    replacements: &ReplacementMap,
) -> Result<SubstitutionReport, DocxError> {
    let mut report = SubstitutionReport::default();

    document.for_each_region(|location, paragraph| {
        report.visited += 1;
        if substitute(paragraph, replacements) {
            report.replaced += 1;
            debug!("Replaced markers in {}: {}", location, Region::text(paragraph));
        }
    })?;

    debug!(
        "Substitution done: {} of {} regions replaced",
        report.replaced, report.visited
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::fixtures::DocxFixture;
    use pretty_assertions::assert_eq;

    /// In-memory region for exercising the engine without a document.
    #[derive(Debug, Default)]
    struct Runs(Vec<(String, RunFormat)>);

    impl Region for Runs {
        fn run_count(&self) -> usize {
            self.0.len()
        }

        fn text(&self) -> String {
            self.0.iter().map(|(t, _)| t.as_str()).collect()
        }

        fn first_run_format(&self) -> Option<RunFormat> {
            self.0.first().map(|(_, f)| f.clone())
        }

        fn replace_runs(&mut self, text: &str, format: &RunFormat) {
            self.0 = vec![(text.to_string(), format.clone())];
        }
    }

    fn bold_times() -> RunFormat {
        RunFormat {
            font_name: Some("Times New Roman".to_string()),
            size_half_points: Some(28),
            bold: Some(true),
            italic: Some(false),
        }
    }

    #[test]
    fn test_replaces_marker_and_keeps_first_run_format() {
        let mut region = Runs(vec![
            ("Hello ".to_string(), bold_times()),
            ("{{ input_fullname }}".to_string(), RunFormat::default()),
        ]);
        let map = ReplacementMap::from_pairs([("{{ input_fullname }}", "Ivan Petrov")]).unwrap();

        assert!(substitute(&mut region, &map));
        assert_eq!(region.0, vec![("Hello Ivan Petrov".to_string(), bold_times())]);
    }

    #[test]
    fn test_marker_split_across_runs() {
        let mut region = Runs(vec![
            ("{{ input_".to_string(), bold_times()),
            ("job }}".to_string(), RunFormat::default()),
        ]);
        let map = ReplacementMap::from_pairs([("{{ input_job }}", "инженер")]).unwrap();

        assert!(substitute(&mut region, &map));
        assert_eq!(region.text(), "инженер");
    }

    #[test]
    fn test_both_spellings_in_one_pass() {
        let mut region = Runs(vec![("{{input_job}} и {input_job}".to_string(), RunFormat::default())]);
        let map = ReplacementMap::from_pairs([
            ("{{input_job}}", "инженер"),
            ("{input_job}", "инженер"),
        ])
        .unwrap();

        assert!(substitute(&mut region, &map));
        assert_eq!(region.text(), "инженер и инженер");
    }

    #[test]
    fn test_no_marker_is_noop() {
        let runs = vec![
            ("plain ".to_string(), bold_times()),
            ("text".to_string(), RunFormat::default()),
        ];
        let mut region = Runs(runs.clone());
        let map = ReplacementMap::from_pairs([("{{ input_job }}", "x")]).unwrap();

        assert!(!substitute(&mut region, &map));
        assert_eq!(region.0, runs);
    }

    #[test]
    fn test_empty_region_is_noop() {
        let mut region = Runs::default();
        let map = ReplacementMap::from_pairs([("{{ input_job }}", "x")]).unwrap();

        assert!(!substitute(&mut region, &map));
        assert!(region.0.is_empty());
    }

    #[test]
    fn test_apply_to_document_covers_every_region_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = DocxFixture::new()
            .body_runs(vec![("Выдан ", bold_times()), ("{{ input_fullname }}", RunFormat::default())])
            .body_paragraph("без маркеров")
            .table(vec![vec!["{{ input_place }}", "{input_job}"]])
            .header("№ {{ input_proto }}")
            .footer("[input_proto]")
            .write(dir.path(), "template.docx");

        let map = ReplacementMap::from_pairs([
            ("{{ input_fullname }}", "Иванов Иван"),
            ("{{ input_place }}", "ООО Ромашка"),
            ("{input_job}", "инженер"),
            ("{{ input_proto }}", "PR-2024-0001"),
            ("[input_proto]", "PR-2024-0001"),
        ])
        .unwrap();

        let mut doc = Document::open(&path).unwrap();
        let report = apply_to_document(&mut doc, &map).unwrap();
        assert_eq!(report, SubstitutionReport { visited: 6, replaced: 5 });

        let out = dir.path().join("out.docx");
        doc.save(&out).unwrap();

        let mut reopened = Document::open(&out).unwrap();
        let mut regions = Vec::new();
        reopened
            .for_each_region(|_, p| regions.push((p.text(), p.runs().len(), p.first_run_format())))
            .unwrap();

        let texts: Vec<_> = regions.iter().map(|(t, _, _)| t.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Выдан Иванов Иван",
                "без маркеров",
                "ООО Ромашка",
                "инженер",
                "№ PR-2024-0001",
                "PR-2024-0001",
            ]
        );
        assert_eq!(regions[0].1, 1);
        assert_eq!(regions[0].2, Some(bold_times()));
    }
}
