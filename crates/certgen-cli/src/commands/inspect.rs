//! Inspect command - list the markers found in a template.

use std::path::PathBuf;

use clap::Args;
use console::style;

use certgen_core::CertgenConfig;
use certgen_core::generator::inspect_file;
use certgen_core::substitution::TemplateProfile;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Template to scan (default: the configured template)
    template: Option<PathBuf>,
}

pub fn run(args: InspectArgs, config: CertgenConfig) -> anyhow::Result<()> {
    let path = args.template.unwrap_or_else(|| config.template.path.clone());
    let profile = TemplateProfile::for_template(&config.template)?;

    let report = inspect_file(&path, &profile)?;
    tracing::info!("Inspected {}: {} hits", path.display(), report.hits.len());

    println!(
        "{} {} ({} regions, profile {})",
        style("Template").bold(),
        path.display(),
        report.regions,
        profile.id
    );

    if report.hits.is_empty() {
        println!("{} No known markers found.", style("!").yellow());
    }
    for hit in &report.hits {
        println!(
            "  {} {} in {}: {}",
            style("✓").green(),
            style(&hit.marker).cyan(),
            hit.location,
            hit.excerpt
        );
    }

    let all = profile.all_markers();
    let found = report.found_markers();
    let missing = report.missing(&all);
    println!(
        "\n{} of {} markers present",
        style(found.len()).bold(),
        all.len()
    );
    if !missing.is_empty() && !report.hits.is_empty() {
        println!("{}", style("Not present:").dim());
        for marker in missing {
            println!("  {}", style(marker).dim());
        }
    }

    Ok(())
}
