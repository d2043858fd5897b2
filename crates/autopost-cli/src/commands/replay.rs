//! Replay command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;

use autopost_core::{Change, ReplicationReport, Replicator, SaveEvent, Settings, SiteReport};
use autopost_host::{DocId, NetworkSnapshot, SiteId};
use autopost_meta::PolicyTable;

use crate::error::{CliError, Result};

/// Arguments of the replay command
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub network: PathBuf,
    pub policy: PathBuf,
    pub overrides: Option<PathBuf>,
    pub site: u64,
    pub document: u64,
    pub fields_event: bool,
    pub write: bool,
    pub json: bool,
}

/// Run the replay command.
///
/// Exits with failure when any site reported an error, even though the
/// replication itself ran to completion.
pub fn run_replay(options: &ReplayOptions) -> Result<ExitCode> {
    let mut snapshot = NetworkSnapshot::load(&options.network)?;
    let mut settings = Settings::load(&options.policy)?;
    if let Some(path) = &options.overrides {
        settings.policy.merge(&PolicyTable::load(path)?);
        settings.policy.validate()?;
    }

    let site = SiteId(options.site);
    let id = DocId(options.document);
    let document = snapshot
        .network
        .document(site, id)
        .cloned()
        .ok_or_else(|| CliError::user(format!("Document {} not found on site {}", id, site)))?;
    let event = SaveEvent::new(site, document);

    let mut replicator = Replicator::from_settings(settings);
    let NetworkSnapshot { network, registry } = &mut snapshot;
    let report = if options.fields_event {
        replicator.on_fields_saved(network, Some(registry), &event)
    } else {
        replicator.on_document_saved(network, Some(registry), &event)
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    for error in report.errors() {
        tracing::warn!("{}", error);
    }

    if options.write && !report.is_skipped() {
        snapshot.save(&options.network)?;
        if !options.json {
            println!();
            println!("{} Wrote {}", "=>".blue().bold(), options.network.display());
        }
    }

    Ok(if report.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &ReplicationReport) {
    println!(
        "{} Replicating document {} from site {}",
        "=>".blue().bold(),
        report.source_id.to_string().cyan(),
        report.source_site.to_string().cyan()
    );

    if let Some(reason) = &report.skipped {
        println!("   {} {}", "skipped:".yellow(), reason);
        return;
    }
    for warning in &report.warnings {
        println!("   {} {}", "warning:".yellow(), warning);
    }

    for site in &report.sites {
        print_site(site);
    }

    println!();
    let errors = report.errors();
    if errors.is_empty() {
        println!(
            "{} {} sites, {} copies created",
            "OK".green().bold(),
            report.sites.len(),
            report.created()
        );
    } else {
        println!("{} {} errors", "FAILED".red().bold(), errors.len());
    }
}

fn print_site(site: &SiteReport) {
    let target = match site.target_id {
        Some(id) if site.created => format!("created {}", id).green().to_string(),
        Some(id) => format!("copy {}", id),
        None => "no copy".dimmed().to_string(),
    };
    println!();
    println!("{} {} ({})", "Site".bold(), site.site.to_string().bold(), target);

    if let Some(reason) = &site.skipped {
        println!("   {} {}", "skipped:".yellow(), reason);
    }
    if let Some(error) = &site.error {
        println!("   {} {}", "error:".red(), error);
    }
    for outcome in &site.categories {
        let status = match (&outcome.error, outcome.change) {
            (Some(error), _) => format!("error: {}", error).red(),
            (None, Some(Change::Written)) => "written".green(),
            (None, Some(Change::Cleared)) => "cleared".yellow(),
            (None, Some(Change::Unchanged)) => "unchanged".dimmed(),
            (None, Some(Change::Unavailable)) => "unavailable".dimmed(),
            (None, None) => "-".dimmed(),
        };
        println!("   {:<16} {}", outcome.category.to_string(), status);
    }
    for error in &site.hook_errors {
        println!("   {} {}", "hook:".red(), error);
    }
}
