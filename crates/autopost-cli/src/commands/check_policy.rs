//! Check-policy command implementation

use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;

use autopost_core::Settings;
use autopost_meta::FieldCategory;

use crate::error::Result;

/// Run the check-policy command.
///
/// Every issue is printed before the command fails.
pub fn run_check_policy(path: &Path) -> Result<ExitCode> {
    let settings: Settings = autopost_meta::load_file(path)?;
    let issues = autopost_meta::validate(&settings.policy);

    println!(
        "{} Checking {}",
        "=>".blue().bold(),
        path.display().to_string().cyan()
    );

    if !issues.is_empty() {
        for issue in &issues {
            println!("   {} {}", "x".red(), issue);
        }
        println!();
        println!("{} {} issues", "FAILED".red().bold(), issues.len());
        return Ok(ExitCode::FAILURE);
    }

    for (doc_type, policy) in &settings.policy.types {
        let initial: Vec<String> = FieldCategory::ALL
            .into_iter()
            .filter(|c| policy.applies(*c, true))
            .map(|c| c.to_string())
            .collect();
        let permanent: Vec<String> = FieldCategory::ALL
            .into_iter()
            .filter(|c| policy.applies(*c, false))
            .map(|c| c.to_string())
            .collect();
        println!(
            "   {} {} (new copies: {})",
            "+".green(),
            doc_type.bold(),
            policy.creation_status()
        );
        println!("     {}: {}", "on create".dimmed(), initial.join(", "));
        println!("     {}: {}", "on update".dimmed(), permanent.join(", "));
    }
    if !settings.hooks.is_empty() {
        println!("   {} hooks", settings.hooks.len());
    }

    println!();
    println!(
        "{} {} document types",
        "OK".green().bold(),
        settings.policy.types.len()
    );
    Ok(ExitCode::SUCCESS)
}
