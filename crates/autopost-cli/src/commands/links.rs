//! Links command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use autopost_host::{DocId, EntityKind, NetworkSnapshot, RelationRegistry, SiteId};

use crate::error::{CliError, Result};

/// One linked copy as shown to the user
#[derive(Debug, Serialize)]
struct LinkedCopy {
    site: SiteId,
    site_name: String,
    id: DocId,
    title: Option<String>,
    status: Option<String>,
}

/// Run the links command
pub fn run_links(network: &Path, site: u64, document: u64, json: bool) -> Result<()> {
    let snapshot = NetworkSnapshot::load(network)?;
    let site = SiteId(site);
    let id = DocId(document);

    if snapshot.network.document(site, id).is_none() {
        return Err(CliError::user(format!(
            "Document {} not found on site {}",
            id, site
        )));
    }

    let links = snapshot.registry.links(site, id, EntityKind::Post)?;
    let copies: Vec<LinkedCopy> = links
        .iter()
        .filter(|(linked_site, _)| *linked_site != site)
        .map(|(linked_site, linked_id)| {
            let doc = snapshot.network.document(linked_site, linked_id);
            LinkedCopy {
                site: linked_site,
                site_name: snapshot
                    .network
                    .site(linked_site)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                id: linked_id,
                title: doc.map(|d| d.title.clone()),
                status: doc.map(|d| d.status.to_string()),
            }
        })
        .collect();

    if json {
        let output = serde_json::json!({
            "site": site,
            "document": id,
            "copies": copies,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} Copies of document {} on site {}",
        "=>".blue().bold(),
        id.to_string().cyan(),
        site.to_string().cyan()
    );
    if copies.is_empty() {
        println!("   {}", "None".dimmed());
        return Ok(());
    }
    for copy in &copies {
        let title = match &copy.title {
            Some(title) => format!("\"{}\" [{}]", title, copy.status.as_deref().unwrap_or("")),
            None => "missing".red().to_string(),
        };
        println!(
            "   {} site {} ({}): {} {}",
            "+".green(),
            copy.site,
            copy.site_name,
            copy.id.to_string().cyan(),
            title
        );
    }
    Ok(())
}
