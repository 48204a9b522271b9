//! `checks` command: print the catalog

use crate::checks::all_checks;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CatalogEntry {
    id: &'static str,
    category: &'static str,
    description: &'static str,
}

fn catalog() -> Vec<CatalogEntry> {
    all_checks()
        .iter()
        .map(|c| CatalogEntry {
            id: c.id(),
            category: c.category().as_str(),
            description: c.description(),
        })
        .collect()
}

fn render(format: &str) -> Result<String> {
    let entries = catalog();
    if format == "json" {
        return Ok(serde_json::to_string_pretty(&entries)?);
    }
    let mut out = String::new();
    for entry in &entries {
        out.push_str(&format!(
            "{:<10} {:<18} {}\n",
            entry.id, entry.category, entry.description
        ));
    }
    out.push_str(&format!("\n{} checks\n", entries.len()));
    Ok(out)
}

pub(super) fn run(format: &str) -> Result<()> {
    print!("{}", render(format)?);
    Ok(())
}
