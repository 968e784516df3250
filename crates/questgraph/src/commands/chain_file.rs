//! Chain definition and catalog files.
//!
//! Both are TOML unless the extension is `.json`. A chain file holds
//! `[[quests]]` (`id`, `label`) and `[[prerequisites]]` (`from`, `to`)
//! tables; a catalog file holds a `quests` list of known ids.

use crate::cli::CliError;
use questgraph_chains::{ChainDefinition, InMemoryCatalog, QuestId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Known quest ids, as read from a catalog file.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    /// Quest ids present in the catalog.
    #[serde(default)]
    pub quests: Vec<QuestId>,
}

/// Load a chain definition.
///
/// # Errors
///
/// Returns [`CliError::Config`] if the file cannot be read or parsed.
pub fn load_definition(path: &Path) -> Result<ChainDefinition, CliError> {
    let definition: ChainDefinition = load(path, "chain definition")?;
    debug!(
        path = %path.display(),
        quests = definition.nodes.len(),
        prerequisites = definition.edges.len(),
        "Loaded chain definition"
    );
    Ok(definition)
}

/// Load a catalog file into an in-memory catalog.
///
/// # Errors
///
/// Returns [`CliError::Config`] if the file cannot be read or parsed.
pub fn load_catalog(path: &Path) -> Result<InMemoryCatalog, CliError> {
    let file: CatalogFile = load(path, "catalog")?;
    debug!(path = %path.display(), quests = file.quests.len(), "Loaded catalog");
    Ok(InMemoryCatalog::with_quests(file.quests))
}

/// Catalog to validate against: the given file, or the chain's own quests.
///
/// # Errors
///
/// Returns [`CliError::Config`] if the catalog file cannot be loaded.
pub fn catalog_for(
    definition: &ChainDefinition,
    catalog: Option<&Path>,
) -> Result<InMemoryCatalog, CliError> {
    match catalog {
        Some(path) => load_catalog(path),
        None => Ok(InMemoryCatalog::with_quests(
            definition.nodes.iter().map(|node| node.id.clone()),
        )),
    }
}

fn load<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::config_with_help(
            format!("Failed to read {what} file {}: {e}", path.display()),
            "Check that the path exists and is readable",
        )
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        toml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| {
        CliError::config_with_help(
            format!("Invalid {what} file {}: {message}", path.display()),
            "Files are TOML, or JSON when the extension is .json",
        )
    })
}
