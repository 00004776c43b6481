//! Hobby projects from `hobbies.json`, kept in authored order.

use std::path::Path;

use crate::loader::{self, LoadError};
use crate::types::HobbyProject;

pub fn load_projects(data_dir: &Path) -> Result<Vec<HobbyProject>, LoadError> {
    let projects: Vec<HobbyProject> =
        loader::load_optional_json_list(&data_dir.join("hobbies.json"))?;
    let active = projects.iter().filter(|p| p.is_active()).count();
    spdlog::info!("Loaded {} hobby projects ({} active)", projects.len(), active);
    Ok(projects)
}

/// Active projects first, then recent ones, then the rest; authored order
/// within each group.
pub fn grouped(projects: &[HobbyProject]) -> Vec<&HobbyProject> {
    let mut out: Vec<&HobbyProject> = projects.iter().filter(|p| p.is_active()).collect();
    out.extend(projects.iter().filter(|p| !p.is_active() && p.is_recent()));
    out.extend(projects.iter().filter(|p| !p.is_active() && !p.is_recent()));
    out
}
