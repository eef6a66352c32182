//! `geoup projects` – list accessible projects.

use anyhow::Result;
use geoup_core::api::ApiClient;
use geoup_core::model::ProjectList;

pub fn run_projects(client: &ApiClient) -> Result<()> {
    let response = client.get("projects", &[])?;
    let list: ProjectList = serde_json::from_value(response)?;
    if list.projects.is_empty() {
        println!("No accessible projects.");
    } else {
        for project in list.projects {
            println!("{} ({})", project.id, project.name);
        }
    }
    Ok(())
}
