use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills_needed: String,
}

impl Project {
    fn new(id: &str, name: &str, description: &str, skills_needed: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            skills_needed: skills_needed.to_string(),
        }
    }
}

pub fn default_catalog() -> Vec<Project> {
    vec![
        Project::new(
            "1",
            "Space Apps DAO",
            "Building apps for space exploration",
            "React, Design, AI",
        ),
        Project::new(
            "2",
            "Art Collective",
            "Digital art marketplace",
            "Design, Marketing",
        ),
        Project::new(
            "3",
            "Climate Action",
            "Environmental sustainability projects",
            "Data Science, Research",
        ),
        Project::new(
            "4",
            "Education DAO",
            "Decentralized learning platform",
            "Teaching, Development",
        ),
    ]
}
