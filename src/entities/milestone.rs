use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const SELLER_FEE_BASIS_POINTS: u16 = 500;
/// Byte limit of an on-chain token metadata name.
pub const MAX_ON_CHAIN_NAME_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: String,
}

impl MetadataAttribute {
    fn new(trait_type: &str, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.into(),
        }
    }
}

/// Off-chain metadata document of a milestone NFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<MetadataAttribute>,
    #[serde(rename = "teamMembers")]
    pub team_members: Vec<String>,
}

impl MilestoneMetadata {
    pub fn new(project_name: &str, milestone: &str, team_members: &[String]) -> Self {
        Self {
            name: format!("{project_name} - {milestone}"),
            description: format!(
                "Milestone NFT for {project_name}. Team: {}",
                team_members.join(", ")
            ),
            image: placeholder_image(project_name),
            attributes: vec![
                MetadataAttribute::new("Project", project_name),
                MetadataAttribute::new("Milestone", milestone),
                MetadataAttribute::new("Team Size", team_members.len().to_string()),
            ],
            team_members: team_members.to_vec(),
        }
    }

    /// Content address of the document, stable for identical metadata.
    pub fn content_key(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        Sha256::digest(&bytes)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

pub fn placeholder_image(project_name: &str) -> String {
    format!(
        "https://api.dicebear.com/7.x/shapes/svg?seed={}",
        urlencoding::encode(project_name)
    )
}

pub fn on_chain_name(project_name: &str) -> String {
    let mut name = format!("{project_name} Milestone");
    if name.len() > MAX_ON_CHAIN_NAME_LEN {
        let mut end = MAX_ON_CHAIN_NAME_LEN;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}
