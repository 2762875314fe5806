use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validate_utils::deserialize_null_default;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub user_alias: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub interests: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub skills: String,
}
