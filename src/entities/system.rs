use serde::{Deserialize, Serialize};

/// Storage side of a system definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDefinition {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub root_dir: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub storage: StorageDefinition,
}

/// One entry of the systems list, keyed by the system id files refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemListEntry {
    pub system: String,
    #[serde(default)]
    pub definition: SystemDefinition,
}

/// Credentials for pushing the portal's public key onto an execution system.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PushKeysForm {
    pub hostname: String,
    pub password: String,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemsOperation {
    #[serde(rename = "pushKeys")]
    PushKeys,
}
