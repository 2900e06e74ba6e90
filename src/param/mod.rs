//! Ambient template parameters handed to every function invocation
//!
//! Template params describe the workload a function acts on (its topology) and
//! where backups live (the location profile). Both are read-only inputs.

pub mod profile;
pub mod topology;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use profile::{Credential, Location, LocationType, Profile};
pub use topology::{resolve_volumes, DeploymentParams, StatefulSetParams, Topology};

/// Volume claim name to in-container mount path
pub type VolumeMounts = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<Topology>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl TemplateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }
}
