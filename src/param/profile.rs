//! Location profile describing the object store that holds backups

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FunctionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationType {
    S3Compliant,
    Gcs,
    Azure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: LocationType,
    pub bucket: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Credential {
    KeyPair { id: String, secret: String },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::KeyPair { id, .. } => f
                .debug_struct("KeyPair")
                .field("id", id)
                .field("secret", &"<redacted>")
                .finish(),
        }
    }
}

/// Opaque to the engine apart from validation; serialized as-is into the
/// restore pipeline for the in-job pull tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub location: Location,
    pub credential: Credential,
    #[serde(default, rename = "skipSSLVerify")]
    pub skip_ssl_verify: bool,
}

impl Profile {
    pub fn validate(&self) -> Result<(), FunctionError> {
        if self.location.bucket.trim().is_empty() {
            return Err(FunctionError::invalid_profile("location bucket is empty"));
        }
        match &self.credential {
            Credential::KeyPair { id, secret } => {
                if id.is_empty() || secret.is_empty() {
                    return Err(FunctionError::invalid_profile(
                        "key pair credential is incomplete",
                    ));
                }
            }
        }
        Ok(())
    }
}
