//! Common test utilities and helpers

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use datamover::cluster::MockClusterClient;
use datamover::function::{ArgValue, Args, ExecutionContext};
use datamover::param::{
    Credential, DeploymentParams, Location, LocationType, Profile, StatefulSetParams, Topology,
    VolumeMounts,
};

/// Builds an argument bag from key/value pairs
pub fn args(pairs: Vec<(&str, ArgValue)>) -> Args {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

pub fn mounts(pairs: &[(&str, &str)]) -> VolumeMounts {
    pairs
        .iter()
        .map(|(claim, path)| (claim.to_string(), path.to_string()))
        .collect()
}

pub fn context(mock: &MockClusterClient) -> ExecutionContext {
    ExecutionContext::new(Arc::new(mock.clone()))
}

pub fn profile() -> Profile {
    Profile {
        location: Location {
            kind: LocationType::S3Compliant,
            bucket: "backups".to_string(),
            endpoint: "https://minio.example:9000".to_string(),
            prefix: String::new(),
            region: "us-east-1".to_string(),
        },
        credential: Credential::KeyPair {
            id: "AKIAEXAMPLE".to_string(),
            secret: "secret-key".to_string(),
        },
        skip_ssl_verify: false,
    }
}

pub fn deployment(pods: &[&str], claims: &[(&str, VolumeMounts)]) -> Topology {
    Topology::Deployment(DeploymentParams {
        name: "web".to_string(),
        namespace: "apps".to_string(),
        pods: pods.iter().map(|p| p.to_string()).collect(),
        containers: vec![vec!["app".to_string()]],
        persistent_volume_claims: claims
            .iter()
            .map(|(pod, m)| (pod.to_string(), m.clone()))
            .collect(),
    })
}

pub fn stateful_set(pods: &[&str], claims: Vec<VolumeMounts>) -> Topology {
    Topology::StatefulSet(StatefulSetParams {
        name: "db".to_string(),
        namespace: "apps".to_string(),
        pods: pods.iter().map(|p| p.to_string()).collect(),
        containers: vec![vec!["db".to_string()]],
        persistent_volume_claims: claims,
    })
}

/// Polls until `mock` has seen `expected` deletions or a second has passed
pub async fn wait_for_deletes(mock: &MockClusterClient, expected: usize) {
    for _ in 0..200 {
        if mock.delete_calls() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
