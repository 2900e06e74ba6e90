//! Workload topologies and pod volume resolution

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::VolumeMounts;
use crate::error::FunctionError;

/// Replicas sharing one pod template; claims are keyed by pod name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentParams {
    pub name: String,
    pub namespace: String,
    pub pods: Vec<String>,
    pub containers: Vec<Vec<String>>,
    pub persistent_volume_claims: HashMap<String, VolumeMounts>,
}

/// Ordered replicas; `persistent_volume_claims[i]` belongs to `pods[i]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatefulSetParams {
    pub name: String,
    pub namespace: String,
    pub pods: Vec<String>,
    pub containers: Vec<Vec<String>>,
    pub persistent_volume_claims: Vec<VolumeMounts>,
}

/// Workload shape, tagged by `kind` (`deployment` or `statefulSet`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Topology {
    Deployment(DeploymentParams),
    StatefulSet(StatefulSetParams),
}

impl Topology {
    /// Returns the claim-to-mount-path mapping of `pod`.
    ///
    /// StatefulSet pods are paired with claim mappings by position. A pod
    /// without a mapping at its index is reported as not found rather than
    /// as having no volumes.
    pub fn pod_volumes(&self, pod: &str) -> Result<VolumeMounts, FunctionError> {
        match self {
            Topology::Deployment(deployment) => deployment
                .persistent_volume_claims
                .get(pod)
                .cloned()
                .ok_or_else(|| FunctionError::pod_volumes_not_found(pod)),
            Topology::StatefulSet(stateful_set) => stateful_set
                .pods
                .iter()
                .position(|p| p == pod)
                .and_then(|index| stateful_set.persistent_volume_claims.get(index))
                .cloned()
                .ok_or_else(|| FunctionError::pod_volumes_not_found(pod)),
        }
    }

    pub fn pods(&self) -> &[String] {
        match self {
            Topology::Deployment(deployment) => &deployment.pods,
            Topology::StatefulSet(stateful_set) => &stateful_set.pods,
        }
    }
}

/// Resolves the volumes of `pod` from an optional topology
pub fn resolve_volumes(
    pod: &str,
    topology: Option<&Topology>,
) -> Result<VolumeMounts, FunctionError> {
    match topology {
        Some(topology) => topology.pod_volumes(pod),
        None => Err(FunctionError::InvalidTopology),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounts(pairs: &[(&str, &str)]) -> VolumeMounts {
        pairs
            .iter()
            .map(|(claim, path)| (claim.to_string(), path.to_string()))
            .collect()
    }

    fn deployment(claims: &[(&str, VolumeMounts)]) -> Topology {
        Topology::Deployment(DeploymentParams {
            name: "test-deployment".to_string(),
            namespace: "test-namespace".to_string(),
            pods: vec!["pod1".to_string(), "pod2".to_string()],
            containers: vec![vec!["test-container".to_string()]],
            persistent_volume_claims: claims
                .iter()
                .map(|(pod, m)| (pod.to_string(), m.clone()))
                .collect(),
        })
    }

    fn stateful_set(claims: Vec<VolumeMounts>) -> Topology {
        Topology::StatefulSet(StatefulSetParams {
            name: "test-ss".to_string(),
            namespace: "test-namespace".to_string(),
            pods: vec!["pod1".to_string(), "pod2".to_string(), "pod3".to_string()],
            containers: vec![vec!["test-container".to_string()]],
            persistent_volume_claims: claims,
        })
    }

    #[test]
    fn test_deployment_pod_resolves_its_claims() {
        let topology = deployment(&[
            ("pod1", mounts(&[("pvc1", "path1")])),
            ("pod2", mounts(&[("pvc2", "path2")])),
        ]);

        assert_eq!(
            resolve_volumes("pod1", Some(&topology)).unwrap(),
            mounts(&[("pvc1", "path1")])
        );
        assert_eq!(
            resolve_volumes("pod2", Some(&topology)).unwrap(),
            mounts(&[("pvc2", "path2")])
        );
    }

    #[test]
    fn test_deployment_unknown_pod() {
        let topology = deployment(&[("pod1", mounts(&[("pvc1", "path1")]))]);

        let err = resolve_volumes("pod3", Some(&topology)).unwrap_err();
        assert!(matches!(err, FunctionError::PodVolumesNotFound { pod } if pod == "pod3"));
    }

    #[test]
    fn test_deployment_listed_pod_without_claims() {
        // pod2 is listed in pods but has no claim entry
        let topology = deployment(&[("pod1", mounts(&[("pvc1", "path1")]))]);

        let err = resolve_volumes("pod2", Some(&topology)).unwrap_err();
        assert!(matches!(err, FunctionError::PodVolumesNotFound { .. }));
    }

    #[test]
    fn test_stateful_set_pairs_by_position() {
        let topology = stateful_set(vec![
            mounts(&[("pvc1", "path1")]),
            mounts(&[("pvc2", "path2"), ("pvc3", "path3")]),
        ]);

        assert_eq!(
            topology.pod_volumes("pod1").unwrap(),
            mounts(&[("pvc1", "path1")])
        );
        assert_eq!(
            topology.pod_volumes("pod2").unwrap(),
            mounts(&[("pvc2", "path2"), ("pvc3", "path3")])
        );
    }

    #[test]
    fn test_stateful_set_index_beyond_claims() {
        // Three pods, two claim mappings: pod3 is a partial topology
        let topology = stateful_set(vec![
            mounts(&[("pvc1", "path1")]),
            mounts(&[("pvc2", "path2")]),
        ]);

        let err = topology.pod_volumes("pod3").unwrap_err();
        assert!(matches!(err, FunctionError::PodVolumesNotFound { pod } if pod == "pod3"));
    }

    #[test]
    fn test_stateful_set_unknown_pod() {
        let topology = stateful_set(vec![mounts(&[("pvc1", "path1")])]);

        let err = topology.pod_volumes("pod4").unwrap_err();
        assert!(matches!(err, FunctionError::PodVolumesNotFound { .. }));
    }

    #[test]
    fn test_missing_topology() {
        let err = resolve_volumes("pod1", None).unwrap_err();
        assert!(matches!(err, FunctionError::InvalidTopology));
    }

    #[test]
    fn test_topology_serde_shape() {
        let yaml = r#"
kind: statefulSet
name: cassandra
pods: [cassandra-0, cassandra-1]
persistentVolumeClaims:
  - data-cassandra-0: /var/lib/cassandra
"#;
        let topology: Topology = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(topology.pods().len(), 2);
        assert_eq!(
            topology.pod_volumes("cassandra-0").unwrap(),
            mounts(&[("data-cassandra-0", "/var/lib/cassandra")])
        );
        assert!(topology.pod_volumes("cassandra-1").is_err());
    }
}
