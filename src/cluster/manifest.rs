//! Kubernetes Job manifest rendering

use serde_json::{json, Value};

use super::JobSpec;

pub const CONTAINER_NAME: &str = "container";

/// Renders a `batch/v1` Job that runs once and is never retried.
///
/// Each claim becomes a volume named after the claim, mounted at its path.
pub fn job_manifest(spec: &JobSpec) -> Value {
    let volumes: Vec<Value> = spec
        .volumes
        .keys()
        .map(|claim| {
            json!({
                "name": claim,
                "persistentVolumeClaim": { "claimName": claim },
            })
        })
        .collect();

    let volume_mounts: Vec<Value> = spec
        .volumes
        .iter()
        .map(|(claim, path)| json!({ "name": claim, "mountPath": path }))
        .collect();

    let mut pod_spec = json!({
        "restartPolicy": "Never",
        "containers": [{
            "name": CONTAINER_NAME,
            "image": spec.image,
            "imagePullPolicy": "IfNotPresent",
            "command": spec.command,
            "volumeMounts": volume_mounts,
        }],
        "volumes": volumes,
    });

    if let Some(service_account) = &spec.service_account {
        pod_spec["serviceAccountName"] = json!(service_account);
    }

    json!({
        "apiVersion": "batch/v1",
        "kind": "Job",
        "metadata": {
            "name": spec.name,
            "namespace": spec.namespace,
            "labels": spec.labels,
        },
        "spec": {
            "backoffLimit": 0,
            "template": {
                "metadata": { "labels": spec.labels },
                "spec": pod_spec,
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn spec(service_account: Option<&str>) -> JobSpec {
        JobSpec {
            name: "prepare-data-job-x7k2p".to_string(),
            namespace: "apps".to_string(),
            image: "busybox:1.36".to_string(),
            service_account: service_account.map(str::to_string),
            command: vec!["sh".to_string(), "-c".to_string(), "echo hi".to_string()],
            volumes: BTreeMap::from([
                ("data".to_string(), "/data".to_string()),
                ("logs".to_string(), "/var/log/app".to_string()),
            ]),
            labels: BTreeMap::from([("createdBy".to_string(), "datamover".to_string())]),
        }
    }

    #[test]
    fn test_manifest_mounts_each_claim() {
        let manifest = job_manifest(&spec(None));
        let pod = &manifest["spec"]["template"]["spec"];

        assert_eq!(manifest["kind"], "Job");
        assert_eq!(manifest["metadata"]["name"], "prepare-data-job-x7k2p");
        assert_eq!(manifest["spec"]["backoffLimit"], 0);
        assert_eq!(pod["restartPolicy"], "Never");
        assert_eq!(pod["volumes"][0]["persistentVolumeClaim"]["claimName"], "data");
        assert_eq!(pod["containers"][0]["volumeMounts"][1]["name"], "logs");
        assert_eq!(
            pod["containers"][0]["volumeMounts"][1]["mountPath"],
            "/var/log/app"
        );
        assert_eq!(pod["containers"][0]["command"][2], "echo hi");
        assert!(pod.get("serviceAccountName").is_none());
    }

    #[test]
    fn test_manifest_service_account() {
        let manifest = job_manifest(&spec(Some("restorer")));
        assert_eq!(
            manifest["spec"]["template"]["spec"]["serviceAccountName"],
            "restorer"
        );
        assert_eq!(
            manifest["spec"]["template"]["metadata"]["labels"]["createdBy"],
            "datamover"
        );
    }
}
