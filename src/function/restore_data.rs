use async_trait::async_trait;
use tracing::debug;

use super::prepare_data::FUNCTION_LABEL;
use super::{arg, opt_arg, Args, ExecutionContext, Function, FunctionDescriptor};
use crate::error::{FunctionError, VolumeSourceConflict};
use crate::job::{run_job, JobRequest};
use crate::location::RestoreCommandBuilder;
use crate::param::{resolve_volumes, TemplateParams, VolumeMounts};

pub const NAMESPACE_ARG: &str = "namespace";
pub const IMAGE_ARG: &str = "image";
pub const BACKUP_ARTIFACT_ARG: &str = "backupArtifact";
pub const RESTORE_PATH_ARG: &str = "restorePath";
pub const POD_ARG: &str = "pod";
pub const VOLUMES_ARG: &str = "volumes";

/// Pulls a backup artifact from the profile's location and unpacks it onto
/// the volumes of a pod, or onto explicitly named claims
pub struct RestoreData;

/// Accepts exactly one of a non-empty `pod` or a non-empty `volumes` map
pub fn validate_volume_source(pod: &str, volumes: &VolumeMounts) -> Result<(), FunctionError> {
    match (pod.is_empty(), volumes.is_empty()) {
        (false, true) | (true, false) => Ok(()),
        (true, true) => Err(FunctionError::AmbiguousVolumeSource {
            conflict: VolumeSourceConflict::Neither,
        }),
        (false, false) => Err(FunctionError::AmbiguousVolumeSource {
            conflict: VolumeSourceConflict::Both,
        }),
    }
}

#[async_trait]
impl Function for RestoreData {
    fn name(&self) -> &str {
        "RestoreData"
    }

    fn descriptor(&self) -> FunctionDescriptor {
        FunctionDescriptor::new(self.name())
            .required(&[NAMESPACE_ARG, IMAGE_ARG, BACKUP_ARTIFACT_ARG, RESTORE_PATH_ARG])
            .optional(&[POD_ARG, VOLUMES_ARG])
    }

    fn description(&self) -> &str {
        "Restore a backup artifact onto the volumes of a pod or onto named claims"
    }

    #[tracing::instrument(skip_all, fields(function = "RestoreData"))]
    async fn exec(
        &self,
        ctx: &ExecutionContext,
        params: &TemplateParams,
        args: &Args,
    ) -> Result<(), FunctionError> {
        let namespace: String = arg(args, NAMESPACE_ARG)?;
        let image: String = arg(args, IMAGE_ARG)?;
        let backup_artifact: String = arg(args, BACKUP_ARTIFACT_ARG)?;
        let restore_path: String = arg(args, RESTORE_PATH_ARG)?;
        let pod: String = opt_arg(args, POD_ARG, String::new())?;
        let volumes: VolumeMounts = opt_arg(args, VOLUMES_ARG, VolumeMounts::new())?;

        validate_volume_source(&pod, &volumes)?;

        let profile = params.profile.as_ref().ok_or(FunctionError::MissingProfile)?;
        profile.validate()?;

        let command = RestoreCommandBuilder::new(&ctx.config().pull_tool).build(
            &backup_artifact,
            &restore_path,
            profile,
        )?;

        let volumes = if pod.is_empty() {
            volumes
        } else {
            let resolved = resolve_volumes(&pod, params.topology.as_ref())?;
            debug!("Pod {} mounts {} claim(s)", pod, resolved.len());
            resolved
        };

        let request = JobRequest::new(namespace, image)
            .command(command)
            .volumes(volumes)
            .label(FUNCTION_LABEL, "restore-data");

        run_job(ctx, request).await
    }
}
