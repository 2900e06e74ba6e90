use async_trait::async_trait;

use super::{arg, opt_arg, Args, ExecutionContext, Function, FunctionDescriptor};
use crate::error::FunctionError;
use crate::job::{run_job, JobRequest};
use crate::param::{TemplateParams, VolumeMounts};

pub const NAMESPACE_ARG: &str = "namespace";
pub const IMAGE_ARG: &str = "image";
pub const COMMAND_ARG: &str = "command";
pub const VOLUMES_ARG: &str = "volumes";
pub const SERVICE_ACCOUNT_ARG: &str = "serviceaccount";

pub const FUNCTION_LABEL: &str = "datamover.io/function";

/// Runs an arbitrary command in a job with the given claims mounted
pub struct PrepareData;

#[async_trait]
impl Function for PrepareData {
    fn name(&self) -> &str {
        "PrepareData"
    }

    fn descriptor(&self) -> FunctionDescriptor {
        FunctionDescriptor::new(self.name())
            .required(&[NAMESPACE_ARG, IMAGE_ARG, COMMAND_ARG, VOLUMES_ARG])
            .optional(&[SERVICE_ACCOUNT_ARG])
    }

    fn description(&self) -> &str {
        "Run a command in a one-off job with persistent volume claims mounted"
    }

    #[tracing::instrument(skip_all, fields(function = "PrepareData"))]
    async fn exec(
        &self,
        ctx: &ExecutionContext,
        _params: &TemplateParams,
        args: &Args,
    ) -> Result<(), FunctionError> {
        let namespace: String = arg(args, NAMESPACE_ARG)?;
        let image: String = arg(args, IMAGE_ARG)?;
        let command: Vec<String> = arg(args, COMMAND_ARG)?;
        let volumes: VolumeMounts = arg(args, VOLUMES_ARG)?;
        let service_account: String = opt_arg(args, SERVICE_ACCOUNT_ARG, String::new())?;

        let request = JobRequest::new(namespace, image)
            .command(command)
            .volumes(volumes)
            .service_account(Some(service_account))
            .label(FUNCTION_LABEL, "prepare-data");

        run_job(ctx, request).await
    }
}
