//! Restore pipeline construction
//!
//! A restore job streams a backup artifact out of the object store with the
//! pull tool, decompresses it and unpacks it into the target directory, all
//! inside one `bash` pipeline. `pipefail` makes a failure in any stage fail
//! the job.

use crate::error::FunctionError;
use crate::param::Profile;

pub const DEFAULT_PULL_TOOL: &str = "kando";

/// Builds the container command of a restore job
#[derive(Debug, Clone)]
pub struct RestoreCommandBuilder {
    pull_tool: String,
}

impl Default for RestoreCommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PULL_TOOL)
    }
}

impl RestoreCommandBuilder {
    /// `pull_tool` is inserted as written and may carry its own flags
    pub fn new(pull_tool: impl Into<String>) -> Self {
        Self {
            pull_tool: pull_tool.into(),
        }
    }

    /// Returns the shell pipeline that pulls `artifact` and unpacks it into
    /// `restore_path`
    pub fn pipeline(
        &self,
        artifact: &str,
        restore_path: &str,
        profile: &Profile,
    ) -> Result<String, FunctionError> {
        let profile_json =
            serde_json::to_string(profile).map_err(FunctionError::ProfileSerialization)?;

        Ok(format!(
            "{} location pull --profile {} --path {} - | gunzip -c - | tar -xf - -C {}",
            self.pull_tool,
            shell_words::quote(&profile_json),
            shell_words::quote(artifact),
            shell_words::quote(restore_path),
        ))
    }

    pub fn build(
        &self,
        artifact: &str,
        restore_path: &str,
        profile: &Profile,
    ) -> Result<Vec<String>, FunctionError> {
        let pipeline = self.pipeline(artifact, restore_path, profile)?;
        Ok(["bash", "-o", "errexit", "-o", "pipefail", "-c"]
            .into_iter()
            .map(str::to_string)
            .chain(std::iter::once(pipeline))
            .collect())
    }
}

/// Builds the restore command with the default pull tool
pub fn restore_command(
    artifact: &str,
    restore_path: &str,
    profile: &Profile,
) -> Result<Vec<String>, FunctionError> {
    RestoreCommandBuilder::default().build(artifact, restore_path, profile)
}
