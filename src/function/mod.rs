//! Named data-movement functions
//!
//! A function is an operation keyed by name that takes an untyped argument bag
//! plus the ambient [`TemplateParams`], and runs one ephemeral job through the
//! execution engine. Each implementation declares its argument schema with a
//! [`FunctionDescriptor`] so bags can be checked before anything runs.

use async_trait::async_trait;
use std::collections::BTreeSet;

pub mod args;
pub mod context;
pub mod prepare_data;
pub mod registry;
pub mod restore_data;

pub use args::{arg, opt_arg, ArgValue, Args, FromArgValue};
pub use context::ExecutionContext;
pub use prepare_data::PrepareData;
pub use registry::FunctionRegistry;
pub use restore_data::RestoreData;

use crate::error::FunctionError;
use crate::param::TemplateParams;

/// Name and argument schema of a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub required: BTreeSet<String>,
    pub optional: BTreeSet<String>,
}

impl FunctionDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: BTreeSet::new(),
            optional: BTreeSet::new(),
        }
    }

    pub fn required(mut self, keys: &[&str]) -> Self {
        self.required.extend(keys.iter().map(|k| k.to_string()));
        self
    }

    pub fn optional(mut self, keys: &[&str]) -> Self {
        self.optional.extend(keys.iter().map(|k| k.to_string()));
        self
    }

    /// Checks that every required key is present and not null.
    ///
    /// Keys are checked in sorted order so the reported key is stable.
    pub fn validate(&self, args: &Args) -> Result<(), FunctionError> {
        match self
            .required
            .iter()
            .find(|key| !args.get(*key).is_some_and(|value| !value.is_null()))
        {
            Some(key) => Err(FunctionError::missing_argument(key.as_str())),
            None => Ok(()),
        }
    }
}

#[async_trait]
pub trait Function: Send + Sync {
    fn name(&self) -> &str;

    fn descriptor(&self) -> FunctionDescriptor;

    fn description(&self) -> &str;

    fn validate(&self, args: &Args) -> Result<(), FunctionError> {
        self.descriptor().validate(args)
    }

    async fn exec(
        &self,
        ctx: &ExecutionContext,
        params: &TemplateParams,
        args: &Args,
    ) -> Result<(), FunctionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_validation() {
        let descriptor = FunctionDescriptor::new("Test")
            .required(&["namespace", "image"])
            .optional(&["pod"]);

        let mut bag = Args::new();
        bag.insert("namespace".to_string(), "apps".into());
        bag.insert("image".to_string(), ArgValue::Null);

        let err = descriptor.validate(&bag).unwrap_err();
        assert!(matches!(err, FunctionError::MissingArgument { name } if name == "image"));

        bag.insert("image".to_string(), "busybox".into());
        assert!(descriptor.validate(&bag).is_ok());
    }

    #[test]
    fn test_descriptor_reports_first_key_in_order() {
        let descriptor = FunctionDescriptor::new("Test").required(&["volumes", "command"]);

        let err = descriptor.validate(&Args::new()).unwrap_err();
        assert!(matches!(err, FunctionError::MissingArgument { name } if name == "command"));
    }
}
