//! Registry of named functions

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Args, ExecutionContext, Function, FunctionDescriptor, PrepareData, RestoreData};
use crate::error::FunctionError;
use crate::param::TemplateParams;

/// Functions by name, built once at startup and then only read
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in functions
    pub fn with_defaults() -> Result<Self, FunctionError> {
        let mut registry = Self::new();
        registry.register(Arc::new(PrepareData))?;
        registry.register(Arc::new(RestoreData))?;
        Ok(registry)
    }

    pub fn register(&mut self, function: Arc<dyn Function>) -> Result<(), FunctionError> {
        let name = function.name().to_string();
        if self.functions.contains_key(&name) {
            warn!("Refusing to register function {} twice", name);
            return Err(FunctionError::DuplicateFunction { name });
        }
        debug!("Registered function {}", name);
        self.functions.insert(name, function);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.get(name).cloned()
    }

    pub fn descriptor(&self, name: &str) -> Option<FunctionDescriptor> {
        self.functions.get(name).map(|f| f.descriptor())
    }

    /// Registered names in sorted order
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    fn lookup(&self, name: &str) -> Result<&Arc<dyn Function>, FunctionError> {
        self.functions
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction {
                name: name.to_string(),
            })
    }

    /// Checks a bag against the function's schema without running it
    pub fn validate(&self, name: &str, args: &Args) -> Result<(), FunctionError> {
        self.lookup(name)?
            .validate(args)
            .map_err(|e| e.in_function(name))
    }

    /// Validates and runs the named function
    pub async fn execute(
        &self,
        name: &str,
        ctx: &ExecutionContext,
        params: &TemplateParams,
        args: &Args,
    ) -> Result<(), FunctionError> {
        let function = self.lookup(name)?;
        function
            .validate(args)
            .map_err(|e| e.in_function(name))?;
        function
            .exec(ctx, params, args)
            .await
            .map_err(|e| e.in_function(name))
    }
}
