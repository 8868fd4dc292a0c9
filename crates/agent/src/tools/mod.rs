//! Agent toolkit

pub mod instagram;
pub mod reviews;
pub mod schema;
pub mod trends;

pub use instagram::InstagramPostTool;
pub use reviews::{Review, ReviewsTool};
pub use schema::{validate_arguments, SchemaViolation};
pub use trends::TrendSearchTool;

use async_trait::async_trait;
use marketeer_provider::Tool;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{AgentError, Result};

type BoxedTool = Box<dyn ToolTrait + Send + Sync>;

/// A callable the model may request
#[async_trait]
pub trait ToolTrait: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;
    async fn execute(
        &self,
        args: Value,
    ) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

pub fn to_provider_tool(tool: &dyn ToolTrait) -> Tool {
    Tool::new(tool.name(), tool.description(), tool.parameters())
}

/// Name -> tool map owned by one executor
pub struct ToolRegistry {
    tools: BTreeMap<String, BoxedTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register<T: ToolTrait + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Box::new(tool)).is_some() {
            warn!("tool '{}' registered twice, keeping the latest", name);
        }
    }

    /// Builder-style `register`
    pub fn with<T: ToolTrait + 'static>(mut self, tool: T) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&(dyn ToolTrait + Send + Sync)> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Schemas advertised to the model, sorted by name
    pub fn definitions(&self) -> Vec<Tool> {
        self.tools
            .values()
            .map(|t| to_provider_tool(t.as_ref()))
            .collect()
    }

    /// Validate `args` and run the named tool.
    ///
    /// Only an unknown name is an `Err`. Schema mismatches and tool failures
    /// come back as `Ok` text starting with `Error:` so the model can react.
    pub async fn execute(&self, name: &str, args: Value) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        let args = match validate_arguments(&tool.parameters(), &args) {
            Ok(args) => args,
            Err(violation) => {
                debug!("rejected arguments for {}: {}", name, violation);
                return Ok(format!(
                    "Error: invalid arguments for '{}': {}",
                    name, violation
                ));
            }
        };

        match tool.execute(args).await {
            Ok(output) => Ok(output),
            Err(e) => {
                debug!("tool {} failed: {}", name, e);
                Ok(format!("Error: tool '{}' failed: {}", name, e))
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
