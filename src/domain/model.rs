use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A level of the Tenancy → Compartment → Application → Function chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Compartment,
    Application,
    Function,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Compartment => "compartment",
            Stage::Application => "application",
            Stage::Function => "function",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compartment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub compartment_id: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

/// Common view of the entities returned by list operations.
pub trait Listed {
    fn display_name(&self) -> &str;
    fn lifecycle_state(&self) -> Option<&str>;

    /// False once the resource is being deleted. Listings keep returning
    /// deleted resources for a while, so name lookups skip them.
    fn is_live(&self) -> bool {
        !matches!(self.lifecycle_state(), Some("DELETING") | Some("DELETED"))
    }
}

impl Listed for Compartment {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn lifecycle_state(&self) -> Option<&str> {
        self.lifecycle_state.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub compartment_id: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub invoke_endpoint: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

impl Listed for Application {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn lifecycle_state(&self) -> Option<&str> {
        self.lifecycle_state.as_deref()
    }
}

impl Listed for Function {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn lifecycle_state(&self) -> Option<&str> {
        self.lifecycle_state.as_deref()
    }
}

impl Function {
    pub fn invoke_endpoint(&self) -> Option<&str> {
        self.invoke_endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.trim().is_empty())
    }
}

/// The response of one invocation. Never stored past the call that made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub request_id: Option<String>,
}

impl InvocationResult {
    /// Strict UTF-8 view of the body.
    pub fn text(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.body)?)
    }
}

/// Human-readable coordinates of a function within a tenancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub compartment: String,
    pub application: String,
    pub function: String,
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.compartment, self.application, self.function
        )
    }
}
