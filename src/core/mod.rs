pub mod engine;
pub mod http;
pub mod invoker;
pub mod resolver;
pub mod signing;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{
    Application, Compartment, Function, FunctionRef, InvocationResult, Listed, Stage,
};
pub use crate::domain::ports::{ConfigProvider, CredentialProvider, FunctionResolver, Invoker};
pub use crate::utils::error::Result;
