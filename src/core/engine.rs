use crate::core::{Function, FunctionRef, FunctionResolver, InvocationResult, Invoker};
use crate::utils::error::Result;

/// Resolve-then-invoke, one step after the other.
pub struct InvokeEngine<R: FunctionResolver, I: Invoker> {
    resolver: R,
    invoker: I,
}

impl<R: FunctionResolver, I: Invoker> InvokeEngine<R, I> {
    pub fn new(resolver: R, invoker: I) -> Self {
        Self { resolver, invoker }
    }

    pub async fn run(
        &self,
        tenancy_id: &str,
        target: &FunctionRef,
        payload: &[u8],
    ) -> Result<(Function, InvocationResult)> {
        tracing::info!(
            "Invoking function {} from app {} in compartment {} from tenancy {}",
            target.function,
            target.application,
            target.compartment,
            tenancy_id
        );

        let function = self.resolver.resolve(tenancy_id, target).await?;
        let result = self.invoker.invoke(&function, payload).await?;

        tracing::info!("✅ Invocation of {} completed", target);
        Ok((function, result))
    }
}
