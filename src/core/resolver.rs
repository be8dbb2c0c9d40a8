use crate::core::http::{Page, SignedClient};
use crate::core::{
    Application, Compartment, ConfigProvider, CredentialProvider, Function, FunctionRef,
    FunctionResolver, Listed, Stage,
};
use crate::utils::error::{FnError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashSet;

pub const IDENTITY_API_VERSION: &str = "20160918";
pub const FUNCTIONS_API_VERSION: &str = "20181201";

/// Walks Tenancy → Compartment → Application → Function by name.
///
/// Compartments are listed in full and matched client-side because the
/// listing has no name filter that covers the whole subtree. Applications and
/// functions use the service's `displayName` filter. Every listing is read to
/// the last page, and resources being deleted never count as a match.
pub struct ResourceResolver<C: CredentialProvider> {
    http: SignedClient<C>,
    identity_endpoint: String,
    functions_endpoint: String,
    page_limit: u32,
}

impl<C: CredentialProvider> ResourceResolver<C> {
    pub fn new<P: ConfigProvider>(config: &P, http: SignedClient<C>) -> Self {
        Self {
            http,
            identity_endpoint: config.identity_endpoint().trim_end_matches('/').to_string(),
            functions_endpoint: config.functions_endpoint().trim_end_matches('/').to_string(),
            page_limit: config.page_limit(),
        }
    }

    /// Follows `opc-next-page` until the listing is exhausted. A token the
    /// service already handed out ends the walk.
    async fn list_all<T: DeserializeOwned>(
        &self,
        stage: Stage,
        url: &str,
        filter: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let limit = self.page_limit.to_string();

        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let mut query = filter.to_vec();
            query.push(("limit", limit.as_str()));
            if let Some(token) = page_token.as_deref() {
                query.push(("page", token));
            }

            let page: Page<T> = self.http.get_page(url, &query).await?;
            tracing::debug!(
                "📂 Fetched {} {} entries (page {})",
                page.items.len(),
                stage,
                seen_tokens.len() + 1
            );
            items.extend(page.items);

            match page.next_page {
                Some(next) if seen_tokens.insert(next.clone()) => page_token = Some(next),
                Some(next) => {
                    tracing::warn!("{} listing repeated page token {}, stopping", stage, next);
                    break;
                }
                None => break,
            }
        }

        Ok(items)
    }

    /// Every accessible compartment under the tenancy, all pages.
    pub async fn list_compartments(&self, tenancy_id: &str) -> Result<Vec<Compartment>> {
        let url = format!("{}/{}/compartments", self.identity_endpoint, IDENTITY_API_VERSION);
        self.list_all(
            Stage::Compartment,
            &url,
            &[
                ("compartmentId", tenancy_id),
                ("compartmentIdInSubtree", "true"),
                ("accessLevel", "ACCESSIBLE"),
            ],
        )
        .await
    }

    pub async fn resolve_compartment(&self, tenancy_id: &str, name: &str) -> Result<Compartment> {
        tracing::info!("🔎 Finding OCID for compartment {}", name);

        let matches: Vec<Compartment> = self
            .list_compartments(tenancy_id)
            .await?
            .into_iter()
            .filter(|c| c.display_name() == name)
            .collect();

        let compartment = single(
            Stage::Compartment,
            name,
            format!("tenancy {}", tenancy_id),
            matches,
        )?;
        tracing::info!("📂 Compartment OCID {}", compartment.id);
        Ok(compartment)
    }

    pub async fn resolve_application(&self, compartment_id: &str, name: &str) -> Result<Application> {
        self.find_application(compartment_id, format!("compartment {}", compartment_id), name)
            .await
    }

    async fn find_application(
        &self,
        compartment_id: &str,
        scope: String,
        name: &str,
    ) -> Result<Application> {
        tracing::info!("🔎 Finding OCID for application {}", name);

        let url = format!("{}/{}/applications", self.functions_endpoint, FUNCTIONS_API_VERSION);
        let applications = self
            .list_all(
                Stage::Application,
                &url,
                &[("compartmentId", compartment_id), ("displayName", name)],
            )
            .await?;

        let application: Application = single(Stage::Application, name, scope, applications)?;
        tracing::info!("📦 Application OCID {}", application.id);
        Ok(application)
    }

    pub async fn resolve_function(&self, application_id: &str, name: &str) -> Result<Function> {
        self.find_function(application_id, format!("application {}", application_id), name)
            .await
    }

    async fn find_function(&self, application_id: &str, scope: String, name: &str) -> Result<Function> {
        tracing::info!("🔎 Finding OCID for function {}", name);

        let url = format!("{}/{}/functions", self.functions_endpoint, FUNCTIONS_API_VERSION);
        let functions = self
            .list_all(
                Stage::Function,
                &url,
                &[("applicationId", application_id), ("displayName", name)],
            )
            .await?;

        let function: Function = single(Stage::Function, name, scope.clone(), functions)?;
        tracing::info!("⚙️ Function OCID {}", function.id);

        if function.invoke_endpoint().is_some() {
            return Ok(function);
        }

        tracing::info!("🔎 Finding invoke endpoint for function {}", function.id);
        let detailed = self.get_function(&function.id).await?;
        if detailed.invoke_endpoint().is_none() {
            return Err(FnError::NotFoundError {
                stage: Stage::Function,
                name: name.to_string(),
                scope: format!("{} (function has no invoke endpoint)", scope),
            });
        }
        Ok(detailed)
    }

    pub async fn get_function(&self, function_id: &str) -> Result<Function> {
        let url = format!(
            "{}/{}/functions/{}",
            self.functions_endpoint, FUNCTIONS_API_VERSION, function_id
        );
        self.http.get_json(&url).await
    }

    /// Full chain. Stops at the first failing stage and tags the error with it.
    /// Scopes in not-found errors carry the parent's display name and OCID.
    pub async fn resolve_function_by_names(
        &self,
        tenancy_id: &str,
        compartment_name: &str,
        application_name: &str,
        function_name: &str,
    ) -> Result<Function> {
        let compartment = self
            .resolve_compartment(tenancy_id, compartment_name)
            .await
            .map_err(|e| e.at_stage(Stage::Compartment))?;

        let application = self
            .find_application(
                &compartment.id,
                format!("compartment {} ({})", compartment.display_name(), compartment.id),
                application_name,
            )
            .await
            .map_err(|e| e.at_stage(Stage::Application))?;

        self.find_function(
            &application.id,
            format!("application {} ({})", application.display_name, application.id),
            function_name,
        )
        .await
        .map_err(|e| e.at_stage(Stage::Function))
    }
}

#[async_trait]
impl<C: CredentialProvider> FunctionResolver for ResourceResolver<C> {
    async fn resolve(&self, tenancy_id: &str, target: &FunctionRef) -> Result<Function> {
        self.resolve_function_by_names(
            tenancy_id,
            &target.compartment,
            &target.application,
            &target.function,
        )
        .await
    }
}

/// Exactly one live match or a not-found class error.
fn single<T: Listed>(stage: Stage, name: &str, scope: String, items: Vec<T>) -> Result<T> {
    let mut live: Vec<T> = items.into_iter().filter(|item| item.is_live()).collect();
    match live.len() {
        0 => Err(FnError::NotFoundError {
            stage,
            name: name.to_string(),
            scope,
        }),
        1 => Ok(live.remove(0)),
        count => Err(FnError::AmbiguousNameError {
            stage,
            name: name.to_string(),
            scope,
            count,
        }),
    }
}
