use super::AppState;
use crate::facet::CHROM_DENSITY;
use crate::params::FilterKey;
use crate::types::{Organization, QueryCapabilities, ServiceInfo, ServiceType};
use axum::{Json, extract::State};

pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let limits = state.compiler.row_limits();
    let identity = &state.identity;
    Json(ServiceInfo {
        id: identity.id.clone(),
        name: env!("CARGO_PKG_NAME").to_string(),
        r#type: ServiceType {
            group: identity.id.clone(),
            artifact: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        description: Some(env!("CARGO_PKG_DESCRIPTION").to_string()),
        organization: Organization {
            name: identity.organization.clone(),
            url: identity.organization_url.clone(),
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        variantq: QueryCapabilities {
            filters: FilterKey::ALL.iter().map(FilterKey::as_str).collect(),
            facets: vec![CHROM_DENSITY],
            default_limit: limits.default,
            max_limit: limits.max,
        },
    })
}
