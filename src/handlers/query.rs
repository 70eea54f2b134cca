use super::AppState;
use crate::{
    Error, Result,
    types::{VariantQueryBody, VariantQueryResponse},
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};

pub async fn post_variant_query(
    State(state): State<AppState>,
    body: std::result::Result<Json<VariantQueryBody>, JsonRejection>,
) -> Result<Json<VariantQueryResponse>> {
    let Json(body) = body.map_err(|e| Error::InvalidInput(e.body_text()))?;

    let search_query = state
        .compiler
        .compile(&body.query, &body.options)
        .inspect_err(|e| tracing::info!(kind = e.kind(), "rejected variant query: {}", e))?;
    let params = search_query.to_params();

    Ok(Json(VariantQueryResponse {
        search_query,
        params,
    }))
}
