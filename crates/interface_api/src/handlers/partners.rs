//! Partner handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_kernel::{PartnerId, PolicyId};
use domain_partner::{Partner, PartnerError};
use tracing::instrument;

use crate::dto::partner::*;
use crate::extract::{RequestContext, ValidatedJson};
use crate::{error::ApiError, AppState};

/// Path ids that do not parse cannot name a stored record
fn parse_partner_id(raw: &str) -> Result<PartnerId, ApiError> {
    raw.parse()
        .map_err(|_| PartnerError::PartnerNotFound.into())
}

fn parse_policy_id(raw: &str) -> Result<PolicyId, ApiError> {
    raw.parse()
        .map_err(|_| PartnerError::PolicyNotFound.into())
}

/// Registers a new partner
#[instrument(skip(state, request))]
pub async fn create_partner(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePartnerRequest>,
) -> Result<(StatusCode, Json<PartnerResponse>), ApiError> {
    let partner = state
        .service
        .create_partner(Partner::new(request.name, request.cnpj))
        .await?;
    Ok((StatusCode::CREATED, Json(partner.into())))
}

/// Prices a quotation for one of the partner's customers
#[instrument(skip(state, ctx, request))]
pub async fn create_quote(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(partner_id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateQuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let partner_id = parse_partner_id(&partner_id)?;
    let (age, sex) = request.into_parts();
    let quote = state
        .service
        .create_quote(&ctx, &partner_id, age, sex)
        .await?;
    Ok(Json(quote.into()))
}

/// Issues a policy from a quotation
#[instrument(skip(state, ctx, request))]
pub async fn create_policy(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(partner_id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreatePolicyRequest>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let partner_id = parse_partner_id(&partner_id)?;
    let policy = state
        .service
        .create_policy(&ctx, &partner_id, request.into())
        .await?;
    Ok(Json(policy.into()))
}

/// Gets one of the partner's policies with the provider's current data
#[instrument(skip(state, ctx))]
pub async fn get_policy(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path((partner_id, policy_id)): Path<(String, String)>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let partner_id = parse_partner_id(&partner_id)?;
    let policy_id = parse_policy_id(&policy_id)?;
    let policy = state
        .service
        .get_policy(&ctx, &partner_id, &policy_id)
        .await?;
    Ok(Json(policy.into()))
}
