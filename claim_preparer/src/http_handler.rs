use alloy::primitives::Address;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use claim_core::{
    prepare_claim_transaction, Allocation, ClaimRequest, ClaimingSummary, LoadError,
    SafeTransaction, CLAIM_ALL,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub account: Address,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimingDataResponse {
    pub account: Address,
    pub summary: ClaimingSummary,
    pub allocations: Vec<Allocation>,
    pub token_paused: bool,
    pub delegate: Option<Address>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimTransactionRequest {
    pub account: Address,
    #[serde(default)]
    pub safe_version: Option<String>,
    /// Decimal token amount, or "max" for everything available
    pub amount: String,
    #[serde(default)]
    pub delegate: Option<Address>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Load(LoadError),
}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        ApiError::Load(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Load(LoadError::TimedOut(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Load(LoadError::DataUnavailable { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Load(LoadError::TaskFailed(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self {
            ApiError::BadRequest(message) => {
                warn!("Bad request: {}", message);
                message
            }
            ApiError::Load(err) => {
                error!("Failed to load claiming data: {}", err);
                err.to_string()
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub fn parse_amount(amount: &str) -> Result<u128, ApiError> {
    let amount = amount.trim();
    if amount.eq_ignore_ascii_case("max") {
        return Ok(CLAIM_ALL);
    }
    amount
        .parse::<u128>()
        .map_err(|e| ApiError::BadRequest(format!("invalid amount {amount:?}: {e}")))
}

fn now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

/// Handler for GET /claiming_data
pub async fn get_claiming_data(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<ClaimingDataResponse>, ApiError> {
    let data = state.loader.fetch(query.account).await?;
    Ok(Json(ClaimingDataResponse {
        account: data.account,
        summary: data.summary(now()),
        token_paused: data.token_paused,
        delegate: data.delegate,
        allocations: data.allocations,
    }))
}

/// Handler for POST /claim_transaction. Answers 204 when there is nothing to claim.
pub async fn post_claim_transaction(
    State(state): State<AppState>,
    Json(body): Json<ClaimTransactionRequest>,
) -> Result<Response, ApiError> {
    let amount = parse_amount(&body.amount)?;
    let data = state.loader.fetch(body.account).await?;

    let request = ClaimRequest {
        amount,
        beneficiary: body.account,
        delegate: body.delegate,
    };
    let transaction = prepare_claim_transaction(
        &data,
        &request,
        &state.delegate_target,
        &state.combinator,
        body.safe_version.as_deref(),
        now(),
    );

    Ok(claim_response(body.account, transaction))
}

fn claim_response(account: Address, transaction: Option<SafeTransaction>) -> Response {
    let Some(transaction) = transaction else {
        info!("Nothing to claim for {}", account);
        return StatusCode::NO_CONTENT.into_response();
    };
    info!(
        "Prepared claim transaction for {} to {} ({:?})",
        account, transaction.to, transaction.operation
    );
    Json(transaction).into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use alloy::primitives::{Bytes, U256};
    use axum::body::to_bytes;
    use claim_core::{Operation, ReadKind};

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("max").unwrap(), CLAIM_ALL);
        assert_eq!(parse_amount("MAX").unwrap(), CLAIM_ALL);
        assert_eq!(parse_amount("0").unwrap(), 0);
        assert_eq!(
            parse_amount(" 1250000000000000000000 ").unwrap(),
            1_250_000_000_000_000_000_000
        );
        assert!(matches!(parse_amount("-1"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_amount("1.5"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_amount(""), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_error_status() {
        let res = ApiError::BadRequest("nope".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = ApiError::from(LoadError::TimedOut(Duration::from_secs(30))).into_response();
        assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);

        let res = ApiError::from(LoadError::DataUnavailable {
            read: ReadKind::Delegate,
            account: Address::ZERO,
            source: anyhow::anyhow!("connection refused"),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_deserialize_claim_request() {
        let body: ClaimTransactionRequest = serde_json::from_str(
            r#"{"account": "0x8d29be29923b68abfdd21e541b9374737b49cdad", "amount": "max"}"#,
        )
        .unwrap();
        assert_eq!(body.safe_version, None);
        assert_eq!(body.delegate, None);
        assert_eq!(parse_amount(&body.amount).unwrap(), CLAIM_ALL);

        let body: ClaimTransactionRequest = serde_json::from_str(
            r#"{
                "account": "0x8d29be29923b68abfdd21e541b9374737b49cdad",
                "safe_version": "1.1.1",
                "amount": "100",
                "delegate": "0x2222222222222222222222222222222222222222"
            }"#,
        )
        .unwrap();
        assert_eq!(body.safe_version.as_deref(), Some("1.1.1"));
        assert_eq!(body.delegate, Some(Address::repeat_byte(0x22)));
    }

    #[tokio::test]
    async fn test_nothing_to_claim_is_no_content() {
        let res = claim_response(Address::ZERO, None);
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_is_returned_as_json() {
        let transaction = SafeTransaction {
            to: Address::repeat_byte(0x40),
            value: U256::ZERO,
            data: Bytes::from(vec![0x8d, 0x80, 0xff, 0x0a]),
            operation: Operation::DelegateCall,
        };
        let res = claim_response(Address::ZERO, Some(transaction));
        assert_eq!(res.status(), StatusCode::OK);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"], "0x8d80ff0a");
        assert_eq!(json["operation"], 1);
        assert_eq!(json["value"], "0x0");
    }

    #[test]
    fn test_claiming_data_response_is_camel_case() {
        let response = ClaimingDataResponse {
            account: Address::ZERO,
            summary: ClaimingSummary::default(),
            allocations: Vec::new(),
            token_paused: true,
            delegate: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["tokenPaused"], true);
        assert_eq!(json["summary"]["unredeemed"], 0);
        assert!(json.get("token_paused").is_none());
    }
}
