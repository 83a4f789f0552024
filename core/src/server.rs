use std::sync::Arc;

use axum::{
    extract::Json,
    routing::{get, post},
    Extension, Router,
};
use erc20_token_contract::shim::X509Identity;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::AppError;
use crate::invoke::{EventRecord, LedgerHost, TxReceipt};

/// Credential details of the submitting client.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IdentityRequest {
    #[schema(example = "Org1MSP")]
    pub msp_id: String,
    #[schema(example = "CN=admin, OU=Fabric, O=Hyperledger, ST=North Carolina, C=US")]
    pub subject: String,
    #[schema(example = "CN=ca.org1.example.com, O=org1.example.com")]
    pub issuer: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvokeRequest {
    pub identity: IdentityRequest,
    #[schema(example = "mint")]
    pub function: String,
    #[serde(default)]
    #[schema(example = json!(["1000"]))]
    pub args: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/invoke",
    request_body = InvokeRequest,
    responses(
        (status = 200, description = "Transaction executed", body = TxReceipt),
        (status = 400, description = "Unknown function or invalid argument"),
        (status = 403, description = "Caller may not mint or burn"),
        (status = 404, description = "Token attribute not set"),
        (status = 409, description = "Insufficient funds or MVCC conflict")
    ),
    tag = "Ledger"
)]
pub async fn invoke_handler(
    Extension(host): Extension<Arc<LedgerHost>>,
    Json(payload): Json<InvokeRequest>,
) -> Result<Json<TxReceipt>, AppError> {
    let identity = X509Identity::new(
        payload.identity.msp_id,
        payload.identity.subject,
        payload.identity.issuer,
    );
    let receipt = host.invoke(&identity, &payload.function, &payload.args)?;
    Ok(Json(receipt))
}

#[derive(OpenApi)]
#[openapi(
    paths(invoke_handler),
    components(schemas(InvokeRequest, IdentityRequest, TxReceipt, EventRecord)),
    tags(
        (name = "Ledger", description = "ERC20 token ledger transactions")
    ),
    info(
        title = "ERC20 Ledger Host API",
        version = "0.1.0",
        description = "Submit transactions to the ERC20 token contract"
    )
)]
pub struct ApiDoc;

async fn health_check() -> &'static str {
    "OK"
}

pub fn router(host: Arc<LedgerHost>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        .route("/invoke", post(invoke_handler))
        .layer(Extension(host))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use erc20_token_contract::Token;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(LedgerHost::new(Token::new())))
    }

    fn invoke_request(msp_id: &str, function: &str, args: &[&str]) -> Request<Body> {
        let body = json!({
            "identity": {
                "msp_id": msp_id,
                "subject": "CN=admin",
                "issuer": "CN=ca.example.com",
            },
            "function": function,
            "args": args,
        });
        Request::builder()
            .method("POST")
            .uri("/invoke")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mint_then_query() {
        let app = app();
        let response = app
            .clone()
            .oneshot(invoke_request("Org1MSP", "mint", &["1000"]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let receipt = json_body(response).await;
        assert_eq!(receipt["payload"], "true");
        assert_eq!(receipt["committed"], true);
        assert_eq!(receipt["event"]["name"], "Transfer");

        let response = app
            .oneshot(invoke_request("Org1MSP", "totalSupply", &[]))
            .await
            .unwrap();
        let receipt = json_body(response).await;
        assert_eq!(receipt["payload"], "1000");
        assert_eq!(receipt["committed"], false);
    }

    #[tokio::test]
    async fn test_mint_forbidden_for_other_org() {
        let response = app()
            .oneshot(invoke_request("Org2MSP", "mint", &["1000"]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["error"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_missing_name_is_not_found() {
        let response = app()
            .oneshot(invoke_request("Org1MSP", "tokenName", &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Not found: Sorry ! Token name not found");
    }

    #[tokio::test]
    async fn test_unknown_function_is_bad_request() {
        let response = app()
            .oneshot(invoke_request("Org1MSP", "pause", &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
