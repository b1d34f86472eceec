//! HTTP-level tests for the custody client and the raw JSON-RPC client,
//! backed by `wiremock`.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use multichain_faucet::domain::{
    AppError, ChainFamily, ChainRpc, CustodyClient, CustodyError, EvmTransactionRequest, RpcError,
    TransactionStatus,
};
use multichain_faucet::infra::blockchain::{HttpRpcClient, RpcClientConfig};
use multichain_faucet::infra::custody::{CustodyConfig, HttpCustodyClient};

fn custody_client(base_url: &str) -> HttpCustodyClient {
    HttpCustodyClient::new(CustodyConfig {
        base_url: base_url.to_string(),
        app_id: "app_test".to_string(),
        app_secret: SecretString::from("secret_test"),
        evm_wallet_id: "wallet_evm".to_string(),
        solana_wallet_id: "wallet_solana".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn rpc_client() -> HttpRpcClient {
    HttpRpcClient::new(RpcClientConfig {
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_balances_sends_query_and_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/wallets/wallet_evm/balance"))
        .and(query_param("chain", "base_sepolia"))
        .and(query_param("asset", "eth"))
        .and(header("x-app-id", "app_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balances": [{
                "chain": "base_sepolia",
                "asset": "eth",
                "raw_value": "1500000000000000000",
                "raw_value_decimals": 18,
                "display_values": {"eth": "1.5"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = custody_client(&server.uri());
    let balances = client
        .fetch_balances(
            ChainFamily::Ethereum,
            &["base_sepolia".to_string()],
            &["eth".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].raw_value, "1500000000000000000");
    assert_eq!(balances[0].raw_value_decimals, 18);
}

#[tokio::test]
async fn test_send_evm_transaction_submits_rpc_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/wallets/wallet_evm/rpc"))
        .and(body_partial_json(json!({
            "method": "eth_sendTransaction",
            "caip2": "eip155:84532",
            "sponsor": true,
            "params": {
                "transaction": {
                    "to": "0x1234567890abcdef1234567890abcdef12345678",
                    "value": "0x6f05b59d3b20000"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction_id": "tx_42",
            "hash": "0xfeed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = custody_client(&server.uri());
    let submission = client
        .send_evm_transaction(
            "eip155:84532",
            &EvmTransactionRequest {
                to: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
                value: "0x6f05b59d3b20000".to_string(),
                data: None,
            },
            true,
        )
        .await
        .unwrap();

    assert_eq!(submission.transaction_id, "tx_42");
    assert_eq!(submission.hash.as_deref(), Some("0xfeed"));
}

#[tokio::test]
async fn test_sign_and_send_solana_submits_base64_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/wallets/wallet_solana/rpc"))
        .and(body_partial_json(json!({
            "method": "signAndSendTransaction",
            "caip2": "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
            "params": {
                "transaction": "AQID",
                "encoding": "base64"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction_id": "tx_sol_1",
            "hash": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = custody_client(&server.uri());
    let submission = client
        .sign_and_send_solana("solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1", "AQID", true)
        .await
        .unwrap();

    assert_eq!(submission.transaction_id, "tx_sol_1");
    assert!(submission.hash.is_none());
}

#[tokio::test]
async fn test_custody_api_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/transactions/tx_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such transaction"))
        .mount(&server)
        .await;

    let client = custody_client(&server.uri());
    let error = client.get_transaction("tx_missing").await.unwrap_err();
    match error {
        AppError::Custody(CustodyError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("no such transaction"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_get_transaction_decodes_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/transactions/tx_7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "tx_7",
            "caip2": "eip155:84532",
            "created_at": 1735000000000i64,
            "status": "broadcasted",
            "transaction_hash": "0xabc",
            "sponsored": false
        })))
        .mount(&server)
        .await;

    let client = custody_client(&server.uri());
    let record = client.get_transaction("tx_7").await.unwrap();
    assert_eq!(record.status, TransactionStatus::Broadcasted);
    assert_eq!(record.transaction_hash.as_deref(), Some("0xabc"));
    assert_eq!(record.sponsored, Some(false));
}

#[tokio::test]
async fn test_native_balance_decodes_hex_quantity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getBalance"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0xde0b6b3a7640000"
        })))
        .mount(&server)
        .await;

    let client = rpc_client();
    let balance = client
        .native_balance(&server.uri(), "0x1234567890abcdef1234567890abcdef12345678")
        .await
        .unwrap();
    assert_eq!(balance, "1000000000000000000");
}

#[tokio::test]
async fn test_erc20_balance_sends_balance_of_calldata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x16e360"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = rpc_client();
    let balance = client
        .erc20_balance(
            &server.uri(),
            "0xf817257fed379853cDe0fa4F97AB987181B1E5Ea",
            "0x1234567890abcdef1234567890abcdef12345678",
        )
        .await
        .unwrap();
    assert_eq!(balance, "1500000");
}

#[tokio::test]
async fn test_rpc_error_envelope_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "execution reverted"}
        })))
        .mount(&server)
        .await;

    let client = rpc_client();
    let error = client
        .native_balance(&server.uri(), "0x1234567890abcdef1234567890abcdef12345678")
        .await
        .unwrap_err();
    match error {
        AppError::Rpc(RpcError::Envelope { code, message }) => {
            assert_eq!(code, -32000);
            assert!(message.contains("reverted"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_account_exists_reads_account_info_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "getAccountInfo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"context": {"slot": 1}, "value": null}
        })))
        .mount(&server)
        .await;

    let client = rpc_client();
    let exists = client
        .account_exists(&server.uri(), "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T")
        .await
        .unwrap();
    assert!(!exists);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"context": {"slot": 1}, "value": {"lamports": 2039280}}
        })))
        .mount(&server)
        .await;
    let exists = client
        .account_exists(&server.uri(), "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T")
        .await
        .unwrap();
    assert!(exists);
}
