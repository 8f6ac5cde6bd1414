//! HttpProofBackend against a stub server on an ephemeral port.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::B256;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use eerc_client::{EercClient, EercError, HttpProofBackend, ProofBackend};
use eerc_lib::{KeyPair, MintProofRequest, TxStatus};
use rand::rngs::OsRng;
use serde_json::{json, Value};

use crate::{shared_table, test_config, MemoryLedger, CHAIN_ID};

type Seen = Arc<Mutex<Vec<Value>>>;

async fn relay_mint(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.lock().unwrap().push(body);
    Json(json!({
        "success": true,
        "txHash": format!("0x{}", "ab".repeat(32)),
        "amount": "100",
        "message": "minted"
    }))
}

async fn broken_transfer(State(seen): State<Seen>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    seen.lock().unwrap().push(body);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "witness generation failed" })),
    )
}

async fn serve() -> (SocketAddr, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/api/eerc/mint", post(relay_mint))
        .route("/api/eerc/transfer", post(broken_transfer))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn backend(url: &str) -> HttpProofBackend {
    HttpProofBackend::from_config(&test_config(url)).unwrap()
}

#[tokio::test]
async fn test_mint_request_is_camel_case_json() {
    let (addr, seen) = serve().await;
    let prover = backend(&format!("http://{addr}/api/eerc"));
    let recipient = KeyPair::generate(&mut OsRng);
    let auditor = KeyPair::generate(&mut OsRng);

    let response = prover
        .mint_proof(&MintProofRequest {
            amount: 100,
            recipient_public_key: recipient.public,
            auditor_public_key: auditor.public,
        })
        .await
        .unwrap();
    assert!(response.success);
    assert_eq!(response.tx_hash, Some(B256::repeat_byte(0xab)));

    let body = seen.lock().unwrap()[0].clone();
    assert_eq!(body["amount"], json!(100));
    assert!(body.get("recipientPublicKey").is_some());
    assert!(body.get("auditorPublicKey").is_some());
}

#[tokio::test]
async fn test_relayed_mint_over_http_is_pending() {
    let (addr, _) = serve().await;
    let ledger = Arc::new(MemoryLedger::new(CHAIN_ID));
    let auditor = KeyPair::generate(&mut OsRng);
    let recipient = KeyPair::generate(&mut OsRng);
    let address = alloy_primitives::Address::repeat_byte(0x42);
    ledger.set_auditor(Some(&auditor.public));
    ledger.register(address, &recipient.public);

    let config = test_config(&format!("http://{addr}/api/eerc/"));
    let client = EercClient::new(
        Arc::new(config.clone()),
        ledger.clone(),
        ledger.clone(),
        Arc::new(HttpProofBackend::from_config(&config).unwrap()),
    )
    .with_dlog_table(shared_table())
    .unwrap();

    let record = client.mint(100, address).await.unwrap();
    assert_eq!(record.status, TxStatus::Pending);
    assert_eq!(record.tx_hash, B256::repeat_byte(0xab));
    assert_eq!(ledger.attempts(), 0);
}

#[tokio::test]
async fn test_server_error_body_surfaces_as_prover_error() {
    let (addr, seen) = serve().await;
    let prover = backend(&format!("http://{addr}/api/eerc"));
    let sender = KeyPair::generate(&mut OsRng);
    let other = KeyPair::generate(&mut OsRng);

    let err = prover
        .transfer_proof(&eerc_lib::TransferProofRequest {
            amount: 1,
            sender_public_key: sender.public,
            sender_private_key: sender.secret.to_u256(),
            sender_balance: 10,
            sender_encrypted_balance: Default::default(),
            receiver_public_key: other.public,
            auditor_public_key: other.public,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EercError::Prover(ref m) if m.contains("witness generation failed")));
    assert!(!err.is_retryable());
    assert!(seen.lock().unwrap()[0].get("senderPrivateKey").is_some());
}

#[tokio::test]
async fn test_unreachable_backend_is_connectivity() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let prover = backend(&format!("http://{addr}/api/eerc"));
    let keys = KeyPair::generate(&mut OsRng);
    let err = prover
        .mint_proof(&MintProofRequest {
            amount: 1,
            recipient_public_key: keys.public,
            auditor_public_key: keys.public,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EercError::Connectivity(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unknown_route_is_prover_error() {
    let (addr, _) = serve().await;
    let prover = backend(&format!("http://{addr}/elsewhere"));
    let keys = KeyPair::generate(&mut OsRng);
    let err = prover
        .mint_proof(&MintProofRequest {
            amount: 1,
            recipient_public_key: keys.public,
            auditor_public_key: keys.public,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EercError::Prover(ref m) if m.contains("404")));
}
