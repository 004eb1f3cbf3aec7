//! End-to-end demo of the commit-check-attest flow.
//!
//! - A server task owns the `AttestationService` and its signing key.
//! - The client builds a puzzle session, shuffles, solves it back,
//!   checks locally, then requests a signature over tokio mpsc.
//! - The returned signature is verified against the service public key
//!   before the submission would go on-chain.

use std::error::Error;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tilecommit::attest::{
    build_request, verify_attestation, AttestRequest, AttestResponse, Attestation,
    AttestationService, Secp256k1Signer, ServiceConfig,
};
use tilecommit::{Grid, PuzzleSeedBuilder, Tile};
use tokio::sync::mpsc;

// Well-known development key (hardhat account #0); never used anywhere real.
const DEV_SIGNING_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[derive(Debug)]
enum Request {
    PublicKey,
    Attest(AttestRequest),
}

#[derive(Debug)]
enum Response {
    PublicKey(Vec<u8>),
    Signed(AttestResponse),
    Rejected(String),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let key = std::env::var("ATTEST_SIGNING_KEY").unwrap_or_else(|_| DEV_SIGNING_KEY.into());

    let (req_tx, req_rx) = mpsc::channel::<Request>(1);
    let (resp_tx, mut resp_rx) = mpsc::channel::<Response>(1);
    tokio::spawn(server_task(req_rx, resp_tx, key));

    // Puzzle generation: the image splitter would hand over tiles in solved
    // order; synthetic byte payloads stand in for image tiles here.
    let grid = Grid::for_level(1);
    let solved: Vec<Tile> = (0..grid.tile_count())
        .map(|i| Tile::new(format!("tile-{i}").into_bytes()))
        .collect();
    let mut session = PuzzleSeedBuilder::default()
        .grid(grid)
        .tiles(solved.clone())
        .build_validated()?;
    println!("answer fingerprint: {}", session.answer_fingerprint());

    let mut rng = StdRng::seed_from_u64(42);
    session.shuffle(&mut rng);
    println!("shuffled: solved = {}", session.check());

    // Solve by swapping each position's tile back into place.
    for target in 0..solved.len() {
        if session.tiles()[target] == solved[target] {
            continue;
        }
        let from = (target + 1..solved.len())
            .find(|&i| session.tiles()[i] == solved[target])
            .expect("tile multiset is preserved by shuffle");
        session.swap(target, from)?;
    }
    println!("restored: solved = {}", session.check());
    println!("current fingerprint: {}", session.current_fingerprint());

    // Attestation round trip, single-flight guarded by the ticket.
    let ticket = session.begin_attestation()?;
    let request = build_request(&session.fingerprint_vector());
    req_tx.send(Request::Attest(request)).await?;

    let signature = match resp_rx.recv().await {
        Some(Response::Signed(response)) => Attestation::from_hex(&response.signature)?,
        Some(Response::Rejected(reason)) => {
            session.abandon_attestation(ticket)?;
            return Err(format!("attestation rejected: {reason}").into());
        }
        other => return Err(format!("unexpected response: {other:?}").into()),
    };

    let submission =
        session.complete_attestation(ticket, signature.as_bytes().to_vec())?;
    println!(
        "submission ready: {} tile fingerprints, signature {}",
        submission.tile_fingerprints.len(),
        signature
    );

    // Independent check against the service public key, as the contract
    // would perform it.
    req_tx.send(Request::PublicKey).await?;
    let public_key = match resp_rx.recv().await {
        Some(Response::PublicKey(bytes)) => bytes,
        other => return Err(format!("unexpected response: {other:?}").into()),
    };
    let aggregate = session.current_fingerprint();
    println!(
        "signature verifies: {}",
        verify_attestation(&public_key, &aggregate, &signature)
    );

    Ok(())
}

async fn server_task(
    mut req_rx: mpsc::Receiver<Request>,
    resp_tx: mpsc::Sender<Response>,
    signing_key_hex: String,
) {
    let signer = match Secp256k1Signer::from_hex(&signing_key_hex) {
        Ok(signer) => Arc::new(signer),
        Err(e) => {
            eprintln!("refusing to start with invalid signing key: {e}");
            return;
        }
    };
    let service = match AttestationService::new(ServiceConfig::default(), signer.clone()) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("failed to create attestation service: {e}");
            return;
        }
    };

    while let Some(req) = req_rx.recv().await {
        let resp = match req {
            Request::PublicKey => Response::PublicKey(signer.public_key_sec1()),
            Request::Attest(request) => match service.attest(&request) {
                Ok(response) => Response::Signed(response),
                Err(e) => Response::Rejected(e.to_string()),
            },
        };
        if resp_tx.send(resp).await.is_err() {
            break;
        }
    }
}
