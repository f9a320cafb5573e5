//! Servidor web Axum para demonstrar o pipeline NER janelado.
//!
//! Usa o scorer de léxico (determinístico) no lugar de um modelo neural,
//! para que o fluxo completo — segmentação, scoring, decodificação e
//! recuperação de offsets — possa ser exercitado por HTTP sem checkpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use janela_core::{
    scorer::LexiconScorer, DecodeType, Entity, LabelVocab, PredictConfig, Predictor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Estado compartilhado: um pipeline por estratégia de decodificação.
struct AppState {
    general: Predictor,
    biaffine: Predictor,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
    #[serde(default)]
    decode_type: Option<DecodeType>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    entities: Vec<Entity>,
    decode_type: DecodeType,
    processing_ms: u64,
}

/// Léxico de demonstração: (verbete, rótulo).
const LEXICON: &[(&str, &str)] = &[
    ("Lula", "PER"),
    ("Dilma Rousseff", "PER"),
    ("Machado de Assis", "PER"),
    ("Petrobras", "ORG"),
    ("Embraer", "ORG"),
    ("Supremo Tribunal Federal", "ORG"),
    ("Brasil", "LOC"),
    ("São Paulo", "LOC"),
    ("Brasília", "LOC"),
    ("Rio de Janeiro", "LOC"),
];

fn build_predictor(decode_type: DecodeType) -> Predictor {
    let config = PredictConfig {
        max_length: 128,
        overlap_length: 32,
        do_lower: false,
        decode_type,
    };
    let vocab = match decode_type {
        DecodeType::General => LabelVocab::parse(
            "[PAD]\nB-PER\nI-PER\nB-ORG\nI-ORG\nB-LOC\nI-LOC",
        ),
        DecodeType::Biaffine => LabelVocab::parse("[PAD]\nPER\nORG\nLOC"),
    }
    .expect("vocabulário de demonstração");
    let scorer = LexiconScorer::new(LEXICON, vocab.clone(), decode_type, config.do_lower);
    Predictor::new(config, vocab, Box::new(scorer)).expect("configuração de demonstração")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let state = Arc::new(AppState {
        general: build_predictor(DecodeType::General),
        biaffine: build_predictor(DecodeType::Biaffine),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Servidor NER janelado em http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Análise NER via HTTP POST.
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let decode_type = req.decode_type.unwrap_or(DecodeType::General);
    let predictor = match decode_type {
        DecodeType::General => &state.general,
        DecodeType::Biaffine => &state.biaffine,
    };

    let started = std::time::Instant::now();
    match predictor.predict(&req.text) {
        Ok(entities) => Json(AnalyzeResponse {
            entities,
            decode_type,
            processing_ms: started.elapsed().as_millis() as u64,
        })
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}
