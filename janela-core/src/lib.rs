//! # janela-core — Inferência NER por Janelas Sobrepostas
//!
//! Este crate executa reconhecimento de entidades nomeadas (NER plano, sem
//! aninhamento) sobre documentos **maiores que a janela de contexto do
//! modelo**. O scorer neural é um colaborador externo; o núcleo resolve a
//! parte com invariantes não-triviais: segmentar sem perder nem corromper
//! um caractere sequer, decodificar a evidência de rótulos e costurar os
//! resultados de volta nas coordenadas do documento.
//!
//! ## Arquitetura do Pipeline
//!
//! O dado flui e é transformado passo a passo:
//!
//! 1.  **Segmentação** ([`segment`]): o documento é dividido em janelas
//!     sobrepostas, cada uma com offset registrado e validado
//!     caractere a caractere.
//! 2.  **Pré-tokenização** ([`tokenizer`]): cada janela recebe a sentinela
//!     de espaço, `[CLS]`/`[SEP]` e a máscara de atenção.
//! 3.  **Scoring** ([`scorer`]): a interface de capacidade — tokens da
//!     janela entram, evidência de rótulos sai (sequência ou matriz).
//! 4.  **Decodificação** ([`decode`]): máquina de estados BIO para a
//!     sequência; seleção gulosa por confiança para a matriz biaffine.
//! 5.  **Recuperação** ([`recover`]): spans locais viram globais
//!     (`global = local + offset`) e as janelas são fundidas sem
//!     sobreposições.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use janela_core::segment::Segmenter;
//!
//! // Janelas de até 18 caracteres, com 6 de contexto sobreposto
//! let segmenter = Segmenter::new(18, 6).unwrap();
//! let text = "O júri decidiu. A sentença sai amanhã. Recurso negado.";
//! let windows = segmenter.segment(text).unwrap();
//!
//! // Toda janela reconstrói exatamente a fatia correspondente do documento
//! let chars: Vec<char> = text.chars().collect();
//! for w in &windows {
//!     let slice: String = chars[w.offset..w.offset + w.char_len()].iter().collect();
//!     assert_eq!(slice, w.text);
//! }
//! ```
//!
//! ## Invariantes Centrais
//!
//! - **Round-trip**: `documento[offset .. offset + len] == janela.text`.
//! - **Cobertura**: nenhum índice do documento fica fora de todas as janelas.
//! - **Monotonicidade**: offsets não-decrescentes na ordem das janelas.
//! - **NER plano**: nenhuma lista final contém spans sobrepostos.
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador ([`Predictor`]) que conecta os estágios.
//! - [`segment`]: segmentador e validador de consistência.
//! - [`decode`]: as duas estratégias de decodificação.
//! - [`gold`]: alvos de treino a partir de anotações gold (dados offline).

pub mod config;
pub mod decode;
pub mod entity;
pub mod error;
pub mod gold;
pub mod pipeline;
pub mod recover;
pub mod scorer;
pub mod segment;
pub mod tokenizer;

pub use config::{DecodeType, ModelKind, PredictConfig};
pub use entity::{Entity, LabelVocab};
pub use error::{NerError, Result};
pub use pipeline::Predictor;
pub use scorer::{Scorer, ScorerOutput};
pub use segment::{Segmenter, Window};
