//! # Tipos de Erro
//!
//! Taxonomia de erros do pipeline janelado:
//!
//! | Variante                   | Fatal? | Origem                                        |
//! |----------------------------|--------|-----------------------------------------------|
//! | `Config`                   | Sim    | Seletor desconhecido, parâmetros inválidos    |
//! | `SegmentationConsistency`  | Sim    | Janela não corresponde à fatia do documento   |
//! | `AnnotationRange`          | Não    | Span gold além da janela (dados offline)      |
//! | `Scorer`                   | Sim    | Falha propagada do scorer externo             |
//!
//! Erros fatais sobem intactos com `?` até o chamador; o núcleo não contém
//! lógica de retry. `AnnotationRange` é registrado via `tracing::warn!` e o
//! span ofensivo é descartado — nunca aborta o processamento.

use thiserror::Error;

/// Alias de `Result` para as operações deste crate.
pub type Result<T> = std::result::Result<T, NerError>;

/// Erros do pipeline de inferência janelada.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NerError {
    /// Configuração inválida detectada na montagem do pipeline.
    #[error("configuração inválida: {0}")]
    Config(String),

    /// O texto registrado de uma janela não corresponde à fatia do documento
    /// no offset registrado. Indica defeito na segmentação, nunca uma
    /// condição recuperável em tempo de execução.
    #[error("janela inconsistente: documento[{offset}..{end}] difere do texto registrado")]
    SegmentationConsistency { offset: usize, end: usize },

    /// Span de anotação gold (dados offline) além do comprimento útil da
    /// janela. Registrado e descartado, nunca fatal.
    #[error("span de anotação fora da janela: [{start}, {end}) excede o limite útil {usable}")]
    AnnotationRange {
        start: usize,
        end: usize,
        usable: usize,
    },

    /// Falha retornada pelo scorer externo.
    #[error("falha no scorer: {0}")]
    Scorer(String),
}

impl NerError {
    /// Cria um erro de configuração.
    pub fn config(msg: impl Into<String>) -> Self {
        NerError::Config(msg.into())
    }

    /// Cria um erro de scorer.
    pub fn scorer(msg: impl Into<String>) -> Self {
        NerError::Scorer(msg.into())
    }
}
