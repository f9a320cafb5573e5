//! # Configuração do Pipeline
//!
//! Seletores e parâmetros passados pelo chamador na montagem do pipeline.
//! Os vários "sabores" de scorer (sequência de tags vs matriz de spans, e as
//! cabeças concretas que os alimentam) são representados por uma única
//! interface de capacidade selecionada por configuração — não por hierarquia
//! de classes; os scorers concretos ficam fora do núcleo.
//!
//! Seletores desconhecidos falham com [`NerError::Config`] na montagem,
//! nunca em tempo de inferência.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};

/// Estratégia de decodificação da evidência de rótulos produzida pelo scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeType {
    /// Sequência de rótulos por posição (softmax/CRF), decodificada pela
    /// máquina de estados BIO.
    General,
    /// Matriz de scores por par de posições (biaffine), decodificada por
    /// seleção gulosa ordenada por confiança.
    Biaffine,
}

impl DecodeType {
    /// Nome do seletor como string de configuração.
    pub fn name(&self) -> &'static str {
        match self {
            DecodeType::General => "general",
            DecodeType::Biaffine => "biaffine",
        }
    }
}

impl FromStr for DecodeType {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "general" => Ok(DecodeType::General),
            "biaffine" => Ok(DecodeType::Biaffine),
            other => Err(NerError::Config(format!(
                "decode_type desconhecido: {other}"
            ))),
        }
    }
}

/// Cabeças de modelo suportadas pelo sistema original.
///
/// O núcleo não carrega nenhum modelo; o seletor existe para validar a
/// configuração e derivar o [`DecodeType`] natural de cada cabeça.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    BertCrf,
    BertSoftmax,
    BertLstmCrf,
    BertBiaffine,
    AlbertTinyCrf,
    AlbertTinySoftmax,
}

impl ModelKind {
    /// Decodificação natural desta cabeça de modelo.
    pub fn decode_type(&self) -> DecodeType {
        match self {
            ModelKind::BertBiaffine => DecodeType::Biaffine,
            _ => DecodeType::General,
        }
    }
}

impl FromStr for ModelKind {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bert_crf" => Ok(ModelKind::BertCrf),
            "bert_softmax" => Ok(ModelKind::BertSoftmax),
            "bert_lstm_crf" => Ok(ModelKind::BertLstmCrf),
            "bert_biaffine" => Ok(ModelKind::BertBiaffine),
            "albert_tiny_crf" => Ok(ModelKind::AlbertTinyCrf),
            "albert_tiny_softmax" => Ok(ModelKind::AlbertTinySoftmax),
            other => Err(NerError::Config(format!(
                "model_kind desconhecido: {other}"
            ))),
        }
    }
}

/// Parâmetros imutáveis de uma execução de inferência.
///
/// `max_length` é o orçamento de tokens do modelo (contando `[CLS]` e
/// `[SEP]`); o orçamento de caracteres de cada janela é `max_length - 2`.
/// `overlap_length` é o contexto de prefixo acumulado entre janelas, em
/// caracteres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    /// Orçamento de tokens do modelo, incluindo os dois tokens de controle.
    pub max_length: usize,
    /// Contexto de sobreposição entre janelas, em caracteres.
    pub overlap_length: usize,
    /// Converte o texto para minúsculas antes da tokenização.
    #[serde(default)]
    pub do_lower: bool,
    /// Estratégia de decodificação.
    pub decode_type: DecodeType,
}

impl PredictConfig {
    /// Valida os parâmetros. Chamado na construção do `Predictor`.
    pub fn validate(&self) -> Result<()> {
        if self.max_length <= 2 {
            return Err(NerError::Config(format!(
                "max_length deve comportar [CLS]/[SEP] e ao menos um token (recebido {})",
                self.max_length
            )));
        }
        if self.overlap_length >= self.max_length - 2 {
            return Err(NerError::Config(format!(
                "overlap_length ({}) deve ser menor que o orçamento da janela ({})",
                self.overlap_length,
                self.max_length - 2
            )));
        }
        Ok(())
    }

    /// Orçamento de caracteres de cada janela (`max_length` menos controle).
    pub fn max_window_length(&self) -> usize {
        self.max_length - 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_type_from_str() {
        assert_eq!("general".parse::<DecodeType>().ok(), Some(DecodeType::General));
        assert_eq!("biaffine".parse::<DecodeType>().ok(), Some(DecodeType::Biaffine));
        assert!("viterbi".parse::<DecodeType>().is_err());
    }

    #[test]
    fn test_model_kind_from_str() {
        assert_eq!(
            "bert_biaffine".parse::<ModelKind>().ok(),
            Some(ModelKind::BertBiaffine)
        );
        assert_eq!(
            "bert_biaffine".parse::<ModelKind>().map(|m| m.decode_type()).ok(),
            Some(DecodeType::Biaffine)
        );
        assert_eq!(
            "albert_tiny_crf".parse::<ModelKind>().map(|m| m.decode_type()).ok(),
            Some(DecodeType::General)
        );
        assert!("gpt_gigante".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_config_validation() {
        let ok = PredictConfig {
            max_length: 128,
            overlap_length: 32,
            do_lower: false,
            decode_type: DecodeType::General,
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.max_window_length(), 126);

        let overlap_demais = PredictConfig {
            max_length: 10,
            overlap_length: 8,
            do_lower: false,
            decode_type: DecodeType::General,
        };
        assert!(overlap_demais.validate().is_err());

        let curto_demais = PredictConfig {
            max_length: 2,
            overlap_length: 0,
            do_lower: false,
            decode_type: DecodeType::General,
        };
        assert!(curto_demais.validate().is_err());
    }
}
