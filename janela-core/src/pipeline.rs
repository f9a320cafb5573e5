//! # Pipeline de Inferência Janelada
//!
//! O orquestrador conecta os estágios na ordem de dependência:
//!
//! 1. **Segmentação**: o documento vira janelas sobrepostas com offset.
//! 2. **Pré-tokenização**: cada janela é preparada para o scorer.
//! 3. **Scoring**: o colaborador externo produz a evidência de rótulos.
//! 4. **Decodificação**: a evidência vira spans locais, conforme o
//!    `decode_type` configurado.
//! 5. **Recuperação e fusão**: spans locais viram globais e as janelas são
//!    fundidas em uma lista final sem sobreposições.
//!
//! O fluxo de um documento é síncrono e sem efeitos colaterais além da
//! chamada de scoring; não há estado mutável compartilhado entre invocações
//! — vocabulário e configuração são valores imutáveis. Documentos são
//! independentes entre si: [`Predictor::predict_batch`] processa um lote em
//! paralelo com rayon. Timeouts e retries em torno do scoring são
//! responsabilidade do chamador.

use rayon::prelude::*;
use tracing::debug;

use crate::config::{DecodeType, PredictConfig};
use crate::decode::{decode_biaffine, decode_general};
use crate::entity::{Entity, LabelVocab};
use crate::error::{NerError, Result};
use crate::recover::{merge_entities, recover_offsets};
use crate::scorer::{Scorer, ScorerOutput};
use crate::segment::Segmenter;
use crate::tokenizer::prepare_input;

/// O pipeline de predição configurado.
pub struct Predictor {
    config: PredictConfig,
    segmenter: Segmenter,
    vocab: LabelVocab,
    scorer: Box<dyn Scorer>,
}

impl Predictor {
    /// Monta o pipeline, validando a configuração.
    pub fn new(config: PredictConfig, vocab: LabelVocab, scorer: Box<dyn Scorer>) -> Result<Self> {
        config.validate()?;
        let segmenter = Segmenter::new(config.max_window_length(), config.overlap_length)?;
        Ok(Self {
            config,
            segmenter,
            vocab,
            scorer,
        })
    }

    /// Configuração imutável do pipeline.
    pub fn config(&self) -> &PredictConfig {
        &self.config
    }

    /// Prediz as entidades de um documento, em coordenadas globais.
    pub fn predict(&self, text: &str) -> Result<Vec<Entity>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let windows = self.segmenter.segment(text)?;
        debug!(janelas = windows.len(), "documento segmentado");

        let mut recovered = Vec::with_capacity(windows.len());
        for window in &windows {
            let input = prepare_input(&window.text, self.config.max_length, self.config.do_lower);
            let output = self.scorer.score(&input)?;
            let local = match (self.config.decode_type, output) {
                (DecodeType::General, ScorerOutput::Tags(ids)) => {
                    decode_general(&ids, input.text_len, &self.vocab)
                }
                (DecodeType::Biaffine, ScorerOutput::Matrix(matrix)) => {
                    decode_biaffine(&matrix, input.text_len + 1, &self.vocab)
                }
                (kind, _) => {
                    return Err(NerError::Config(format!(
                        "saída do scorer incompatível com decode_type {}",
                        kind.name()
                    )))
                }
            };
            recovered.push(recover_offsets(local, window.offset));
        }

        Ok(merge_entities(recovered))
    }

    /// Prediz um lote de documentos independentes, em paralelo.
    ///
    /// A ordem da saída espelha a ordem da entrada.
    pub fn predict_batch(&self, texts: &[String]) -> Result<Vec<Vec<Entity>>> {
        texts.par_iter().map(|text| self.predict(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::ScoreMatrix;
    use crate::scorer::{LexiconScorer, StaticScorer};

    const TEXT: &str = "Lula falou. O congresso votou. Brasília parou. O Brasil observou.";

    fn slice(text: &str, e: &Entity) -> String {
        text.chars().skip(e.start).take(e.end - e.start).collect()
    }

    fn bio_vocab() -> LabelVocab {
        LabelVocab::parse("[PAD]\nB-PER\nI-PER\nB-LOC\nI-LOC").unwrap()
    }

    fn span_vocab() -> LabelVocab {
        LabelVocab::parse("[PAD]\nPER\nLOC").unwrap()
    }

    fn lexicon(vocab: &LabelVocab, decode_type: DecodeType) -> Box<LexiconScorer> {
        Box::new(LexiconScorer::new(
            &[("Lula", "PER"), ("Brasília", "LOC"), ("Brasil", "LOC")],
            vocab.clone(),
            decode_type,
            false,
        ))
    }

    fn config(decode_type: DecodeType) -> PredictConfig {
        PredictConfig {
            max_length: 32,
            overlap_length: 8,
            do_lower: false,
            decode_type,
        }
    }

    #[test]
    fn test_predicao_general_em_multiplas_janelas() {
        let vocab = bio_vocab();
        let predictor = Predictor::new(
            config(DecodeType::General),
            vocab.clone(),
            lexicon(&vocab, DecodeType::General),
        )
        .unwrap();

        let entities = predictor.predict(TEXT).unwrap();
        let found: Vec<(String, String)> = entities
            .iter()
            .map(|e| (slice(TEXT, e), e.label.clone()))
            .collect();
        assert!(found.contains(&("Lula".into(), "PER".into())));
        assert!(found.contains(&("Brasília".into(), "LOC".into())));
        assert!(found.contains(&("Brasil".into(), "LOC".into())));
        for a in &entities {
            for b in &entities {
                if a != b {
                    assert!(!a.overlaps(b));
                }
            }
        }
    }

    #[test]
    fn test_predicao_biaffine_em_multiplas_janelas() {
        let vocab = span_vocab();
        let predictor = Predictor::new(
            config(DecodeType::Biaffine),
            vocab.clone(),
            lexicon(&vocab, DecodeType::Biaffine),
        )
        .unwrap();

        let entities = predictor.predict(TEXT).unwrap();
        let found: Vec<(String, String)> = entities
            .iter()
            .map(|e| (slice(TEXT, e), e.label.clone()))
            .collect();
        assert!(found.contains(&("Lula".into(), "PER".into())));
        assert!(found.contains(&("Brasília".into(), "LOC".into())));
        assert!(found.contains(&("Brasil".into(), "LOC".into())));
        assert!(entities.iter().all(|e| e.score == Some(1.0)));
    }

    #[test]
    fn test_saida_incompativel_e_erro_de_configuracao() {
        let vocab = bio_vocab();
        let scorer = StaticScorer::new(vec![ScorerOutput::Matrix(ScoreMatrix::zeros(
            32,
            vocab.len(),
        ))]);
        let predictor =
            Predictor::new(config(DecodeType::General), vocab, Box::new(scorer)).unwrap();
        let err = predictor.predict("abc").unwrap_err();
        assert!(matches!(err, NerError::Config(_)));
    }

    #[test]
    fn test_documento_vazio() {
        let vocab = bio_vocab();
        let predictor = Predictor::new(
            config(DecodeType::General),
            vocab.clone(),
            lexicon(&vocab, DecodeType::General),
        )
        .unwrap();
        assert!(predictor.predict("").unwrap().is_empty());
    }

    #[test]
    fn test_lote_em_paralelo_preserva_ordem() {
        let vocab = bio_vocab();
        let predictor = Predictor::new(
            config(DecodeType::General),
            vocab.clone(),
            lexicon(&vocab, DecodeType::General),
        )
        .unwrap();
        let texts = vec![
            "Lula chegou.".to_string(),
            "Nada aqui.".to_string(),
            "O Brasil cresceu.".to_string(),
        ];
        let results = predictor.predict_batch(&texts).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0][0].label, "PER");
        assert!(results[1].is_empty());
        assert_eq!(results[2].len(), 1);
        assert_eq!(results[2][0].label, "LOC");
    }

    #[test]
    fn test_configuracao_invalida_na_montagem() {
        let vocab = bio_vocab();
        let bad = PredictConfig {
            max_length: 10,
            overlap_length: 9,
            do_lower: false,
            decode_type: DecodeType::General,
        };
        assert!(Predictor::new(bad, vocab.clone(), lexicon(&vocab, DecodeType::General)).is_err());
    }
}
