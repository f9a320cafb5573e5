//! # Interface de Scoring
//!
//! O scorer neural (encoder + cabeça softmax/CRF/biaffine) é um colaborador
//! externo, consumido como caixa-preta por uma única interface de
//! capacidade: dados os tokens de uma janela, produzir evidência de rótulos.
//! A variante da evidência — sequência de ids ou matriz de scores — é
//! selecionada pela configuração ([`DecodeType`]), não por hierarquia de
//! classes.
//!
//! O crate traz duas implementações em processo:
//!
//! - [`StaticScorer`]: devolve saídas pré-programadas, na ordem. Para testes.
//! - [`LexiconScorer`]: casa verbetes de um léxico contra os tokens da
//!   janela, no espírito dos gazetteers de sistemas baseados em regras.
//!   Determinístico; usado pelo servidor de demonstração.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::config::DecodeType;
use crate::decode::ScoreMatrix;
use crate::entity::LabelVocab;
use crate::error::{NerError, Result};
use crate::tokenizer::{prepare_input, ScorerInput};

/// Evidência de rótulos produzida por um scorer para uma janela.
#[derive(Debug, Clone, PartialEq)]
pub enum ScorerOutput {
    /// Um id de rótulo por posição (decodificação `general`).
    Tags(Vec<usize>),
    /// Matriz de scores por par de posições (decodificação `biaffine`).
    Matrix(ScoreMatrix),
}

/// A interface de capacidade: tokens de uma janela → evidência de rótulos.
///
/// Implementações devem ser `Send + Sync`: o pipeline pontua documentos
/// independentes em paralelo compartilhando o mesmo scorer.
pub trait Scorer: Send + Sync {
    /// Pontua uma janela preparada.
    fn score(&self, input: &ScorerInput) -> Result<ScorerOutput>;
}

/// Scorer de testes: devolve saídas pré-programadas na ordem de chamada.
pub struct StaticScorer {
    outputs: Mutex<VecDeque<ScorerOutput>>,
}

impl StaticScorer {
    /// Cria o scorer com a fila de saídas a devolver.
    pub fn new(outputs: Vec<ScorerOutput>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
        }
    }
}

impl Scorer for StaticScorer {
    fn score(&self, _input: &ScorerInput) -> Result<ScorerOutput> {
        let mut queue = self
            .outputs
            .lock()
            .map_err(|_| NerError::scorer("fila de saídas envenenada"))?;
        queue
            .pop_front()
            .ok_or_else(|| NerError::scorer("sem saída programada para esta janela"))
    }
}

/// Scorer determinístico baseado em léxico, para demonstração.
///
/// Cada verbete é convertido com a mesma transformação do pré-tokenizador e
/// casado por janela deslizante sobre os tokens; o verbete mais longo vence
/// em cada posição. Produz tags BIO (`general`) ou células de score 1.0
/// (`biaffine`), conforme a configuração.
pub struct LexiconScorer {
    entries: Vec<(Vec<String>, String)>,
    vocab: LabelVocab,
    decode_type: DecodeType,
}

impl LexiconScorer {
    /// Cria o scorer a partir de pares (verbete, rótulo).
    ///
    /// `do_lower` deve espelhar a configuração do pipeline para que os
    /// verbetes sofram a mesma normalização dos tokens.
    pub fn new(
        entries: &[(&str, &str)],
        vocab: LabelVocab,
        decode_type: DecodeType,
        do_lower: bool,
    ) -> Self {
        let mut entries: Vec<(Vec<String>, String)> = entries
            .iter()
            .filter(|(term, _)| !term.is_empty())
            .map(|(term, label)| {
                let input = prepare_input(term, term.chars().count() + 2, do_lower);
                let tokens = input.tokens[1..input.input_len - 1].to_vec();
                (tokens, label.to_string())
            })
            .collect();
        // verbetes mais longos têm prioridade no casamento
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self {
            entries,
            vocab,
            decode_type,
        }
    }

    /// Verbete mais longo que casa na posição dada, se houver.
    fn match_at<'a>(&'a self, tokens: &[String], pos: usize) -> Option<(usize, &'a str)> {
        self.entries.iter().find_map(|(term, label)| {
            let end = pos + term.len();
            if end <= tokens.len() && tokens[pos..end] == term[..] {
                Some((term.len(), label.as_str()))
            } else {
                None
            }
        })
    }
}

impl Scorer for LexiconScorer {
    fn score(&self, input: &ScorerInput) -> Result<ScorerOutput> {
        // tokens úteis, sem [CLS]/[SEP]
        let text_tokens = &input.tokens[1..input.input_len - 1];
        match self.decode_type {
            DecodeType::General => {
                let mut ids = vec![0usize; input.tokens.len()];
                let mut pos = 0;
                while pos < text_tokens.len() {
                    if let Some((len, label)) = self.match_at(text_tokens, pos) {
                        if let Some(begin_id) = self.vocab.id(&format!("B-{label}")) {
                            ids[pos + 1] = begin_id;
                            if let Some(inside_id) = self.vocab.id(&format!("I-{label}")) {
                                for id in ids.iter_mut().skip(pos + 2).take(len - 1) {
                                    *id = inside_id;
                                }
                            }
                        }
                        pos += len;
                    } else {
                        pos += 1;
                    }
                }
                Ok(ScorerOutput::Tags(ids))
            }
            DecodeType::Biaffine => {
                let seq_len = input.tokens.len();
                let mut matrix = ScoreMatrix::zeros(seq_len, self.vocab.len());
                for pos in 0..text_tokens.len() {
                    if let Some((len, label)) = self.match_at(text_tokens, pos) {
                        if let Some(label_id) = self.vocab.id(label) {
                            // célula (start+1, end): desconto do [CLS]
                            matrix.set(pos + 1, pos + len, label_id, 1.0);
                        }
                    }
                }
                Ok(ScorerOutput::Matrix(matrix))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_biaffine, decode_general};
    use crate::entity::Entity;

    #[test]
    fn test_static_scorer_devolve_em_ordem() {
        let scorer = StaticScorer::new(vec![
            ScorerOutput::Tags(vec![0, 1]),
            ScorerOutput::Tags(vec![0, 2]),
        ]);
        let input = prepare_input("a", 4, false);
        assert_eq!(
            scorer.score(&input).unwrap(),
            ScorerOutput::Tags(vec![0, 1])
        );
        assert_eq!(
            scorer.score(&input).unwrap(),
            ScorerOutput::Tags(vec![0, 2])
        );
        assert!(scorer.score(&input).is_err());
    }

    #[test]
    fn test_lexicon_general() {
        let vocab = LabelVocab::parse("[PAD]\nB-PER\nI-PER\nB-LOC\nI-LOC").unwrap();
        let scorer = LexiconScorer::new(
            &[("Lula", "PER"), ("Brasil", "LOC")],
            vocab.clone(),
            DecodeType::General,
            false,
        );
        let text = "Lula governa o Brasil";
        let input = prepare_input(text, 32, false);
        let output = scorer.score(&input).unwrap();
        let ScorerOutput::Tags(ids) = output else {
            panic!("esperava tags");
        };
        let entities = decode_general(&ids, input.text_len, &vocab);
        assert_eq!(
            entities,
            vec![Entity::new(0, 4, "PER"), Entity::new(15, 21, "LOC")]
        );
    }

    #[test]
    fn test_lexicon_biaffine() {
        let vocab = LabelVocab::parse("[PAD]\nPER\nLOC").unwrap();
        let scorer = LexiconScorer::new(
            &[("Lula", "PER")],
            vocab.clone(),
            DecodeType::Biaffine,
            false,
        );
        let input = prepare_input("Lula fala", 16, false);
        let ScorerOutput::Matrix(matrix) = scorer.score(&input).unwrap() else {
            panic!("esperava matriz");
        };
        let entities = decode_biaffine(&matrix, input.text_len + 1, &vocab);
        assert_eq!(entities.len(), 1);
        assert_eq!((entities[0].start, entities[0].end), (0, 4));
        assert_eq!(entities[0].label, "PER");
    }

    #[test]
    fn test_lexicon_normaliza_minusculas() {
        let vocab = LabelVocab::parse("[PAD]\nB-PER\nI-PER").unwrap();
        let scorer =
            LexiconScorer::new(&[("Lula", "PER")], vocab.clone(), DecodeType::General, true);
        let input = prepare_input("LULA", 8, true);
        let ScorerOutput::Tags(ids) = scorer.score(&input).unwrap() else {
            panic!("esperava tags");
        };
        let entities = decode_general(&ids, input.text_len, &vocab);
        assert_eq!(entities, vec![Entity::new(0, 4, "PER")]);
    }
}
