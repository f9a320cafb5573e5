//! # Features Gold (treino/avaliação offline)
//!
//! Converte anotações gold em alvos de treino na mesma geometria da saída
//! do scorer: arrays BIO para as cabeças sequenciais e matrizes de rótulo
//! por par de posições para a cabeça biaffine.
//!
//! Anotações reais são ruidosas: um span gold pode ultrapassar o
//! comprimento útil de uma janela truncada. Esse span é **registrado e
//! descartado** ([`NerError::AnnotationRange`]), nunca fatal — dados
//! ruidosos não podem abortar a preparação de um corpus inteiro. A política
//! vale somente para dados offline; na inferência não existem spans gold.

use tracing::warn;

use crate::decode::entities_to_tags;
use crate::entity::{Entity, LabelVocab};
use crate::error::{NerError, Result};

/// Expande entidades gold em um array BIO de comprimento `len`.
pub fn bio_tags(entities: &[Entity], len: usize) -> Vec<String> {
    entities_to_tags(entities, len)
}

/// Traduz entidades gold do documento para coordenadas locais da janela.
///
/// Mantém apenas as entidades inteiramente contidas em
/// `[offset, offset + window_len)`; as demais pertencem a outras janelas.
pub fn localize_entities(entities: &[Entity], offset: usize, window_len: usize) -> Vec<Entity> {
    entities
        .iter()
        .filter(|e| e.start >= offset && e.end <= offset + window_len)
        .map(|e| Entity {
            start: e.start - offset,
            end: e.end - offset,
            label: e.label.clone(),
            score: e.score,
        })
        .collect()
}

/// Matriz gold biaffine: `celula[start + 1][end] = id do rótulo`.
///
/// O `+1` desconta o `[CLS]`. O comprimento útil é `input_len - 1`; spans
/// além dele são descartados com aviso e contados no segundo elemento do
/// retorno. Um rótulo ausente do vocabulário é erro fatal de configuração.
pub fn biaffine_gold_matrix(
    entities: &[Entity],
    input_len: usize,
    max_length: usize,
    vocab: &LabelVocab,
) -> Result<(Vec<Vec<usize>>, usize)> {
    if input_len > max_length {
        return Err(NerError::Config(format!(
            "input_len ({input_len}) maior que max_length ({max_length})"
        )));
    }
    let mut matrix = vec![vec![0usize; max_length]; max_length];
    let usable = input_len.saturating_sub(1);
    let mut dropped = 0usize;

    for entity in entities {
        if entity.start >= entity.end || entity.end > usable {
            let err = NerError::AnnotationRange {
                start: entity.start,
                end: entity.end,
                usable,
            };
            warn!("{err}");
            dropped += 1;
            continue;
        }
        let label_id = vocab.id(&entity.label).ok_or_else(|| {
            NerError::Config(format!("rótulo gold fora do vocabulário: {}", entity.label))
        })?;
        matrix[entity.start + 1][entity.end] = label_id;
    }

    Ok((matrix, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> LabelVocab {
        LabelVocab::parse("[PAD]\nPER\nLOC").unwrap()
    }

    #[test]
    fn test_matriz_gold() {
        let entities = vec![Entity::new(0, 2, "PER"), Entity::new(3, 5, "LOC")];
        // janela de 6 caracteres: input_len = 8 ([CLS] + 6 + [SEP])
        let (matrix, dropped) = biaffine_gold_matrix(&entities, 8, 16, &vocab()).unwrap();
        assert_eq!(dropped, 0);
        assert_eq!(matrix[1][2], 1); // PER em [0,2)
        assert_eq!(matrix[4][5], 2); // LOC em [3,5)
    }

    #[test]
    fn test_span_fora_da_janela_e_descartado() {
        // janela truncada: comprimento útil 4, span termina em 9
        let entities = vec![Entity::new(0, 2, "PER"), Entity::new(6, 9, "LOC")];
        let (matrix, dropped) = biaffine_gold_matrix(&entities, 5, 16, &vocab()).unwrap();
        assert_eq!(dropped, 1);
        assert_eq!(matrix[1][2], 1);
        // nenhuma célula do span descartado
        assert!(matrix.iter().flatten().filter(|&&id| id != 0).count() == 1);
    }

    #[test]
    fn test_rotulo_desconhecido_e_fatal() {
        let entities = vec![Entity::new(0, 2, "MOEDA")];
        assert!(biaffine_gold_matrix(&entities, 8, 16, &vocab()).is_err());
    }

    #[test]
    fn test_localizacao_por_janela() {
        let doc = vec![
            Entity::new(2, 4, "PER"),
            Entity::new(8, 12, "LOC"),
            Entity::new(14, 18, "PER"),
        ];
        let local = localize_entities(&doc, 8, 8); // janela [8, 16)
        assert_eq!(local, vec![Entity::new(0, 4, "LOC")]);
    }

    #[test]
    fn test_tags_bio_gold() {
        let entities = vec![Entity::new(1, 3, "PER")];
        assert_eq!(bio_tags(&entities, 4), vec!["O", "B-PER", "I-PER", "O"]);
    }
}
