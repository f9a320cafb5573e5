//! # Decodificação de Evidência de Rótulos
//!
//! Converte a saída do scorer em spans de entidade locais à janela, por duas
//! estratégias:
//!
//! - [`decode_general`]: sequência de rótulos por posição (softmax/CRF),
//!   reconstruída pela máquina de estados BIO — a não-sobreposição é
//!   automática, pois só uma entidade fica aberta por vez.
//! - [`decode_biaffine`]: matriz de scores por par ordenado de posições
//!   `(i, j)`, `i ≤ j`. Gera candidatos pelo arg-max de cada célula e
//!   resolve conflitos por seleção gulosa em ordem de score — no esquema
//!   flat, menções aninhadas ou sobrepostas não são permitidas.
//!
//! Em ambas, a posição 0 corresponde ao token de controle `[CLS]` e é
//! descontada; os spans resultantes usam índices de caractere da janela.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{Entity, LabelVocab};

/// Matriz de scores `[seq_len × seq_len × num_labels]` produzida por uma
/// cabeça biaffine, achatada em um único buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    seq_len: usize,
    num_labels: usize,
    data: Vec<f64>,
}

impl ScoreMatrix {
    /// Matriz zerada com as dimensões dadas.
    pub fn zeros(seq_len: usize, num_labels: usize) -> Self {
        Self {
            seq_len,
            num_labels,
            data: vec![0.0; seq_len * seq_len * num_labels],
        }
    }

    /// Dimensão de sequência.
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Número de rótulos por célula.
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Define o score de um rótulo na célula `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, label_id: usize, score: f64) {
        let base = (i * self.seq_len + j) * self.num_labels;
        self.data[base + label_id] = score;
    }

    /// Vetor de scores da célula `(i, j)`.
    pub fn scores(&self, i: usize, j: usize) -> &[f64] {
        let base = (i * self.seq_len + j) * self.num_labels;
        &self.data[base..base + self.num_labels]
    }
}

/// Arg-max de um vetor de scores: (índice, score). Empates ficam com o
/// primeiro índice, logo o rótulo reservado vence em células zeradas.
fn argmax(scores: &[f64]) -> (usize, f64) {
    let mut best = 0usize;
    let mut best_score = f64::NEG_INFINITY;
    for (i, &s) in scores.iter().enumerate() {
        if s > best_score {
            best = i;
            best_score = s;
        }
    }
    (best, best_score)
}

/// Separa uma tag BIO em (prefixo, nome): "B-PER" → ('B', "PER").
///
/// Tags fora do esquema ("O", "[PAD]", etc.) retornam `None` e são tratadas
/// como fora de entidade.
fn split_bio(tag: &str) -> Option<(char, &str)> {
    let (prefix, rest) = tag.split_once('-')?;
    let mut prefix_chars = prefix.chars();
    let p = prefix_chars.next()?;
    if prefix_chars.next().is_some() || p == 'O' || rest.is_empty() {
        return None;
    }
    Some((p, rest))
}

/// Máquina de estados BIO: converte uma sequência de tags em spans.
///
/// - `O` (ou tag fora do esquema) fecha qualquer entidade aberta.
/// - `B-X` / `S-X` fecha a aberta e abre uma nova.
/// - Continuação (`I-X` e afins) com o mesmo nome estende a aberta em uma
///   posição; com nome diferente, ou sem entidade aberta, vale como novo
///   início.
///
/// A saída é ascendente e sem sobreposição por construção.
pub fn tags_to_entities(tags: &[String]) -> Vec<Entity> {
    let mut entities: Vec<Entity> = Vec::new();
    let mut prev_name: Option<String> = None;

    for (idx, tag) in tags.iter().enumerate() {
        match split_bio(tag) {
            Some((prefix, name)) => {
                let begins = matches!(prefix, 'B' | 'S');
                let continues = !begins && prev_name.as_deref() == Some(name);
                match entities.last_mut() {
                    Some(last) if continues && last.end == idx => last.end += 1,
                    _ => entities.push(Entity::new(idx, idx + 1, name)),
                }
                prev_name = Some(name.to_string());
            }
            None => prev_name = None,
        }
    }

    entities
}

/// Decodificação sequencial (`general`): ids de rótulo por posição.
///
/// A posição 0 é o `[CLS]` e é descartada; consome-se no máximo `text_len`
/// posições úteis. Ids 0 ou fora do vocabulário valem "O".
pub fn decode_general(pred_ids: &[usize], text_len: usize, vocab: &LabelVocab) -> Vec<Entity> {
    let usable = text_len.min(pred_ids.len().saturating_sub(1));
    // sequência vazia ou só [CLS]: nenhuma posição útil
    let tags: Vec<String> = pred_ids
        .get(1..1 + usable)
        .unwrap_or(&[])
        .iter()
        .map(|&id| vocab.label_or_outside(id).to_string())
        .collect();
    tags_to_entities(&tags)
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    end: usize,
    label_id: usize,
    score: f64,
}

impl Candidate {
    fn overlaps(&self, other: &Candidate) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Conta empates de score entre candidatos que de fato conflitam (spans
/// sobrepostos) — só nesses o desempate por `(start, end)` decide o aceito.
fn count_conflicting_ties(candidates: &[Candidate]) -> usize {
    candidates
        .windows(2)
        .filter(|pair| pair[0].score == pair[1].score && pair[0].overlaps(&pair[1]))
        .count()
}

/// Decodificação por matriz de spans (`biaffine`).
///
/// Para cada par `(i, j)` com `1 ≤ i ≤ j < usable`, toma o arg-max da
/// célula; rótulo não-reservado emite o candidato `(i-1, j)` — o `-1`
/// desconta o `[CLS]`. Os candidatos são ordenados por score decrescente
/// (empate: `(start, end)` crescente, para saída determinística) e aceitos
/// gulosamente quando não intersectam nenhum span já aceito.
pub fn decode_biaffine(matrix: &ScoreMatrix, usable: usize, vocab: &LabelVocab) -> Vec<Entity> {
    let usable = usable.min(matrix.seq_len());
    let mut candidates: Vec<Candidate> = Vec::new();
    for i in 1..usable {
        for j in i..usable {
            let (label_id, score) = argmax(matrix.scores(i, j));
            if label_id > 0 {
                candidates.push(Candidate {
                    start: i - 1,
                    end: j,
                    label_id,
                    score,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| a.end.cmp(&b.end))
    });
    let ties = count_conflicting_ties(&candidates);
    if ties > 0 {
        debug!(
            ties,
            "empate de score entre candidatos conflitantes; desempate por (start, end)"
        );
    }

    let mut accepted: Vec<Entity> = Vec::new();
    for cand in candidates {
        let span = Entity {
            start: cand.start,
            end: cand.end,
            label: vocab.label_or_outside(cand.label_id).to_string(),
            score: Some(cand.score),
        };
        if !accepted.iter().any(|e| e.overlaps(&span)) {
            accepted.push(span);
        }
    }
    accepted.sort_by_key(|e| (e.start, e.end));
    accepted
}

/// Expande spans em um array BIO de comprimento `len`, para uniformidade de
/// interface com a decodificação sequencial e com a avaliação.
pub fn entities_to_tags(entities: &[Entity], len: usize) -> Vec<String> {
    let mut tags = vec!["O".to_string(); len];
    for e in entities {
        if e.start >= len {
            continue;
        }
        tags[e.start] = format!("B-{}", e.label);
        for tag in tags.iter_mut().take(e.end.min(len)).skip(e.start + 1) {
            *tag = format!("I-{}", e.label);
        }
    }
    tags
}
