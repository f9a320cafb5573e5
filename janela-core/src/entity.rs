//! # Entidades e Vocabulário de Rótulos
//!
//! Define os dois tipos que atravessam todo o pipeline:
//!
//! - [`Entity`]: um span semiaberto `[start, end)` com rótulo e score
//!   opcional. Dentro de uma janela os índices são locais (em caracteres);
//!   após a recuperação de offsets, são índices do documento.
//! - [`LabelVocab`]: a lista ordenada de rótulos do modelo. O índice 0 é
//!   **reservado** para "sem rótulo"/pad; a bijeção rótulo↔índice vale para
//!   todos os demais.
//!
//! O vocabulário é um valor imutável passado explicitamente a cada chamada —
//! nunca um singleton global.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};

/// Uma entidade identificada no texto, como span semiaberto `[start, end)`.
///
/// As coordenadas são **em caracteres** (o modelo original opera em nível de
/// caractere). `global = local + janela.offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Índice do primeiro caractere (inclusivo).
    pub start: usize,
    /// Índice final (exclusivo).
    pub end: usize,
    /// Rótulo da entidade (ex: "PER", "ORG").
    pub label: String,
    /// Score de confiança, presente apenas na decodificação por matriz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Entity {
    /// Cria uma entidade sem score.
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
            score: None,
        }
    }

    /// Verifica se dois spans semiabertos se intersectam.
    ///
    /// No esquema flat (sem aninhamento), `start1 < end2 ∧ start2 < end1`
    /// é proibido para qualquer par da lista final.
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Serializa entidades como JSON lines `[start, end, "label"]`, uma por linha.
///
/// O núcleo não persiste nada; o chamador decide onde gravar.
pub fn to_json_lines(entities: &[Entity]) -> serde_json::Result<String> {
    let mut out = String::new();
    for e in entities {
        let line = serde_json::to_string(&(e.start, e.end, &e.label))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Vocabulário ordenado de rótulos com bijeção rótulo↔índice.
///
/// Carregado externamente (arquivo `label.txt`, um rótulo por linha) e
/// passado como valor imutável. Para o decode sequencial os rótulos são tags
/// BIO ("B-PER", "I-PER"...); para o decode biaffine são nomes de entidade
/// puros ("PER", "LOC"...). Em ambos, o índice 0 é o rótulo reservado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelVocab {
    labels: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LabelVocab {
    /// Constrói o vocabulário a partir da lista ordenada de rótulos.
    ///
    /// Exige ao menos o rótulo reservado (índice 0) e rejeita duplicatas.
    pub fn new(labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(NerError::config("vocabulário de rótulos vazio"));
        }
        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(NerError::Config(format!(
                    "rótulo duplicado no vocabulário: {label}"
                )));
            }
        }
        Ok(Self { labels, index })
    }

    /// Parseia o conteúdo de um arquivo de rótulos (um por linha, ordem
    /// preservada; linhas vazias são ignoradas).
    pub fn parse(contents: &str) -> Result<Self> {
        let labels: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(labels)
    }

    /// Rótulo no índice dado, se existir.
    pub fn label(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Rótulo no índice dado, tratando o índice 0 (reservado) e índices
    /// desconhecidos como "O" (fora de entidade).
    pub fn label_or_outside(&self, id: usize) -> &str {
        if id == 0 {
            return "O";
        }
        self.labels.get(id).map(String::as_str).unwrap_or("O")
    }

    /// Índice de um rótulo, se presente.
    pub fn id(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Número de rótulos (incluindo o reservado).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Verdadeiro se o vocabulário não tem rótulos.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
