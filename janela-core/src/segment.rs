//! # Segmentação em Janelas Sobrepostas
//!
//! Divide um documento maior que o contexto do modelo em janelas com
//! sobreposição, cada uma com seu offset registrado, de modo que:
//!
//! 1. **Round-trip**: `documento[offset .. offset + len(janela)] == janela`,
//!    caractere a caractere, para toda janela produzida.
//! 2. **Cobertura**: a união das janelas cobre todo índice do documento,
//!    sem lacunas.
//! 3. **Monotonicidade**: os offsets são não-decrescentes na ordem de
//!    produção.
//!
//! ## Algoritmo
//!
//! O texto é quebrado em fragmentos alternando conteúdo e delimitadores
//! (pontuação de fim de sentença, ASCII e CJK; o ponto só delimita quando
//! não está entre dígitos, preservando "3.14"). Cada fragmento de conteúdo
//! vira a **semente** de uma janela: acumula-se um prefixo de contexto para
//! trás (limitado por `overlap_length`, aparando delimitadores à frente) e
//! um sufixo para a frente (até o total alcançar `max_window_length`).
//! Fragmentos nunca são cortados ao meio, então uma janela pode exceder o
//! orçamento em até um fragmento — o truncamento fino é papel do
//! pré-tokenizador.
//!
//! Corridas de delimitadores que nenhuma semente reivindica (entre janelas,
//! no início ou no fim do documento) são absorvidas pela janela vizinha para
//! garantir a cobertura total.
//!
//! Toda janela é validada contra a fatia correspondente do documento antes
//! de retornar; qualquer divergência é [`NerError::SegmentationConsistency`],
//! fatal.

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};

/// Pontuação que encerra fragmentos (ASCII e equivalentes CJK).
const DELIMITERS: &[char] = &['。', '？', '?', '，', ',', '；', ';', '！', '!'];

/// Uma janela do documento: substring com offset registrado.
///
/// Invariante: `documento[offset .. offset + chars(text)] == text`.
/// O offset é **em caracteres**.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// O texto da janela (prefixo + semente + sufixo).
    pub text: String,
    /// Offset do primeiro caractere no documento.
    pub offset: usize,
}

impl Window {
    /// Comprimento da janela em caracteres.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FragmentKind {
    Content,
    Delimiter,
}

/// Intervalo de caracteres `[start, end)` dentro do documento.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: usize,
    end: usize,
    kind: FragmentKind,
}

impl Fragment {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

fn is_delimiter(chars: &[char], i: usize) -> bool {
    let c = chars[i];
    if DELIMITERS.contains(&c) {
        return true;
    }
    if c == '.' {
        // O ponto entre dígitos é conteúdo ("3.14"); nos demais casos, delimita.
        let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
        let next_digit = i + 1 < chars.len() && chars[i + 1].is_ascii_digit();
        return !prev_digit && !next_digit;
    }
    false
}

fn split_fragments(chars: &[char]) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut content_start = 0;
    for i in 0..chars.len() {
        if is_delimiter(chars, i) {
            if i > content_start {
                fragments.push(Fragment {
                    start: content_start,
                    end: i,
                    kind: FragmentKind::Content,
                });
            }
            fragments.push(Fragment {
                start: i,
                end: i + 1,
                kind: FragmentKind::Delimiter,
            });
            content_start = i + 1;
        }
    }
    if content_start < chars.len() {
        fragments.push(Fragment {
            start: content_start,
            end: chars.len(),
            kind: FragmentKind::Content,
        });
    }
    fragments
}

/// Segmentador configurado com os orçamentos de janela e sobreposição.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmenter {
    max_window_length: usize,
    overlap_length: usize,
}

impl Segmenter {
    /// Cria o segmentador. Exige `overlap_length < max_window_length`.
    pub fn new(max_window_length: usize, overlap_length: usize) -> Result<Self> {
        if max_window_length == 0 {
            return Err(NerError::config("max_window_length deve ser positivo"));
        }
        if overlap_length >= max_window_length {
            return Err(NerError::Config(format!(
                "overlap_length ({overlap_length}) deve ser menor que max_window_length ({max_window_length})"
            )));
        }
        Ok(Self {
            max_window_length,
            overlap_length,
        })
    }

    /// Segmenta o documento em janelas sobrepostas, validadas.
    pub fn segment(&self, text: &str) -> Result<Vec<Window>> {
        let chars: Vec<char> = text.chars().collect();
        let windows = self.build_windows(&chars);
        validate_windows(text, &windows)?;
        Ok(windows)
    }

    /// Segmenta o documento junto com um array paralelo de tags
    /// (treino/avaliação), fatiando as tags pelos mesmos intervalos.
    pub fn segment_with_tags(
        &self,
        text: &str,
        tags: &[String],
    ) -> Result<(Vec<Window>, Vec<Vec<String>>)> {
        let chars: Vec<char> = text.chars().collect();
        if tags.len() != chars.len() {
            return Err(NerError::Config(format!(
                "array de tags ({}) não é paralelo ao texto ({} caracteres)",
                tags.len(),
                chars.len()
            )));
        }
        let windows = self.build_windows(&chars);
        validate_windows(text, &windows)?;
        let tag_slices = windows
            .iter()
            .map(|w| {
                let len = w.char_len();
                tags[w.offset..w.offset + len].to_vec()
            })
            .collect();
        Ok((windows, tag_slices))
    }

    fn build_windows(&self, chars: &[char]) -> Vec<Window> {
        let fragments = split_fragments(chars);
        let n = fragments.len();
        let mut windows: Vec<Window> = Vec::new();
        // Fronteira coberta: primeiro caractere ainda fora de qualquer janela.
        let mut covered_end = 0usize;

        let mut i = 0;
        while i < n {
            let seed = fragments[i];
            if seed.kind == FragmentKind::Delimiter {
                i += 1;
                continue;
            }

            // Prefixo: caminha para trás acumulando contexto até estourar o
            // orçamento de sobreposição.
            let mut prefix_len = 0usize;
            let mut first = i;
            while first > 0 {
                let candidate = fragments[first - 1];
                if prefix_len + candidate.len() < self.overlap_length {
                    prefix_len += candidate.len();
                    first -= 1;
                } else {
                    break;
                }
            }
            // Apara delimitadores à frente do prefixo: janela não começa
            // no meio de pontuação já coberta.
            while first < i && fragments[first].kind == FragmentKind::Delimiter {
                prefix_len -= fragments[first].len();
                first += 1;
            }

            // Sufixo: caminha para a frente até o total alcançar o orçamento.
            let mut suffix_len = 0usize;
            let mut next = i + 1;
            while next < n {
                if prefix_len + seed.len() + suffix_len < self.max_window_length {
                    suffix_len += fragments[next].len();
                    next += 1;
                } else {
                    break;
                }
            }

            let mut start = fragments[first].start;
            let end = fragments[next - 1].end;
            // Lacuna até a fronteira coberta? Só pode conter delimitadores
            // (todo conteúdo vira semente); estende a janela para trás.
            if start > covered_end {
                start = covered_end;
            }

            windows.push(Window {
                text: chars[start..end].iter().collect(),
                offset: start,
            });
            covered_end = covered_end.max(end);
            i = next;
        }

        // Cauda de delimitadores após a última semente, ou documento sem
        // nenhum fragmento de conteúdo: absorve na última janela ou vira
        // uma janela única.
        if covered_end < chars.len() {
            let tail: String = chars[covered_end..].iter().collect();
            match windows.last_mut() {
                Some(last) => last.text.push_str(&tail),
                None => windows.push(Window {
                    text: tail,
                    offset: 0,
                }),
            }
        }

        windows
    }
}

/// Valida que toda janela corresponde, caractere a caractere, à fatia do
/// documento no offset registrado.
///
/// Qualquer divergência indica defeito na segmentação e é fatal — nunca uma
/// condição recuperável a ser absorvida em silêncio.
pub fn validate_windows(text: &str, windows: &[Window]) -> Result<()> {
    let chars: Vec<char> = text.chars().collect();
    for window in windows {
        let len = window.char_len();
        let end = window.offset + len;
        let matches = end <= chars.len()
            && chars[window.offset..end]
                .iter()
                .copied()
                .eq(window.text.chars());
        if !matches {
            return Err(NerError::SegmentationConsistency {
                offset: window.offset,
                end,
            });
        }
    }
    Ok(())
}
