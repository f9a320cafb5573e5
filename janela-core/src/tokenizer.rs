//! # Pré-Tokenização
//!
//! Prepara o texto de uma janela para o scorer externo. A tokenização
//! sub-palavra de verdade (ids de vocabulário do modelo) fica fora do
//! núcleo; aqui cabe somente o contrato de entrada:
//!
//! - um token por caractere, com minúsculas opcionais;
//! - caracteres de espaço substituídos pelo token sentinela `[unused1]`;
//! - truncamento a `max_length - 2`, envelopado por `[CLS]`/`[SEP]`;
//! - máscara de atenção com 1 para tokens reais e 0 para o padding `[PAD]`.

use serde::{Deserialize, Serialize};

/// Token de controle inicial.
pub const CLS_TOKEN: &str = "[CLS]";
/// Token de controle final.
pub const SEP_TOKEN: &str = "[SEP]";
/// Token de preenchimento.
pub const PAD_TOKEN: &str = "[PAD]";
/// Sentinela que substitui caracteres de espaço em branco.
pub const WHITESPACE_SENTINEL: &str = "[unused1]";

/// Entrada preparada para uma chamada ao scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerInput {
    /// Tokens com `[CLS]`/`[SEP]`, preenchidos com `[PAD]` até `max_length`.
    pub tokens: Vec<String>,
    /// 1 para tokens reais, 0 para padding. Mesmo comprimento de `tokens`.
    pub attention_mask: Vec<u8>,
    /// Quantidade de tokens reais, incluindo os dois de controle.
    pub input_len: usize,
    /// Caracteres úteis da janela após o truncamento.
    pub text_len: usize,
}

/// Prepara a entrada do scorer para o texto de uma janela.
///
/// `max_length` menor que 2 é tratado como 2: os tokens de controle sempre
/// cabem e `tokens.len()` nunca excede o orçamento efetivo.
pub fn prepare_input(text: &str, max_length: usize, do_lower: bool) -> ScorerInput {
    let max_length = max_length.max(2);
    let budget = max_length - 2;
    let mut tokens: Vec<String> = Vec::with_capacity(max_length);
    tokens.push(CLS_TOKEN.to_string());

    let mut text_len = 0usize;
    for c in text.chars().take(budget) {
        if c.is_whitespace() {
            tokens.push(WHITESPACE_SENTINEL.to_string());
        } else if do_lower {
            tokens.push(c.to_lowercase().to_string());
        } else {
            tokens.push(c.to_string());
        }
        text_len += 1;
    }
    tokens.push(SEP_TOKEN.to_string());

    let input_len = tokens.len();
    let mut attention_mask = vec![1u8; input_len];
    while tokens.len() < max_length {
        tokens.push(PAD_TOKEN.to_string());
        attention_mask.push(0);
    }

    ScorerInput {
        tokens,
        attention_mask,
        input_len,
        text_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopa_e_preenche() {
        let input = prepare_input("abc", 8, false);
        assert_eq!(
            input.tokens,
            vec!["[CLS]", "a", "b", "c", "[SEP]", "[PAD]", "[PAD]", "[PAD]"]
        );
        assert_eq!(input.attention_mask, vec![1, 1, 1, 1, 1, 0, 0, 0]);
        assert_eq!(input.input_len, 5);
        assert_eq!(input.text_len, 3);
    }

    #[test]
    fn test_sentinela_de_espaco() {
        let input = prepare_input("a b", 8, false);
        assert_eq!(input.tokens[2], WHITESPACE_SENTINEL);
        assert_eq!(input.text_len, 3);
    }

    #[test]
    fn test_minusculas_opcionais() {
        let caixa_alta = prepare_input("AB", 6, false);
        assert_eq!(caixa_alta.tokens[1], "A");
        let caixa_baixa = prepare_input("AB", 6, true);
        assert_eq!(caixa_baixa.tokens[1], "a");
    }

    #[test]
    fn test_orcamento_minimo_para_controle() {
        // max_length degenerado: só os tokens de controle, sem estourar
        for max_length in [0, 1, 2] {
            let input = prepare_input("abc", max_length, false);
            assert_eq!(input.tokens, vec![CLS_TOKEN, SEP_TOKEN]);
            assert_eq!(input.attention_mask, vec![1, 1]);
            assert_eq!(input.input_len, 2);
            assert_eq!(input.text_len, 0);
        }
    }

    #[test]
    fn test_truncamento() {
        let input = prepare_input("abcdef", 6, false);
        // orçamento de 4 caracteres + [CLS] + [SEP]
        assert_eq!(input.text_len, 4);
        assert_eq!(input.input_len, 6);
        assert_eq!(input.tokens.len(), 6);
        assert_eq!(input.tokens[5], SEP_TOKEN);
    }
}
