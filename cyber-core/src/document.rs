//! # Modelo de Dados: Tokens, Sentenças e Documentos
//!
//! A segmentação em sentenças, a tokenização e o etiquetamento morfossintático (POS)
//! acontecem fora deste crate. Aqui chegam sentenças já prontas: cada token traz o texto
//! e a tag POS. O anotador preenche, para cada sentença:
//!
//! - `labels`: o rótulo final de cada token (alinhado por índice com `tokens`);
//! - `mentions`: as menções de entidade montadas a partir desses rótulos.

use serde::{Deserialize, Serialize};

use crate::assembler::EntityMention;
use crate::label::Label;

/// Um token vindo do front-end linguístico. Imutável durante a anotação.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// O texto do token (ex: "Windows", "CVE-2014-1234", ",").
    pub text: String,
    /// Tag POS (ex: "NNP", "CD").
    pub pos: String,
}

impl Token {
    pub fn new(text: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: pos.into(),
        }
    }
}

/// Uma sentença com seus tokens e, após a anotação, rótulos e menções.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    /// Índice estável da sentença dentro do documento.
    pub index: usize,
    pub tokens: Vec<Token>,
    /// Rótulo final de cada token; `None` enquanto a sentença não foi anotada.
    pub labels: Vec<Option<Label>>,
    /// Menções de entidade, em ordem da esquerda para a direita.
    pub mentions: Vec<EntityMention>,
}

impl Sentence {
    pub fn new(index: usize, tokens: Vec<Token>) -> Self {
        let labels = vec![None; tokens.len()];
        Self {
            index,
            tokens,
            labels,
            mentions: Vec::new(),
        }
    }

    /// Atalho para montar sentenças a partir de pares `(texto, pos)`.
    pub fn from_pairs(index: usize, pairs: &[(&str, &str)]) -> Self {
        Self::new(
            index,
            pairs.iter().map(|(text, pos)| Token::new(*text, *pos)).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rótulo final do token `i`, se já anotado
    pub fn label(&self, i: usize) -> Option<Label> {
        self.labels.get(i).copied().flatten()
    }

    /// Itera sobre `(token, rótulo)`.
    pub fn tagged_tokens(&self) -> impl Iterator<Item = (&Token, Option<Label>)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .map(move |(i, token)| (token, self.label(i)))
    }

    /// Texto coberto por um intervalo de tokens `[start, end)`, unido por espaço.
    pub fn text_of(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        let start = start.min(end);
        self.tokens[start..end]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Um documento: sequência ordenada de sentenças.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(id: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        Self {
            id: id.into(),
            sentences,
        }
    }

    /// Todas as menções do documento, por sentença e em ordem.
    pub fn mentions(&self) -> impl Iterator<Item = &EntityMention> + '_ {
        self.sentences.iter().flat_map(|s| s.mentions.iter())
    }

    /// Menções agrupadas pelo índice da sentença, uma entrada por sentença.
    pub fn mentions_by_sentence(&self) -> impl Iterator<Item = (usize, &[EntityMention])> + '_ {
        self.sentences
            .iter()
            .map(|s| (s.index, s.mentions.as_slice()))
    }
}

/// Armazém mutável de rótulos de uma sentença durante a passada de anotação.
///
/// É o único lugar onde os rótulos vivem enquanto a passada acontece: a janela lê
/// daqui os rótulos já finalizados e as ações das regras escrevem aqui, inclusive em
/// posições anteriores ao foco (reescrita retroativa) e posteriores (escrita antecipada).
///
/// Uma escrita antecipada "fixa" o token: quando o foco chegar nele, o classificador não
/// é consultado e o rótulo da regra é mantido.
#[derive(Debug, Clone, Default)]
pub struct LabelStore {
    labels: Vec<Option<Label>>,
    pinned: Vec<bool>,
}

impl LabelStore {
    pub fn new(len: usize) -> Self {
        Self {
            labels: vec![None; len],
            pinned: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Label> {
        self.labels.get(i).copied().flatten()
    }

    /// Escreve o rótulo do token `i`. Índices fora da sentença são ignorados.
    pub fn set(&mut self, i: usize, label: Label) {
        if let Some(slot) = self.labels.get_mut(i) {
            *slot = Some(label);
        }
    }

    /// Escreve e fixa o rótulo do token `i` (escrita antecipada de uma regra).
    pub fn pin(&mut self, i: usize, label: Label) {
        if i < self.labels.len() {
            self.labels[i] = Some(label);
            self.pinned[i] = true;
        }
    }

    pub fn is_pinned(&self, i: usize) -> bool {
        self.pinned.get(i).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[Option<Label>] {
        &self.labels
    }

    pub fn into_labels(self) -> Vec<Option<Label>> {
        self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sentence_is_unlabeled() {
        let sentence = Sentence::from_pairs(3, &[("Windows", "NNP"), ("7", "CD")]);
        assert_eq!(sentence.index, 3);
        assert_eq!(sentence.len(), 2);
        assert_eq!(sentence.labels, vec![None, None]);
        assert!(sentence.mentions.is_empty());
        assert_eq!(sentence.label(5), None);
    }

    #[test]
    fn test_text_of_clamps_range() {
        let sentence = Sentence::from_pairs(0, &[("Oracle", "NNP"), ("Java", "NNP"), ("SE", "NNP")]);
        assert_eq!(sentence.text_of(1, 3), "Java SE");
        assert_eq!(sentence.text_of(2, 10), "SE");
        assert_eq!(sentence.text_of(4, 2), "");
    }

    #[test]
    fn test_label_store_ignores_out_of_range_writes() {
        let mut store = LabelStore::new(2);
        store.set(0, Label::SwVendor);
        store.set(7, Label::SwProduct);
        store.pin(9, Label::SwProduct);
        assert_eq!(store.as_slice(), &[Some(Label::SwVendor), None]);
        assert!(!store.is_pinned(9));
    }

    #[test]
    fn test_pin_marks_token() {
        let mut store = LabelStore::new(3);
        store.pin(2, Label::SwVersion);
        assert!(store.is_pinned(2));
        assert!(!store.is_pinned(1));
        assert_eq!(store.get(2), Some(Label::SwVersion));
    }
}
