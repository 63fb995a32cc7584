//! # Janela de Contexto
//!
//! Para cada token em foco, a janela expõe os vizinhos por deslocamento relativo:
//! dois antes, o foco e até três depois.
//!
//! ```text
//!   Prev2   Prev   [Focus]   Next   Next2   Next3
//!    -2      -1       0       +1     +2      +3
//! ```
//!
//! Posições fora da sentença nunca são erro: devolvem valores sentinela
//! (`_PREVIOUS_` / `_NEXT_` para a palavra, `_POS_` para a tag e "sem rótulo" para o
//! rótulo), de modo que os predicados das regras são totais nas bordas.
//!
//! A janela não copia rótulos: ela empresta o [`LabelStore`] da sentença com acesso
//! exclusivo. Assim, quando uma regra reescreve o rótulo de um vizinho, a mudança é
//! persistente e visível nas próximas posições de foco.

use serde::{Deserialize, Serialize};

use crate::document::{LabelStore, Token};
use crate::label::Label;

/// Palavra sentinela para posições antes do início da sentença.
pub const PREV_WORD: &str = "_PREVIOUS_";
/// Palavra sentinela para posições depois do fim da sentença.
pub const NEXT_WORD: &str = "_NEXT_";
/// Tag POS sentinela.
pub const POS_PLACEHOLDER: &str = "_POS_";

/// Posição relativa ao foco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Prev2,
    Prev,
    Focus,
    Next,
    Next2,
    Next3,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Prev2,
        Slot::Prev,
        Slot::Focus,
        Slot::Next,
        Slot::Next2,
        Slot::Next3,
    ];

    /// Deslocamento em relação ao foco
    pub fn offset(&self) -> isize {
        match self {
            Slot::Prev2 => -2,
            Slot::Prev => -1,
            Slot::Focus => 0,
            Slot::Next => 1,
            Slot::Next2 => 2,
            Slot::Next3 => 3,
        }
    }
}

/// Visão de uma posição de foco sobre os tokens e o armazém de rótulos da sentença.
#[derive(Debug)]
pub struct Window<'a> {
    tokens: &'a [Token],
    labels: &'a mut LabelStore,
    focus: usize,
}

impl<'a> Window<'a> {
    pub fn new(tokens: &'a [Token], labels: &'a mut LabelStore, focus: usize) -> Self {
        Self {
            tokens,
            labels,
            focus,
        }
    }

    /// Índice do token em foco na sentença
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Índice absoluto do slot, se estiver dentro da sentença
    pub fn index(&self, slot: Slot) -> Option<usize> {
        let i = self.focus.checked_add_signed(slot.offset())?;
        (i < self.tokens.len()).then_some(i)
    }

    pub fn word(&self, slot: Slot) -> &str {
        match self.index(slot) {
            Some(i) => &self.tokens[i].text,
            None if slot.offset() < 0 => PREV_WORD,
            None => NEXT_WORD,
        }
    }

    pub fn tag(&self, slot: Slot) -> &str {
        match self.index(slot) {
            Some(i) => &self.tokens[i].pos,
            None => POS_PLACEHOLDER,
        }
    }

    /// Rótulo atual do slot.
    ///
    /// `None` fora da sentença (nunca igual a um rótulo exigido). Dentro da sentença, um
    /// token ainda não rotulado (à frente do foco) é lido como `O`.
    pub fn label(&self, slot: Slot) -> Option<Label> {
        self.index(slot)
            .map(|i| self.labels.get(i).unwrap_or(Label::O))
    }

    /// Palavras dos slots, na ordem dada, unidas por um espaço.
    pub fn joined_words(&self, slots: &[Slot]) -> String {
        slots
            .iter()
            .map(|&slot| self.word(slot))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Atribui um rótulo ao slot, direto no armazém da sentença.
    ///
    /// Slots à frente do foco ficam fixados; slots fora da sentença são ignorados.
    pub fn set_label(&mut self, slot: Slot, label: Label) {
        let Some(i) = self.index(slot) else {
            return;
        };
        if slot.offset() > 0 {
            self.labels.pin(i, label);
        } else {
            self.labels.set(i, label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| Token::new(*w, "NN")).collect()
    }

    #[test]
    fn test_single_token_sentence_uses_sentinels() {
        let toks = tokens(&["Windows"]);
        let mut store = LabelStore::new(1);
        let window = Window::new(&toks, &mut store, 0);

        assert_eq!(window.word(Slot::Focus), "Windows");
        assert_eq!(window.word(Slot::Prev), PREV_WORD);
        assert_eq!(window.word(Slot::Prev2), PREV_WORD);
        assert_eq!(window.word(Slot::Next), NEXT_WORD);
        assert_eq!(window.word(Slot::Next3), NEXT_WORD);
        assert_eq!(window.tag(Slot::Prev), POS_PLACEHOLDER);
        assert_eq!(window.tag(Slot::Next2), POS_PLACEHOLDER);
        assert_eq!(window.label(Slot::Prev), None);
        assert_eq!(window.label(Slot::Next), None);
    }

    #[test]
    fn test_two_token_sentence_boundaries() {
        let toks = tokens(&["Oracle", "Java"]);
        let mut store = LabelStore::new(2);
        store.set(0, Label::SwVendor);

        let window = Window::new(&toks, &mut store, 1);
        assert_eq!(window.word(Slot::Prev), "Oracle");
        assert_eq!(window.word(Slot::Prev2), PREV_WORD);
        assert_eq!(window.word(Slot::Next), NEXT_WORD);
        assert_eq!(window.label(Slot::Prev), Some(Label::SwVendor));
        // O próprio foco ainda sem rótulo é lido como O
        assert_eq!(window.label(Slot::Focus), Some(Label::O));
    }

    #[test]
    fn test_joined_words() {
        let toks = tokens(&["all", "supported", "versions"]);
        let mut store = LabelStore::new(3);
        let window = Window::new(&toks, &mut store, 2);
        assert_eq!(
            window.joined_words(&[Slot::Prev2, Slot::Prev, Slot::Focus]),
            "all supported versions"
        );
        assert_eq!(window.joined_words(&[Slot::Focus, Slot::Next]), "versions _NEXT_");
    }

    #[test]
    fn test_set_label_writes_through_and_pins_forward() {
        let toks = tokens(&["a", "b", "c"]);
        let mut store = LabelStore::new(3);
        {
            let mut window = Window::new(&toks, &mut store, 1);
            window.set_label(Slot::Prev, Label::SwProduct);
            window.set_label(Slot::Next, Label::SwVersion);
            window.set_label(Slot::Next3, Label::SwVersion);
        }
        assert_eq!(store.get(0), Some(Label::SwProduct));
        assert!(!store.is_pinned(0));
        assert_eq!(store.get(2), Some(Label::SwVersion));
        assert!(store.is_pinned(2));
    }
}
