//! # Features do Classificador Sequencial
//!
//! Para cada posição de foco, converte a [`Window`] em um vetor de features binárias.
//!
//! ## Features Implementadas
//!
//! - Palavra e tag POS do foco
//! - Palavra, tag e rótulo **finalizado** dos dois tokens anteriores
//! - Palavra e tag dos dois tokens seguintes (nunca rótulos: o classificador não vê o futuro)
//! - Combinações: bigrama dos dois rótulos anteriores; rótulo anterior + palavra do foco
//!
//! As combinações tornam o classificador **sequencial**: a decisão do token `i` depende
//! das decisões já finalizadas para `i-1` e `i-2`, incluindo reescritas feitas pelas regras.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::label::Label;
use crate::window::{Slot, Window};

/// Rótulo usado nas features quando a posição anterior cai fora da sentença.
pub const LABEL_PLACEHOLDER: Label = Label::O;

/// Mapa esparso de features ativas de um token.
///
/// Ex: `{"w=Windows": 1.0, "pl=SW.Vendor": 1.0, "pl_w=SW.Vendor_Windows": 1.0}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: HashMap<String, f64>,
    /// Índice do token em foco na sentença.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: HashMap::new(),
            token_index,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }

    /// Produto escalar com um vetor de pesos.
    pub fn dot(&self, weights: &HashMap<String, f64>) -> f64 {
        self.features
            .iter()
            .map(|(k, v)| v * weights.get(k).unwrap_or(&0.0))
            .sum()
    }
}

fn label_or_placeholder(window: &Window<'_>, slot: Slot) -> Label {
    window.label(slot).unwrap_or(LABEL_PLACEHOLDER)
}

/// Extrai as features da posição de foco da janela.
pub fn extract_for_window(window: &Window<'_>) -> FeatureVector {
    let mut fv = FeatureVector::new(window.focus());
    let word = window.word(Slot::Focus);

    fv.insert("bias", 1.0);
    fv.insert(format!("w={word}"), 1.0);
    fv.insert(format!("t={}", window.tag(Slot::Focus)), 1.0);

    let prev_label = label_or_placeholder(window, Slot::Prev);
    let prev2_label = label_or_placeholder(window, Slot::Prev2);

    // Contexto anterior
    fv.insert(format!("pw={}", window.word(Slot::Prev)), 1.0);
    fv.insert(format!("pt={}", window.tag(Slot::Prev)), 1.0);
    fv.insert(format!("pl={prev_label}"), 1.0);
    fv.insert(format!("ppw={}", window.word(Slot::Prev2)), 1.0);
    fv.insert(format!("ppt={}", window.tag(Slot::Prev2)), 1.0);
    fv.insert(format!("ppl={prev2_label}"), 1.0);

    // Contexto seguinte
    fv.insert(format!("nw={}", window.word(Slot::Next)), 1.0);
    fv.insert(format!("nt={}", window.tag(Slot::Next)), 1.0);
    fv.insert(format!("nnw={}", window.word(Slot::Next2)), 1.0);
    fv.insert(format!("nnt={}", window.tag(Slot::Next2)), 1.0);

    // Combinações
    fv.insert(format!("ppl_pl={prev2_label}_{prev_label}"), 1.0);
    fv.insert(format!("pl_w={prev_label}_{word}"), 1.0);

    fv
}
