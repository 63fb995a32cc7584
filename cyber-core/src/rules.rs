//! # Motor de Regras Heurísticas
//!
//! O classificador aprende padrões estatísticos, mas erra em casos que um especialista
//! resolve com uma regra simples: "um numeral logo após um produto é uma versão",
//! "um token no formato `CVE-AAAA-NNNN` é um identificador CVE, diga o classificador o
//! que disser". O motor de regras corrige os rótulos com esse conhecimento.
//!
//! ## Semântica
//!
//! - Uma [`Rule`] é uma conjunção de [`Predicate`]s sobre os slots da janela e uma lista
//!   de [`Action`]s (slot → rótulo).
//! - Um [`RuleSet`] é avaliado em ordem para cada posição de foco: a **primeira** regra
//!   cujos predicados valem aplica suas ações e a avaliação para ali.
//! - Regras são escritas da mais específica para a menos específica; a ordem da tabela
//!   substitui qualquer resolução de conflitos.
//! - Uma regra sem predicados nunca dispara.
//!
//! As ações escrevem direto no armazém de rótulos da sentença, então uma regra pode
//! corrigir tokens anteriores ao foco (já finalizados) e antecipar rótulos à frente.
//!
//! Os padrões ficam guardados como texto (além de compilados), o que permite carregar
//! e salvar tabelas em JSON.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CyberError, Result};
use crate::label::Label;
use crate::window::{Slot, Window};

/// Expressão regular com o texto de origem preservado.
///
/// O teste é de busca (`is_match`), não de casamento total: use `^`/`$` para ancorar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let regex = Regex::new(&source).map_err(|e| CyberError::InvalidPattern {
            pattern: source.clone(),
            source: e,
        })?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl TryFrom<String> for Pattern {
    type Error = CyberError;

    fn try_from(s: String) -> Result<Self> {
        Pattern::new(s)
    }
}

impl From<Pattern> for String {
    fn from(p: Pattern) -> Self {
        p.source
    }
}

/// Condição sobre a janela.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// As palavras dos slots, unidas por espaço e na ordem dada, casam com pelo menos
    /// um dos padrões.
    Word {
        slots: Vec<Slot>,
        patterns: Vec<Pattern>,
    },
    /// O rótulo atual do slot é exatamente `label`. Slots fora da sentença nunca casam.
    Label { slot: Slot, label: Label },
}

impl Predicate {
    pub fn holds(&self, window: &Window<'_>) -> bool {
        match self {
            Predicate::Word { slots, patterns } => {
                let text = window.joined_words(slots);
                patterns.iter().any(|p| p.is_match(&text))
            }
            Predicate::Label { slot, label } => window.label(*slot) == Some(*label),
        }
    }
}

/// Atribuição de um rótulo a um slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub slot: Slot,
    pub label: Label,
}

/// Uma regra da tabela: predicados (E lógico) e ações.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub predicates: Vec<Predicate>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicates: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Exige que a palavra de um slot case com o padrão.
    pub fn when_word(self, slot: Slot, pattern: Pattern) -> Self {
        self.when_words(&[slot], vec![pattern])
    }

    /// Exige que a concatenação das palavras dos slots case com algum dos padrões.
    pub fn when_words(mut self, slots: &[Slot], patterns: Vec<Pattern>) -> Self {
        self.predicates.push(Predicate::Word {
            slots: slots.to_vec(),
            patterns,
        });
        self
    }

    /// Exige que o rótulo atual do slot seja `label`.
    pub fn when_label(mut self, slot: Slot, label: Label) -> Self {
        self.predicates.push(Predicate::Label { slot, label });
        self
    }

    /// Ao disparar, atribui `label` a cada um dos slots.
    pub fn then(mut self, slots: &[Slot], label: Label) -> Self {
        self.actions
            .extend(slots.iter().map(|&slot| Action { slot, label }));
        self
    }

    /// Verdadeiro se a regra tem ao menos um predicado e todos valem.
    pub fn matches(&self, window: &Window<'_>) -> bool {
        !self.predicates.is_empty() && self.predicates.iter().all(|p| p.holds(window))
    }

    pub fn apply(&self, window: &mut Window<'_>) {
        for action in &self.actions {
            window.set_label(action.slot, action.label);
        }
    }
}

/// Tabela ordenada de regras. Imutável depois de construída.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(CyberError::RulesParse)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| CyberError::RulesRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(CyberError::RulesParse)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Primeira regra cujos predicados valem na janela.
    pub fn first_match(&self, window: &Window<'_>) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(window))
    }

    /// Avalia a tabela na janela: aplica a primeira regra que casar.
    ///
    /// Retorna `true` se alguma regra disparou; caso contrário a janela fica intacta.
    pub fn evaluate(&self, window: &mut Window<'_>) -> bool {
        match self.first_match(window) {
            Some(rule) => {
                debug!(rule = %rule.name, focus = window.focus(), "rule fired");
                rule.apply(window);
                true
            }
            None => false,
        }
    }

    /// Tabela embutida de regras para versões, identificadores e símbolos.
    pub fn builtin() -> Self {
        use Slot::*;

        // Formatos típicos de número de versão
        let version_shapes = vec![
            builtin_pattern(r"^[0-9]+(\.|x)+[0-9a-zA-Z\-.]{1,}$"),
            builtin_pattern(r"^[0-9.x]{2,}\.+-[0-9a-zA-Z.]+$"),
            builtin_pattern(r"^[0-9.x]+\.?[a-zA-Z.]+$"),
            builtin_pattern(r"^[0-9.x]+_[a-zA-Z0-9.]+$"),
            builtin_pattern(r"^[0-9.x]+%[0-9a-zA-Z.]+$"),
            builtin_pattern(r"^[0-9.x]+-([0-9.]+[a-zA-Z0-9.\-_]*|[a-zA-Z0-9.\-_]*[0-9.]+)$"),
            builtin_pattern(r"^[0-9a-z\-_.]*%[0-9a-z\-_.]+"),
            builtin_pattern(r"-[a-zA-Z0-9.]+$"),
            builtin_pattern(r"^alpha[_0-9a-zA-Z.]*"),
            builtin_pattern(r"^beta[_0-9a-zA-Z.]*"),
            builtin_pattern(r"^[A-Z]{1,3}[0-9]$"),
        ];
        let version_char = builtin_pattern(r"[0-9x.\-]");
        let range_start = builtin_pattern(r"^(before|through) [0-9x.\-]");
        let and_earlier = builtin_pattern(r"[0-9x.][0-9x.\-]* and earlier$");
        let list_tail = builtin_pattern(r"^([,]|and) (and )?[0-9]$");
        let version_keyword = builtin_pattern(r"^[vV]ersion[_\-a-zA-Z0-9]* [0-9]");
        let all_versions = builtin_pattern(r"^(all|every) (supported )?(versions?|releases?)$");
        let prior_to = builtin_pattern(r"^prior to$");
        let numeral = builtin_pattern(r"[0-9]+");
        let pre_release = builtin_pattern(r"^pre[0-9a-zA-Z._-]* [0-9]");
        let release_update = builtin_pattern(r"^(release|[uU]pdate)[_\-a-zA-Z0-9]* [0-9]");

        let rules = vec![
            // Identificadores: valem independentemente do classificador
            Rule::new("cve_identifier")
                .when_word(Focus, builtin_pattern(r"CVE-[0-9]{4}-[0-9]{4}"))
                .then(&[Focus], Label::VulnCve),
            Rule::new("ms_bulletin")
                .when_word(Focus, builtin_pattern(r"MS[0-9]{2}-[0-9]{3}"))
                .then(&[Focus], Label::VulnMs),
            // Versões
            Rule::new("version_shape")
                .when_words(&[Focus], version_shapes)
                .when_label(Focus, Label::O)
                .then(&[Focus], Label::SwVersion),
            Rule::new("range_after_version")
                .when_words(&[Prev, Focus], vec![range_start.clone()])
                .when_label(Prev2, Label::SwVersion)
                .then(&[Focus, Prev], Label::SwVersion),
            Rule::new("range_start")
                .when_words(&[Prev, Focus], vec![range_start])
                .when_label(Focus, Label::O)
                .then(&[Focus, Prev], Label::SwVersion),
            Rule::new("version_char_after_product")
                .when_word(Focus, version_char)
                .when_label(Focus, Label::O)
                .when_label(Prev, Label::SwProduct)
                .then(&[Focus], Label::SwVersion),
            Rule::new("and_earlier")
                .when_words(&[Focus, Next, Next2], vec![and_earlier])
                .when_label(Focus, Label::O)
                .then(&[Focus, Next, Next2], Label::SwVersion),
            Rule::new("version_list_pair")
                .when_words(&[Next, Next2], vec![list_tail.clone()])
                .when_label(Focus, Label::SwVersion)
                .when_label(Next2, Label::O)
                .then(&[Next2], Label::SwVersion),
            Rule::new("version_list_triple")
                .when_words(&[Next, Next2, Next3], vec![list_tail.clone()])
                .when_label(Focus, Label::SwVersion)
                .when_label(Next3, Label::O)
                .then(&[Next3], Label::SwVersion),
            Rule::new("version_keyword")
                .when_words(&[Focus, Next], vec![version_keyword])
                .when_label(Focus, Label::O)
                .then(&[Next], Label::SwVersion),
            Rule::new("all_versions_prior_to")
                .when_words(&[Prev2, Prev, Focus], vec![all_versions.clone()])
                .when_words(&[Next, Next2], vec![prior_to])
                .then(&[Focus, Prev, Prev2, Next, Next2], Label::SwVersion),
            Rule::new("all_versions_long")
                .when_words(&[Prev2, Prev, Focus], vec![all_versions.clone()])
                .then(&[Focus, Prev, Prev2], Label::SwVersion),
            Rule::new("all_versions_short")
                .when_words(&[Prev, Focus], vec![all_versions])
                .then(&[Focus, Prev], Label::SwVersion),
            Rule::new("numeral_after_product")
                .when_word(Focus, numeral)
                .when_label(Prev, Label::SwProduct)
                .then(&[Focus], Label::SwVersion),
            Rule::new("release_list")
                .when_words(&[Focus, Next], vec![pre_release.clone(), release_update.clone()])
                .when_label(Focus, Label::O)
                .when_words(&[Next2, Next3], vec![list_tail])
                .then(&[Focus, Next, Next3], Label::SwVersion),
            Rule::new("pre_release")
                .when_words(&[Focus, Next], vec![pre_release])
                .when_label(Focus, Label::O)
                .then(&[Focus, Next], Label::SwVersion),
            Rule::new("release_update")
                .when_words(&[Focus, Next], vec![release_update])
                .when_label(Focus, Label::O)
                .then(&[Focus, Next], Label::SwVersion),
            // Símbolos
            Rule::new("function_symbol")
                .when_word(Focus, builtin_pattern(r"\(\)$"))
                .then(&[Focus], Label::SwSymbol),
            Rule::new("file_symbol")
                .when_word(Focus, builtin_pattern(r"^([a-zA-Z0-9.\-_/]+\.[a-zA-Z0-9]{1,4})$"))
                .when_label(Focus, Label::O)
                .then(&[Focus], Label::SwSymbol),
        ];

        Self::new(rules)
    }
}

// Padrões embutidos são constantes do código: um padrão inválido é erro de programação.
fn builtin_pattern(source: &str) -> Pattern {
    Pattern::new(source).expect("builtin rule pattern is invalid")
}
