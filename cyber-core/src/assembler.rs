//! # Montagem de Menções (Spans)
//!
//! Converte a sequência final de rótulos de uma sentença em menções de entidade.
//!
//! ## Algoritmo
//!
//! 1. Tokens com rótulo `O` ou sem subtipo (`SW`, `VULN`) são ignorados.
//! 2. Cada token restante vira um span de um token `[i, i+1)`.
//! 3. Se a política de junção permitir e o tipo+subtipo for igual ao da última menção,
//!    o span da última menção cresce até incluir o token (cobrindo qualquer lacuna).
//! 4. Caso contrário, uma nova menção é criada.
//!
//! ## Política de junção
//!
//! Com [`MergePolicy::Legacy`] a junção só acontece quando a sentença **já tem mais de
//! uma** menção. Assim, `[O, SW.Product, SW.Product]` gera duas menções separadas de
//! um token; só a partir da terceira menção os tokens passam a se juntar à última.
//! [`MergePolicy::Eager`] junta desde a primeira menção.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::label::{EntityType, Label};

/// Intervalo semiaberto de tokens `[start, end)` dentro da sentença.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span de um único token
    pub fn single(index: usize) -> Self {
        Self::new(index, index + 1)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cresce para cobrir `other` (e tudo que houver entre os dois).
    pub fn expand_to_include(&mut self, other: Span) {
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
    }
}

static NEXT_MENTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identificador único de menção no processo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MentionId(pub u64);

impl MentionId {
    pub fn next() -> Self {
        MentionId(NEXT_MENTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for MentionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityMention-{}", self.0)
    }
}

/// Uma menção de entidade dentro de uma sentença.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub id: MentionId,
    /// Índice da sentença dona da menção.
    pub sentence_index: usize,
    pub head: Span,
    pub extent: Span,
    pub entity_type: EntityType,
    pub subtype: Option<String>,
    /// Valor normalizado (ex: versão canônica). Ainda não preenchido pelo anotador.
    pub value: Option<String>,
}

impl EntityMention {
    /// Menção de um token a partir de um rótulo com subtipo.
    pub fn from_label(sentence_index: usize, index: usize, label: Label) -> Option<Self> {
        let (entity_type, subtype) = label.split()?;
        let span = Span::single(index);
        Some(Self {
            id: MentionId::next(),
            sentence_index,
            head: span,
            extent: span,
            entity_type,
            subtype: Some(subtype.to_string()),
            value: None,
        })
    }

    /// Mesmo tipo e mesmo subtipo
    pub fn label_equals(&self, other: &EntityMention) -> bool {
        self.entity_type == other.entity_type && self.subtype == other.subtype
    }

    /// Rótulo pontuado correspondente (ex: "VULN.CVE")
    pub fn label(&self) -> String {
        match &self.subtype {
            Some(sub) => format!("{}.{}", self.entity_type, sub),
            None => self.entity_type.to_string(),
        }
    }

    /// Estende head e extent para incluir o span.
    pub fn expand_to_include(&mut self, span: Span) {
        self.head.expand_to_include(span);
        self.extent.expand_to_include(span);
    }
}

/// Quando um token pode se juntar à última menção da sentença.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Junta só quando a sentença já tem mais de uma menção.
    #[default]
    Legacy,
    /// Junta sempre que existir uma menção anterior com o mesmo rótulo.
    Eager,
}

impl MergePolicy {
    /// Número mínimo de menções já existentes para permitir a junção
    fn min_existing(&self) -> usize {
        match self {
            MergePolicy::Legacy => 2,
            MergePolicy::Eager => 1,
        }
    }
}

/// Montador de menções por sentença.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanAssembler {
    policy: MergePolicy,
}

impl SpanAssembler {
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Adiciona o token `index` com rótulo `label` às menções da sentença.
    pub fn push(
        &self,
        mentions: &mut Vec<EntityMention>,
        sentence_index: usize,
        index: usize,
        label: Label,
    ) {
        let Some(mention) = EntityMention::from_label(sentence_index, index, label) else {
            return;
        };

        if mentions.len() >= self.policy.min_existing() {
            if let Some(last) = mentions.last_mut() {
                if last.label_equals(&mention) {
                    last.expand_to_include(mention.head);
                    return;
                }
            }
        }
        mentions.push(mention);
    }

    /// Monta as menções de uma sentença a partir dos rótulos finais.
    ///
    /// Tokens sem rótulo (`None`) são tratados como `O`.
    pub fn assemble(&self, sentence_index: usize, labels: &[Option<Label>]) -> Vec<EntityMention> {
        let mut mentions = Vec::new();
        for (i, label) in labels.iter().enumerate() {
            if let Some(label) = label {
                self.push(&mut mentions, sentence_index, i, *label);
            }
        }
        mentions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(ls: &[Label]) -> Vec<Option<Label>> {
        ls.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_cve_tokens_become_one_mention_with_eager_merge() {
        // "CVE", "-", "2014", "-", "1234"
        let assembler = SpanAssembler::new(MergePolicy::Eager);
        let mentions = assembler.assemble(0, &labels(&[Label::VulnCve; 5]));

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].head, Span::new(0, 5));
        assert_eq!(mentions[0].entity_type, EntityType::Vuln);
        assert_eq!(mentions[0].subtype.as_deref(), Some("CVE"));
        assert_eq!(mentions[0].label(), "VULN.CVE");
    }

    #[test]
    fn test_cve_tokens_with_legacy_merge() {
        let assembler = SpanAssembler::new(MergePolicy::Legacy);
        let mentions = assembler.assemble(0, &labels(&[Label::VulnCve; 5]));

        // A segunda menção não se junta à primeira; as demais se juntam à segunda.
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].head, Span::new(0, 1));
        assert_eq!(mentions[1].head, Span::new(1, 5));
        assert_eq!(mentions[1].extent, Span::new(1, 5));
    }

    #[test]
    fn test_legacy_does_not_merge_with_single_previous_mention() {
        let assembler = SpanAssembler::default();
        let mut mentions =
            assembler.assemble(4, &labels(&[Label::O, Label::SwProduct, Label::SwProduct]));

        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].head, Span::new(1, 2));
        assert_eq!(mentions[1].head, Span::new(2, 3));
        assert!(mentions[0].label_equals(&mentions[1]));
        assert_ne!(mentions[0].id, mentions[1].id);

        // Mais tarde na sentença, com duas menções já existentes, o token se junta.
        assembler.push(&mut mentions, 4, 5, Label::SwProduct);
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[1].head, Span::new(2, 6));
        assert!(mentions.iter().all(|m| m.sentence_index == 4));
    }

    #[test]
    fn test_outside_and_type_only_labels_are_skipped() {
        let assembler = SpanAssembler::new(MergePolicy::Eager);
        let mentions = assembler.assemble(
            0,
            &[Some(Label::O), Some(Label::Sw), None, Some(Label::Vuln)],
        );
        assert!(mentions.is_empty());
    }

    #[test]
    fn test_different_labels_start_new_mentions() {
        let assembler = SpanAssembler::new(MergePolicy::Eager);
        let mentions = assembler.assemble(
            0,
            &labels(&[Label::SwVendor, Label::SwProduct, Label::SwProduct, Label::SwVersion]),
        );
        let spans: Vec<(String, Span)> = mentions.iter().map(|m| (m.label(), m.head)).collect();
        assert_eq!(
            spans,
            vec![
                ("SW.Vendor".to_string(), Span::new(0, 1)),
                ("SW.Product".to_string(), Span::new(1, 3)),
                ("SW.Version".to_string(), Span::new(3, 4)),
            ]
        );
    }

    #[test]
    fn test_merge_covers_gap() {
        let assembler = SpanAssembler::new(MergePolicy::Eager);
        let mentions = assembler.assemble(
            0,
            &labels(&[Label::SwVersion, Label::O, Label::SwVersion]),
        );
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].head, Span::new(0, 3));
    }

    #[test]
    fn test_mentions_are_ordered_and_non_empty() {
        let assembler = SpanAssembler::default();
        let mentions = assembler.assemble(
            0,
            &labels(&[
                Label::SwVendor,
                Label::SwProduct,
                Label::SwVersion,
                Label::O,
                Label::VulnCve,
            ]),
        );
        assert!(mentions.iter().all(|m| !m.head.is_empty()));
        assert!(mentions.windows(2).all(|w| w[0].head.end <= w[1].head.start));
    }

    #[test]
    fn test_span_expand() {
        let mut span = Span::single(3);
        span.expand_to_include(Span::single(6));
        assert_eq!(span, Span::new(3, 7));
        assert_eq!(span.len(), 4);
    }

    #[test]
    fn test_mention_id_display() {
        assert_eq!(MentionId(7).to_string(), "EntityMention-7");
        assert!(MentionId::next() < MentionId::next());
    }
}
