//! # cyber-core — Reconhecimento de Entidades de Cibersegurança
//!
//! Rotula tokens de textos sobre segurança (avisos, boletins, descrições de CVE) com
//! rótulos de domínio, como fornecedor, produto, versão, símbolo e identificador de
//! vulnerabilidade, e agrupa tokens contíguos em menções de entidade.
//!
//! ## Arquitetura
//!
//! O front-end linguístico (segmentação, tokenização e POS) é externo: o crate recebe
//! [`Document`]s com sentenças já tokenizadas. Para cada sentença, da esquerda para a direita:
//!
//! 1. **Janela de contexto** ([`window`]): vizinhos `-2..=+3` do token em foco, com
//!    sentinelas nas bordas.
//! 2. **Classificador** ([`classifier`], [`features`]): modelo linear sequencial que vê os
//!    rótulos já finalizados dos dois tokens anteriores.
//! 3. **Motor de regras** ([`rules`]): tabela ordenada de regras; a primeira que casar
//!    corrige o foco e/ou vizinhos, inclusive tokens já finalizados.
//! 4. **Montagem de menções** ([`assembler`]): rótulos `Tipo.Subtipo` viram menções.
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use cyber_core::{AnnotatorConfig, CyberAnnotator, Document, Sentence};
//!
//! let config = AnnotatorConfig::with_model("cyber-perceptron.json");
//! let annotator = CyberAnnotator::from_config(&config).expect("model must load");
//!
//! let sentence = Sentence::from_pairs(0, &[
//!     ("Microsoft", "NNP"), ("Windows", "NNP"), ("7", "CD"),
//!     ("before", "IN"), ("SP1", "NNP"),
//! ]);
//! let mut doc = Document::new("advisory", vec![sentence]);
//! annotator.annotate(&mut doc);
//!
//! for mention in doc.mentions() {
//!     println!("{} {:?}", mention.label(), mention.head);
//! }
//! ```

pub mod annotator;
pub mod assembler;
pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod features;
pub mod label;
pub mod rules;
pub mod window;

pub use annotator::CyberAnnotator;
pub use assembler::{EntityMention, MentionId, MergePolicy, Span, SpanAssembler};
pub use classifier::{Classifier, PerceptronModel};
pub use config::{AnnotatorConfig, ModelSource};
pub use document::{Document, Sentence, Token};
pub use error::{CyberError, Result};
pub use label::{EntityType, Label};
pub use rules::{Pattern, Rule, RuleSet};
