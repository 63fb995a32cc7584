//! # Anotador: Passada Sequencial por Sentença
//!
//! Conecta os estágios, token a token e da esquerda para a direita:
//!
//! ```text
//! Janela ──▶ Classificador ──▶ Regras ──▶ rótulo final ──▶ Montagem de menções
//! ```
//!
//! 1. **Janela** ([`crate::window`]): monta o contexto do token em foco sobre o armazém
//!    de rótulos da sentença.
//! 2. **Classificador** ([`crate::classifier`]): pontua as features e escolhe o melhor
//!    rótulo. As features incluem os rótulos finais dos dois tokens anteriores, então a
//!    ordem importa.
//! 3. **Regras** ([`crate::rules`]): a primeira regra que casar reescreve rótulos do foco
//!    e/ou dos vizinhos.
//! 4. **Montagem** ([`crate::assembler`]): ao fim da sentença, os rótulos finais (já com
//!    as reescritas retroativas) viram menções.
//!
//! Tokens fixados por uma regra que olhou à frente não passam pelo classificador.
//!
//! Dentro de um documento tudo é sequencial. Documentos independentes podem ser anotados
//! em paralelo com [`CyberAnnotator::annotate_all`]: classificador e regras são apenas lidos.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{error, info, trace};

use crate::assembler::{MergePolicy, SpanAssembler};
use crate::classifier::{Classifier, PerceptronModel};
use crate::config::{AnnotatorConfig, ModelSource};
use crate::document::{Document, LabelStore, Sentence};
use crate::error::Result;
use crate::features::extract_for_window;
use crate::rules::RuleSet;
use crate::window::{Slot, Window};

/// Anotador de entidades de cibersegurança.
///
/// Clonar é barato: classificador e tabela de regras são compartilhados.
#[derive(Clone)]
pub struct CyberAnnotator {
    classifier: Arc<dyn Classifier>,
    rules: Arc<RuleSet>,
    assembler: SpanAssembler,
}

impl CyberAnnotator {
    pub fn new(classifier: Arc<dyn Classifier>, rules: RuleSet) -> Self {
        Self {
            classifier,
            rules: Arc::new(rules),
            assembler: SpanAssembler::default(),
        }
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.assembler = SpanAssembler::new(policy);
        self
    }

    /// Carrega o modelo de `source` (arquivo ou JSON embutido) e monta o anotador.
    ///
    /// Falha ao carregar o modelo é fatal: é registrada em `error` e devolvida para que o
    /// chamador aborte a inicialização.
    pub fn from_model_source(source: &ModelSource, rules: RuleSet) -> Result<Self> {
        let classifier = PerceptronModel::load(source).map_err(|e| {
            error!(source = %source, error = %e, "could not load cyber model");
            e
        })?;
        Ok(Self::new(Arc::new(classifier), rules))
    }

    /// Monta o anotador a partir da configuração.
    ///
    /// Falhas ao carregar a tabela de regras são tratadas como as do modelo.
    pub fn from_config(config: &AnnotatorConfig) -> Result<Self> {
        let rules = match &config.rules.path {
            Some(path) => {
                info!(path = %path.display(), "loading rule table");
                RuleSet::from_path(path).map_err(|e| {
                    error!(path = %path.display(), error = %e, "could not load rule table");
                    e
                })?
            }
            None => RuleSet::builtin(),
        };

        Ok(Self::from_model_source(&config.model_source(), rules)?
            .with_merge_policy(config.assembler.merge_policy))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Rotula os tokens da sentença e monta suas menções.
    ///
    /// Rótulos e menções anteriores da sentença são substituídos.
    pub fn annotate_sentence(&self, sentence: &mut Sentence) {
        let mut store = LabelStore::new(sentence.len());

        for i in 0..sentence.len() {
            let pinned = store.is_pinned(i);
            let mut window = Window::new(&sentence.tokens, &mut store, i);

            if !pinned {
                let features = extract_for_window(&window);
                let scores = self.classifier.score(&features);
                let label = self.classifier.best_label(&scores);
                window.set_label(Slot::Focus, label);
            }

            self.rules.evaluate(&mut window);

            trace!(
                sentence = sentence.index,
                token = i,
                word = %sentence.tokens[i].text,
                label = ?store.get(i),
                "label finalized"
            );
        }

        sentence.labels = store.into_labels();
        sentence.mentions = self.assembler.assemble(sentence.index, &sentence.labels);
    }

    /// Anota todas as sentenças do documento, em ordem.
    pub fn annotate(&self, document: &mut Document) {
        info!(
            document = %document.id,
            sentences = document.sentences.len(),
            "annotating with cyber labels"
        );
        for sentence in &mut document.sentences {
            self.annotate_sentence(sentence);
        }
    }

    /// Anota vários documentos independentes em paralelo.
    pub fn annotate_all(&self, documents: &mut [Document]) {
        documents
            .par_iter_mut()
            .for_each(|document| self.annotate(document));
    }
}

impl std::fmt::Debug for CyberAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CyberAnnotator")
            .field("rules", &self.rules.len())
            .field("merge_policy", &self.assembler.policy())
            .finish_non_exhaustive()
    }
}
