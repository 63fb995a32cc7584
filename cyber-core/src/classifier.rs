//! # Classificador (Oráculo de Pontuação)
//!
//! O classificador estatístico é tratado como um oráculo: recebe o vetor de features
//! de uma posição e devolve uma pontuação por rótulo. O anotador só depende do trait
//! [`Classifier`]; o treinamento e a origem dos pesos ficam fora deste crate.
//!
//! [`PerceptronModel`] é a implementação padrão: um modelo linear (perceptron médio já
//! treinado) lido de um arquivo JSON de pesos.
//!
//! ## Formato do arquivo de pesos
//!
//! ```json
//! {
//!   "outcomes": ["O", "SW.Vendor", "SW.Product"],
//!   "weights": {
//!     "w=Microsoft": { "SW.Vendor": 2.5 },
//!     "pl_w=SW.Vendor_Windows": { "SW.Product": 1.75 }
//!   }
//! }
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use tracing::info;

use crate::config::ModelSource;
use crate::error::{CyberError, Result};
use crate::features::FeatureVector;
use crate::label::Label;

/// Pontuação por rótulo, na ordem de saída do modelo.
pub type Scores = Vec<(Label, f64)>;

/// Oráculo de classificação por token.
///
/// Implementações devem ser determinísticas: as mesmas features produzem as mesmas
/// pontuações. São compartilhadas entre threads quando vários documentos são anotados
/// em paralelo, daí `Send + Sync`.
pub trait Classifier: Send + Sync {
    /// Pontua todos os rótulos conhecidos para um vetor de features.
    fn score(&self, features: &FeatureVector) -> Scores;

    /// Escolhe o rótulo de maior pontuação. Empates ficam com o primeiro na ordem de
    /// saída; sem pontuações, devolve `O`.
    fn best_label(&self, scores: &[(Label, f64)]) -> Label {
        let mut best: Option<(Label, f64)> = None;
        for &(label, score) in scores {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label).unwrap_or(Label::O)
    }
}

#[derive(Deserialize)]
struct ModelFile {
    outcomes: Vec<String>,
    #[serde(default)]
    weights: HashMap<String, HashMap<String, f64>>,
}

/// Modelo linear com um vetor de pesos por rótulo de saída.
#[derive(Debug, Clone)]
pub struct PerceptronModel {
    outcomes: Vec<Label>,
    /// `weights[k]`: feature → peso para `outcomes[k]`.
    weights: Vec<HashMap<String, f64>>,
}

impl PerceptronModel {
    /// Carrega o modelo da origem configurada.
    ///
    /// Qualquer falha aqui é fatal para o anotador: não existe modo degradado sem
    /// classificador.
    pub fn load(source: &ModelSource) -> Result<Self> {
        match source {
            ModelSource::Path(path) => {
                info!(path = %path.display(), "loading model");
                let json = std::fs::read_to_string(path).map_err(|source| CyberError::ModelRead {
                    path: path.clone(),
                    source,
                })?;
                Self::from_json(&json)
            }
            ModelSource::Inline(json) => {
                info!("loading embedded model");
                Self::from_json(json)
            }
        }
    }

    /// Parseia o modelo a partir do JSON de pesos.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json).map_err(CyberError::ModelParse)?;
        if file.outcomes.is_empty() {
            return Err(CyberError::EmptyModel);
        }

        let outcomes = file
            .outcomes
            .iter()
            .map(|s| s.parse::<Label>())
            .collect::<Result<Vec<_>>>()?;

        let mut weights = vec![HashMap::new(); outcomes.len()];
        for (feature, per_label) in file.weights {
            for (label, weight) in per_label {
                let label: Label = label.parse()?;
                let k = outcomes
                    .iter()
                    .position(|o| *o == label)
                    .ok_or_else(|| CyberError::UnknownLabel(label.to_string()))?;
                weights[k].insert(feature.clone(), weight);
            }
        }

        info!(outcomes = outcomes.len(), "model loaded");
        Ok(Self { outcomes, weights })
    }

    pub fn outcomes(&self) -> &[Label] {
        &self.outcomes
    }
}

impl Classifier for PerceptronModel {
    /// Pontuações normalizadas (softmax) sobre os rótulos do modelo.
    fn score(&self, features: &FeatureVector) -> Scores {
        let raw: Vec<f64> = self.weights.iter().map(|w| features.dot(w)).collect();
        let probs = scores_to_probs(&raw);
        self.outcomes.iter().copied().zip(probs).collect()
    }
}

/// Softmax numericamente estável.
///
/// Pontuações `+inf` dividem toda a massa entre si. Se a soma degenerar (tudo `-inf`
/// ou `NaN`), a distribuição é uniforme.
pub fn scores_to_probs(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return vec![];
    }
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::INFINITY {
        let top = scores.iter().filter(|&&s| s == max).count() as f64;
        return scores
            .iter()
            .map(|&s| if s == max { 1.0 / top } else { 0.0 })
            .collect();
    }
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![1.0 / scores.len() as f64; scores.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MODEL: &str = r#"{
        "outcomes": ["O", "SW.Vendor", "SW.Product"],
        "weights": {
            "w=Microsoft": { "SW.Vendor": 3.0 },
            "w=Windows": { "SW.Product": 2.0 },
            "pl_w=SW.Vendor_Windows": { "SW.Product": 1.0 },
            "bias": { "O": 0.5 }
        }
    }"#;

    fn features(keys: &[&str]) -> FeatureVector {
        let mut fv = FeatureVector::new(0);
        fv.insert("bias", 1.0);
        for k in keys {
            fv.insert(*k, 1.0);
        }
        fv
    }

    #[test]
    fn test_scores_pick_highest_label() {
        let model = PerceptronModel::from_json(MODEL).unwrap();
        let scores = model.score(&features(&["w=Microsoft"]));
        assert_eq!(scores.len(), 3);
        assert_eq!(model.best_label(&scores), Label::SwVendor);

        let scores = model.score(&features(&["w=the"]));
        assert_eq!(model.best_label(&scores), Label::O);
    }

    #[test]
    fn test_scores_are_a_distribution() {
        let model = PerceptronModel::from_json(MODEL).unwrap();
        let scores = model.score(&features(&["w=Windows", "pl_w=SW.Vendor_Windows"]));
        let total: f64 = scores.iter().map(|(_, s)| s).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_deterministic() {
        let model = PerceptronModel::from_json(MODEL).unwrap();
        let fv = features(&["w=Windows"]);
        assert_eq!(model.score(&fv), model.score(&fv));
    }

    #[test]
    fn test_best_label_ties_go_to_first_outcome() {
        let model = PerceptronModel::from_json(MODEL).unwrap();
        let scores = vec![(Label::SwProduct, 0.5), (Label::SwVendor, 0.5)];
        assert_eq!(model.best_label(&scores), Label::SwProduct);
        assert_eq!(model.best_label(&[]), Label::O);
    }

    #[test]
    fn test_unknown_outcome_is_rejected() {
        let err = PerceptronModel::from_json(r#"{"outcomes": ["O", "B-PER"]}"#).unwrap_err();
        assert!(matches!(err, CyberError::UnknownLabel(ref l) if l == "B-PER"));
    }

    #[test]
    fn test_weight_for_label_outside_outcomes_is_rejected() {
        let json = r#"{"outcomes": ["O"], "weights": {"w=x": {"SW.Product": 1.0}}}"#;
        assert!(matches!(
            PerceptronModel::from_json(json),
            Err(CyberError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_empty_and_malformed_models_fail() {
        assert!(matches!(
            PerceptronModel::from_json(r#"{"outcomes": []}"#),
            Err(CyberError::EmptyModel)
        ));
        assert!(matches!(
            PerceptronModel::from_json("not json"),
            Err(CyberError::ModelParse(_))
        ));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MODEL.as_bytes()).unwrap();

        let model = PerceptronModel::load(&ModelSource::Path(file.path().to_path_buf())).unwrap();
        assert_eq!(
            model.outcomes(),
            &[Label::O, Label::SwVendor, Label::SwProduct]
        );
    }

    #[test]
    fn test_load_missing_file_fails() {
        let source = ModelSource::Path("/nonexistent/cyber-perceptron.json".into());
        assert!(matches!(
            PerceptronModel::load(&source),
            Err(CyberError::ModelRead { .. })
        ));
    }

    #[test]
    fn test_scores_to_probs() {
        let probs = scores_to_probs(&[1.0, 1.0]);
        assert!((probs[0] - 0.5).abs() < 1e-12);
        assert!(scores_to_probs(&[]).is_empty());
    }

    #[test]
    fn test_scores_to_probs_infinite_scores() {
        assert_eq!(scores_to_probs(&[0.0, f64::INFINITY, 1.0]), vec![0.0, 1.0, 0.0]);
        assert_eq!(
            scores_to_probs(&[f64::INFINITY, 2.0, f64::INFINITY]),
            vec![0.5, 0.0, 0.5]
        );
        assert_eq!(
            scores_to_probs(&[f64::NEG_INFINITY; 4]),
            vec![0.25; 4]
        );
        assert_eq!(scores_to_probs(&[f64::NAN, f64::NAN]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_infinite_score_wins_over_first_outcome() {
        let model = PerceptronModel::from_json(MODEL).unwrap();
        let mut fv = FeatureVector::new(0);
        fv.insert("w=Windows", f64::INFINITY);
        let scores = model.score(&fv);
        assert_eq!(model.best_label(&scores), Label::SwProduct);
    }
}
