//! Configuração do anotador, lida de TOML.
//!
//! ```toml
//! [model]
//! path = "cyber-perceptron.json"
//!
//! [rules]
//! path = "rules.json"          # opcional: sem ele, usa a tabela embutida
//!
//! [assembler]
//! merge_policy = "legacy"      # ou "eager"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assembler::MergePolicy;
use crate::error::{CyberError, Result};

/// Origem dos pesos do classificador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Arquivo JSON no sistema de arquivos.
    Path(PathBuf),
    /// JSON já em memória (ex: embutido com `include_str!`).
    Inline(String),
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::Path(path) => write!(f, "{}", path.display()),
            ModelSource::Inline(_) => write!(f, "<embedded>"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Tabela de regras em JSON. Ausente: tabela embutida.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblerConfig {
    #[serde(default)]
    pub merge_policy: MergePolicy,
}

/// Configuração de alto nível.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub assembler: AssemblerConfig,
}

impl AnnotatorConfig {
    /// Configuração mínima apontando para um arquivo de modelo.
    pub fn with_model(path: impl Into<PathBuf>) -> Self {
        Self {
            model: ModelConfig { path: path.into() },
            rules: RulesConfig::default(),
            assembler: AssemblerConfig::default(),
        }
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Lê a configuração de um arquivo TOML. Caminhos relativos de modelo e regras
    /// são resolvidos a partir do diretório do arquivo.
    pub fn from_path(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).map_err(|source| CyberError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&s)?;
        if let Some(base) = path.parent() {
            config.model.path = resolve(base, &config.model.path);
            if let Some(rules) = config.rules.path.as_mut() {
                *rules = resolve(base, rules);
            }
        }
        Ok(config)
    }

    pub fn model_source(&self) -> ModelSource {
        ModelSource::Path(self.model.path.clone())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AnnotatorConfig::from_toml("[model]\npath = \"cyber.json\"\n").unwrap();
        assert_eq!(config.model.path, PathBuf::from("cyber.json"));
        assert!(config.rules.path.is_none());
        assert_eq!(config.assembler.merge_policy, MergePolicy::Legacy);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [model]
            path = "/models/cyber.json"

            [rules]
            path = "rules.json"

            [assembler]
            merge_policy = "eager"
        "#;
        let config = AnnotatorConfig::from_toml(toml).unwrap();
        assert_eq!(config.rules.path, Some(PathBuf::from("rules.json")));
        assert_eq!(config.assembler.merge_policy, MergePolicy::Eager);
        assert_eq!(
            config.model_source(),
            ModelSource::Path(PathBuf::from("/models/cyber.json"))
        );
        assert_eq!(config.model_source().to_string(), "/models/cyber.json");
        assert_eq!(ModelSource::Inline("{}".into()).to_string(), "<embedded>");
    }

    #[test]
    fn test_missing_model_section_is_an_error() {
        assert!(matches!(
            AnnotatorConfig::from_toml("[assembler]\nmerge_policy = \"eager\"\n"),
            Err(CyberError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_from_path_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cyber.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[model]\npath = \"model.json\"\n[rules]\npath = \"/abs/rules.json\"").unwrap();

        let config = AnnotatorConfig::from_path(&path).unwrap();
        assert_eq!(config.model.path, dir.path().join("model.json"));
        assert_eq!(config.rules.path, Some(PathBuf::from("/abs/rules.json")));
    }
}
