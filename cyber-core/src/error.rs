//! Tipos de erro do crate.
//!
//! Todos os erros são recuperáveis do ponto de vista da biblioteca; quem decide abortar
//! (ex: falha ao carregar o modelo na inicialização) é o binário que embute o anotador.

use std::path::PathBuf;

use thiserror::Error;

/// Erro de alto nível para todas as operações do anotador.
#[derive(Debug, Error)]
pub enum CyberError {
    // --- Modelo ---
    #[error("could not read model from '{path}': {source}")]
    ModelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse model: {0}")]
    ModelParse(#[source] serde_json::Error),

    #[error("model has no outcomes")]
    EmptyModel,

    // --- Rótulos ---
    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    // --- Regras ---
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("could not read rule table from '{path}': {source}")]
    RulesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse rule table: {0}")]
    RulesParse(#[source] serde_json::Error),

    // --- Configuração ---
    #[error("could not read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Alias de `Result` com [`CyberError`].
pub type Result<T> = std::result::Result<T, CyberError>;
