//! # Taxonomia de Rótulos de Cibersegurança
//!
//! Cada token recebe exatamente um rótulo. O rótulo `O` indica "fora de entidade";
//! os demais seguem o formato pontuado `Tipo.Subtipo`.
//!
//! | Rótulo             | Significado                           | Exemplos                  |
//! |--------------------|---------------------------------------|---------------------------|
//! | `SW.Vendor`        | Fornecedor de software                | Microsoft, Oracle         |
//! | `SW.Product`       | Produto de software                   | Windows, Java             |
//! | `SW.Version`       | Versão                                | 7, 1.6.0_20, before SP1   |
//! | `SW.Symbol`        | Símbolo (função, arquivo, método)     | `strcpy()`, file.php      |
//! | `VULN.MS`          | Boletim de segurança da Microsoft     | MS14-012                  |
//! | `VULN.CVE`         | Identificador CVE                     | CVE-2014-1234             |
//! | `VULN.Name`        | Nome da vulnerabilidade               | Heartbleed                |
//! | `VULN.Description` | Descrição da vulnerabilidade          | cross-site scripting      |
//! | `SW`, `VULN`       | Apenas o tipo, sem subtipo            |                           |
//! | `O`                | Fora de entidade                      | has, in                   |
//!
//! Rótulos sem subtipo (`SW`, `VULN`) são válidos para o classificador, mas não geram
//! menções: o montador de spans exige o ponto separador.

use serde::{Deserialize, Serialize};

use crate::error::CyberError;

/// Tipo de entidade (a parte antes do ponto).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    /// **Software**: fornecedores, produtos, versões e símbolos.
    #[serde(rename = "SW")]
    Sw,
    /// **Vulnerabilidade**: identificadores, nomes e descrições.
    #[serde(rename = "VULN")]
    Vuln,
}

impl EntityType {
    /// Nome do tipo como aparece no rótulo (ex: "SW")
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::Sw => "SW",
            EntityType::Vuln => "VULN",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "SW" => Some(EntityType::Sw),
            "VULN" => Some(EntityType::Vuln),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rótulo atribuído a um token.
///
/// Serializa como a string pontuada (ex: `"VULN.CVE"`), que é o mesmo formato usado
/// nos arquivos de modelo e nas tabelas de regras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Label {
    /// **Outside**: o token não pertence a nenhuma entidade.
    O,
    /// Tipo `SW` sem subtipo.
    Sw,
    SwVendor,
    SwProduct,
    SwVersion,
    SwSymbol,
    /// Tipo `VULN` sem subtipo.
    Vuln,
    VulnMs,
    VulnCve,
    VulnName,
    VulnDescription,
}

impl Label {
    /// Todos os rótulos, na ordem de declaração
    pub const ALL: [Label; 11] = [
        Label::O,
        Label::Sw,
        Label::SwVendor,
        Label::SwProduct,
        Label::SwVersion,
        Label::SwSymbol,
        Label::Vuln,
        Label::VulnMs,
        Label::VulnCve,
        Label::VulnName,
        Label::VulnDescription,
    ];

    /// Representação textual (ex: "SW.Product", "O")
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::O => "O",
            Label::Sw => "SW",
            Label::SwVendor => "SW.Vendor",
            Label::SwProduct => "SW.Product",
            Label::SwVersion => "SW.Version",
            Label::SwSymbol => "SW.Symbol",
            Label::Vuln => "VULN",
            Label::VulnMs => "VULN.MS",
            Label::VulnCve => "VULN.CVE",
            Label::VulnName => "VULN.Name",
            Label::VulnDescription => "VULN.Description",
        }
    }

    /// Parseia a partir da string pontuada (ex: "VULN.CVE" → Some(VulnCve))
    pub fn from_label(s: &str) -> Option<Self> {
        Label::ALL.iter().copied().find(|l| l.as_str() == s)
    }

    /// Verdadeiro para o rótulo "fora de entidade"
    pub fn is_outside(&self) -> bool {
        matches!(self, Label::O)
    }

    /// Tipo da entidade, se houver (ex: `SW.Product` → `SW`)
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            Label::O => None,
            Label::Sw | Label::SwVendor | Label::SwProduct | Label::SwVersion | Label::SwSymbol => {
                Some(EntityType::Sw)
            }
            Label::Vuln
            | Label::VulnMs
            | Label::VulnCve
            | Label::VulnName
            | Label::VulnDescription => Some(EntityType::Vuln),
        }
    }

    /// Subtipo (a parte depois do ponto), se o rótulo tiver um
    pub fn subtype(&self) -> Option<&'static str> {
        self.split().map(|(_, sub)| sub)
    }

    /// Divide o rótulo em `(tipo, subtipo)`.
    ///
    /// Retorna `None` para `O` e para rótulos sem ponto (`SW`, `VULN`).
    pub fn split(&self) -> Option<(EntityType, &'static str)> {
        let (_, sub) = self.as_str().split_once('.')?;
        Some((self.entity_type()?, sub))
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Label {
    type Err = CyberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::from_label(s).ok_or_else(|| CyberError::UnknownLabel(s.to_string()))
    }
}

impl TryFrom<String> for Label {
    type Error = CyberError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.as_str().to_string()
    }
}
