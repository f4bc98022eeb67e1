use asset_extract::Category;
use serde::Deserialize;

/// Analysis request as submitted by the client.
///
/// Every field is optional at this layer so that missing values are reported
/// by [`validate`](super::validate) with a readable message instead of a
/// deserialization error. The form's original Portuguese field names are
/// accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(alias = "tipoInvestimento")]
    pub investment_type: Option<String>,

    #[serde(alias = "tipoAnalise")]
    pub analysis_type: Option<String>,

    #[serde(alias = "ativo")]
    pub asset: Option<String>,

    #[serde(alias = "ativoComparar")]
    pub compare_asset: Option<String>,

    #[serde(alias = "perfilInvestidor")]
    pub investor_profile: Option<String>,

    /// Profile quiz answers, used when the profile is "descobrir" or absent.
    #[serde(alias = "respostasPerfil")]
    pub profile_answers: Option<Vec<u8>>,

    #[serde(alias = "focoAnalise")]
    pub focus: Option<String>,

    #[serde(alias = "dataAnalise")]
    pub analysis_date: Option<String>,

    #[serde(alias = "observacao")]
    pub note: Option<String>,
}

/// What the request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestmentMode {
    /// Build a balanced portfolio; no single asset.
    Portfolio,
    /// Analyse one asset of the given category.
    Asset(Category),
}

impl InvestmentMode {
    /// Parse the investment type field.
    ///
    /// Anything mentioning a portfolio ("montar_carteira", "carteira
    /// balanceada") selects portfolio mode; otherwise the value must be a
    /// known category label.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        if ["carteira", "balanceada", "montar"]
            .iter()
            .any(|marker| lower.contains(marker))
        {
            return Some(Self::Portfolio);
        }
        Category::from_label(&lower).map(Self::Asset)
    }

    /// Category whose data-site pages should be fetched, if any.
    pub fn fetch_category(&self) -> Option<Category> {
        match self {
            Self::Portfolio | Self::Asset(Category::FixedIncome) => None,
            Self::Asset(category) => Some(*category),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisType {
    #[default]
    Complete,
    Fundamental,
    Technical,
    Dividends,
    RealEstateFund,
    Comparison,
    Sector,
    Summary,
}

impl AnalysisType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "completa" | "complete" => Some(Self::Complete),
            "fundamentalista" | "fundamental" => Some(Self::Fundamental),
            "tecnica" | "técnica" | "technical" => Some(Self::Technical),
            "dividendos" | "dividends" => Some(Self::Dividends),
            "fii" => Some(Self::RealEstateFund),
            "comparar" | "comparacao" | "comparação" | "comparison" => Some(Self::Comparison),
            "setor" | "sector" => Some(Self::Sector),
            "resumo" | "summary" => Some(Self::Summary),
            _ => None,
        }
    }

    /// Whether the form offers this analysis for `mode`.
    ///
    /// Complete and summary are always offered. Everything else needs an
    /// asset category that the data site covers in depth.
    pub fn available_for(&self, mode: InvestmentMode) -> bool {
        let InvestmentMode::Asset(category) = mode else {
            return matches!(self, Self::Complete | Self::Summary);
        };
        match self {
            Self::Complete | Self::Summary => true,
            Self::Dividends => category == Category::Stock,
            Self::Technical => matches!(category, Category::Stock | Category::Etf),
            Self::RealEstateFund => category == Category::RealEstateFund,
            Self::Fundamental | Self::Comparison | Self::Sector => matches!(
                category,
                Category::Stock | Category::RealEstateFund | Category::Etf
            ),
        }
    }

    /// Instruction fragment describing the kind of analysis.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Complete => "análise completa (fundamentos, dividendos e contexto de mercado)",
            Self::Fundamental => "análise fundamentalista",
            Self::Technical => "análise técnica (tendência, suportes e resistências)",
            Self::Dividends => "análise focada em dividendos",
            Self::RealEstateFund => "análise de fundo imobiliário",
            Self::Comparison => "comparação entre dois ativos",
            Self::Sector => "análise do setor de atuação",
            Self::Summary => "resumo curto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestorProfile {
    Conservative,
    Moderate,
    Aggressive,
}

/// Label that asks for the profile to be derived from the quiz answers.
pub const DISCOVER_PROFILE: &str = "descobrir";

/// Number of questions in the profile quiz.
pub const QUIZ_QUESTIONS: usize = 5;

impl InvestorProfile {
    /// Profile from the five quiz answers, each scored 1 (cautious) to 3 (bold).
    ///
    /// A total of 7 or less is conservative, 8 to 11 moderate, above that
    /// aggressive. Answers outside 1..=3 are rejected.
    pub fn from_quiz(answers: &[u8; QUIZ_QUESTIONS]) -> Option<Self> {
        if answers.iter().any(|a| !(1..=3).contains(a)) {
            return None;
        }
        let total: u8 = answers.iter().sum();
        Some(match total {
            0..=7 => Self::Conservative,
            8..=11 => Self::Moderate,
            _ => Self::Aggressive,
        })
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "conservador" | "conservative" => Some(Self::Conservative),
            "moderado" | "moderate" => Some(Self::Moderate),
            "agressivo" | "arrojado" | "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Conservative => "conservador",
            Self::Moderate => "moderado",
            Self::Aggressive => "agressivo",
        }
    }
}

/// A validated request, ready for data collection and prompting.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPlan {
    pub mode: InvestmentMode,
    pub analysis_type: AnalysisType,
    /// Present unless `mode` is [`InvestmentMode::Portfolio`].
    pub asset: Option<String>,
    /// Present when `analysis_type` is [`AnalysisType::Comparison`].
    pub compare_asset: Option<String>,
    pub profile: InvestorProfile,
    pub focus: Option<String>,
    pub analysis_date: String,
    pub note: Option<String>,
}

impl AnalysisPlan {
    /// Assets to look up on the data site, primary first.
    pub fn assets_to_fetch(&self) -> Vec<(&str, Category)> {
        let Some(category) = self.mode.fetch_category() else {
            return Vec::new();
        };
        self.asset
            .iter()
            .chain(self.compare_asset.iter())
            .map(|asset| (asset.as_str(), category))
            .collect()
    }
}
