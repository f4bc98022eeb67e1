use thiserror::Error;

use super::models::{
    AnalysisPlan, AnalysisRequest, AnalysisType, InvestmentMode, InvestorProfile, DISCOVER_PROFILE,
    QUIZ_QUESTIONS,
};

/// Reasons a request is rejected before any work is done.
///
/// Display strings are shown to the end user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Tipo de investimento é obrigatório.")]
    MissingInvestmentType,

    #[error("Tipo de investimento desconhecido: {0}.")]
    UnknownInvestmentType(String),

    #[error("Tipo de análise desconhecido: {0}.")]
    UnknownAnalysisType(String),

    #[error("Informe o ativo.")]
    MissingAsset,

    #[error("Informe o ativo para comparação.")]
    MissingCompareAsset,

    #[error("Informe a data da análise.")]
    MissingAnalysisDate,

    #[error("Perfil obrigatório.")]
    MissingProfile,

    #[error("Perfil de investidor desconhecido: {0}. Use conservador, moderado ou agressivo.")]
    UnknownProfile(String),

    #[error("Responda as 5 perguntas do perfil com valores de 1 a 3.")]
    IncompleteProfileQuiz,
}

/// Trimmed, non-empty value of an optional field.
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check a request and turn it into an [`AnalysisPlan`].
///
/// Checks run in form order so the user sees the first problem first.
pub fn validate(request: &AnalysisRequest) -> Result<AnalysisPlan, ValidationError> {
    let investment_type =
        present(&request.investment_type).ok_or(ValidationError::MissingInvestmentType)?;
    let mode = InvestmentMode::from_label(&investment_type)
        .ok_or_else(|| ValidationError::UnknownInvestmentType(investment_type.clone()))?;

    let analysis_type = match present(&request.analysis_type) {
        Some(label) => AnalysisType::from_label(&label)
            .ok_or(ValidationError::UnknownAnalysisType(label))?,
        None => AnalysisType::default(),
    };
    // Types the form would not offer for this mode fall back to complete
    let analysis_type = if analysis_type.available_for(mode) {
        analysis_type
    } else {
        AnalysisType::default()
    };

    let asset = match mode {
        InvestmentMode::Portfolio => None,
        InvestmentMode::Asset(_) => Some(present(&request.asset).ok_or(ValidationError::MissingAsset)?),
    };

    let compare_asset = match (mode, analysis_type) {
        (InvestmentMode::Asset(_), AnalysisType::Comparison) => Some(
            present(&request.compare_asset).ok_or(ValidationError::MissingCompareAsset)?,
        ),
        _ => None,
    };

    let analysis_date =
        present(&request.analysis_date).ok_or(ValidationError::MissingAnalysisDate)?;

    let profile = resolve_profile(request)?;

    Ok(AnalysisPlan {
        mode,
        analysis_type,
        asset,
        compare_asset,
        profile,
        focus: present(&request.focus),
        analysis_date,
        note: present(&request.note),
    })
}

/// Explicit profile label, or the quiz result when the label is "descobrir"
/// or missing and answers were sent.
fn resolve_profile(request: &AnalysisRequest) -> Result<InvestorProfile, ValidationError> {
    let label = present(&request.investor_profile);
    let discover = label
        .as_deref()
        .is_some_and(|l| l.eq_ignore_ascii_case(DISCOVER_PROFILE));

    match (label, &request.profile_answers) {
        (Some(label), _) if !discover => {
            InvestorProfile::from_label(&label).ok_or(ValidationError::UnknownProfile(label))
        }
        (_, Some(answers)) => {
            let answers: &[u8; QUIZ_QUESTIONS] = answers
                .as_slice()
                .try_into()
                .map_err(|_| ValidationError::IncompleteProfileQuiz)?;
            InvestorProfile::from_quiz(answers).ok_or(ValidationError::IncompleteProfileQuiz)
        }
        (Some(_), None) => Err(ValidationError::IncompleteProfileQuiz),
        (None, None) => Err(ValidationError::MissingProfile),
    }
}
