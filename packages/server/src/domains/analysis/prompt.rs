use asset_extract::Category;

use super::market_data::MarketSnapshot;
use super::models::{AnalysisPlan, InvestmentMode};

/// Marker the model is told to use for unavailable values.
pub const NOT_AVAILABLE: &str = "N/D";

const RULES: &str = "\
Regras:
- Nunca escreva \"não encontrado\" ou \"dados futuros\".
- Use \"N/D\" caso algum dado não exista.
- Responda em formato organizado e com bullets.";

/// Indicators to tabulate for a category.
fn quick_table(category: Category) -> &'static [&'static str] {
    match category {
        Category::RealEstateFund => &[
            "Preço atual",
            "DY 12m",
            "Dividendos 12m",
            "P/VP",
            "Vacância",
            "Tipo do FII",
            "Índice de correção",
        ],
        Category::Stock | Category::Bdr => &[
            "Preço atual",
            "Variação no dia",
            "DY 12m",
            "Dividendos 12m",
            "P/L",
            "P/VP",
            "ROE",
            "Margem líquida",
            "Dívida líquida / EBITDA",
            "Setor",
            "Valor de mercado",
        ],
        Category::Etf | Category::Index => &[
            "Preço atual",
            "Variação 12m",
            "Taxa de administração",
            "Patrimônio",
            "Índice de referência",
        ],
        Category::Crypto => &["Preço atual", "Variação 24h", "Variação 12m", "Valor de mercado"],
        Category::FixedIncome => &["Taxa", "Indexador", "Vencimento", "Liquidez", "Tributação"],
    }
}

fn asset_noun(category: Category) -> &'static str {
    match category {
        Category::Stock => "a ação",
        Category::RealEstateFund => "o FII",
        Category::Etf => "o ETF",
        Category::Bdr => "o BDR",
        Category::Crypto => "a criptomoeda",
        Category::Index => "o índice",
        Category::FixedIncome => "o título de renda fixa",
    }
}

/// Market data section, one block per snapshot.
fn market_data_section(snapshots: &[MarketSnapshot]) -> String {
    let mut section = String::from("Dados de mercado coletados:\n");
    for snapshot in snapshots {
        if snapshot.result.ok() {
            section.push_str(&format!(
                "\n[{} | fonte: {}]\n{}\n",
                snapshot.asset,
                snapshot.result.url(),
                snapshot.result.raw_text()
            ));
        } else {
            section.push_str(&format!(
                "\n[{}]\n{} (dados indisponíveis no momento)\n",
                snapshot.asset, NOT_AVAILABLE
            ));
        }
    }
    section
}

/// Build the model prompt for a validated plan.
///
/// `snapshots` are the results of [`gather_market_data`](super::gather_market_data);
/// failed lookups appear as "N/D".
pub fn build_prompt(plan: &AnalysisPlan, snapshots: &[MarketSnapshot]) -> String {
    let focus = plan.focus.as_deref().unwrap_or("geral");
    let note = plan.note.as_deref().unwrap_or("nenhuma");

    let mut prompt = match plan.mode {
        InvestmentMode::Portfolio => format!(
            "Monte uma carteira balanceada para o perfil {}, foco {}.\n",
            plan.profile.label(),
            focus
        ),
        InvestmentMode::Asset(category) => {
            let asset = plan.asset.as_deref().unwrap_or(NOT_AVAILABLE);
            let mut header = match &plan.compare_asset {
                Some(other) => format!(
                    "Compare {} {} com {}: {}.\n",
                    asset_noun(category),
                    asset,
                    other,
                    plan.analysis_type.describe()
                ),
                None => format!(
                    "Analise {} {}: {}.\n",
                    asset_noun(category),
                    asset,
                    plan.analysis_type.describe()
                ),
            };
            header.push_str(&format!("Perfil: {}.\nFoco: {}.\n", plan.profile.label(), focus));
            header
        }
    };

    prompt.push_str(&format!("Data: {}.\nObservação: {}.\n", plan.analysis_date, note));

    if let InvestmentMode::Asset(category) = plan.mode {
        prompt.push_str("\nMonte uma TABELA RÁPIDA com:\n");
        for indicator in quick_table(category) {
            prompt.push_str(&format!("- {}\n", indicator));
        }
    }

    if !snapshots.is_empty() {
        prompt.push('\n');
        prompt.push_str(&market_data_section(snapshots));
        prompt.push_str("\nUse os dados coletados acima como fonte principal dos valores.\n");
    }

    prompt.push('\n');
    prompt.push_str(RULES);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::analysis::models::{AnalysisType, InvestorProfile};
    use asset_extract::FetchResult;

    fn fii_plan() -> AnalysisPlan {
        AnalysisPlan {
            mode: InvestmentMode::Asset(Category::RealEstateFund),
            analysis_type: AnalysisType::Dividends,
            asset: Some("HGLG11".into()),
            compare_asset: None,
            profile: InvestorProfile::Moderate,
            focus: Some("renda passiva".into()),
            analysis_date: "2025-01-10".into(),
            note: None,
        }
    }

    #[test]
    fn test_asset_prompt_includes_table_and_data() {
        let snapshots = vec![MarketSnapshot {
            asset: "HGLG11".into(),
            result: FetchResult::success("https://data.test/fiis/hglg11/", "DY (12M) 8,74%"),
        }];

        let prompt = build_prompt(&fii_plan(), &snapshots);

        assert!(prompt.starts_with("Analise o FII HGLG11: análise focada em dividendos."));
        assert!(prompt.contains("Perfil: moderado."));
        assert!(prompt.contains("Foco: renda passiva."));
        assert!(prompt.contains("Observação: nenhuma."));
        assert!(prompt.contains("- Vacância\n"));
        assert!(prompt.contains("[HGLG11 | fonte: https://data.test/fiis/hglg11/]\nDY (12M) 8,74%"));
        assert!(prompt.ends_with(RULES));
    }

    #[test]
    fn test_failed_lookup_is_marked_not_available() {
        let snapshots = vec![MarketSnapshot {
            asset: "HGLG11".into(),
            result: FetchResult::failure("https://data.test/fiis/hglg11/", "timeout"),
        }];

        let prompt = build_prompt(&fii_plan(), &snapshots);

        assert!(prompt.contains("[HGLG11]\nN/D"));
        assert!(!prompt.contains("timeout"));
    }

    #[test]
    fn test_portfolio_prompt_has_no_table_or_data() {
        let plan = AnalysisPlan {
            mode: InvestmentMode::Portfolio,
            analysis_type: AnalysisType::Complete,
            asset: None,
            compare_asset: None,
            profile: InvestorProfile::Aggressive,
            focus: None,
            analysis_date: "2025-01-10".into(),
            note: Some("aporte mensal".into()),
        };

        let prompt = build_prompt(&plan, &[]);

        assert!(prompt.starts_with("Monte uma carteira balanceada para o perfil agressivo, foco geral."));
        assert!(prompt.contains("Observação: aporte mensal."));
        assert!(!prompt.contains("TABELA"));
        assert!(!prompt.contains("Dados de mercado"));
    }

    #[test]
    fn test_comparison_header() {
        let mut plan = fii_plan();
        plan.analysis_type = AnalysisType::Comparison;
        plan.compare_asset = Some("KNRI11".into());

        let prompt = build_prompt(&plan, &[]);

        assert!(prompt.starts_with("Compare o FII HGLG11 com KNRI11: comparação entre dois ativos."));
    }
}
