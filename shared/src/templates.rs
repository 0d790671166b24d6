use askama::Template;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{format_thousands, py_float, StrategyParams};

/// Fixed Python strategy script; only the fields below vary.
#[derive(Template)]
#[template(path = "strategy_template.py", escape = "none")]
pub struct StrategyTemplate {
    pub strategy_name: String,
    pub class_name: String,
    pub generated_at: String,
    pub capital: String,
    pub capital_display: String,
    pub indicator: String,
    pub indicator_method: String,
    pub operator: String,
    pub value: String,
    pub stop_loss: String,
    pub target: String,
    pub indicator_calculation: String,
    pub entry_condition: String,
}

impl StrategyTemplate {
    pub fn new(params: &StrategyParams, generated_at: DateTime<Utc>) -> Self {
        let strategy_name = params.strategy_name();
        Self {
            class_name: class_name(&strategy_name),
            strategy_name,
            generated_at: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            capital: py_float(params.capital),
            capital_display: format_thousands(params.capital),
            indicator: params.indicator.as_str().to_string(),
            indicator_method: params.indicator.method_suffix(),
            operator: params.operator.as_str().to_string(),
            value: py_float(params.value),
            stop_loss: py_float(params.stop_loss),
            target: py_float(params.target),
            indicator_calculation: params.indicator.calculation().to_string(),
            entry_condition: params.operator.entry_condition(params.value),
        }
    }
}

/// Python identifiers only allow `[A-Za-z0-9_]`.
fn class_name(strategy_name: &str) -> String {
    let ident: String = strategy_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}Strategy", ident)
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedStrategy {
    pub strategy_name: String,
    pub code: String,
    pub code_size: usize,
    pub indicators_used: Vec<String>,
    pub language: &'static str,
}

pub fn generate_python_strategy(params: &StrategyParams) -> Result<GeneratedStrategy, askama::Error> {
    render_at(params, Utc::now())
}

pub fn render_at(params: &StrategyParams, generated_at: DateTime<Utc>) -> Result<GeneratedStrategy, askama::Error> {
    let template = StrategyTemplate::new(params, generated_at);
    let code = template.render()?;
    tracing::info!(
        "Generated strategy code {} ({} chars)",
        template.strategy_name,
        code.len()
    );
    Ok(GeneratedStrategy {
        strategy_name: template.strategy_name,
        code_size: code.chars().count(),
        code,
        indicators_used: vec![params.indicator.as_str().to_string()],
        language: "python",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Indicator, Operator};
    use chrono::TimeZone;

    fn params(indicator: Indicator, operator: Operator, value: f64) -> StrategyParams {
        StrategyParams {
            indicator,
            operator,
            value,
            stop_loss: 2.0,
            target: 5.0,
            capital: 100000.0,
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_header_and_class() {
        let generated = render_at(&params(Indicator::Rsi, Operator::LessThan, 30.0), fixed_time()).unwrap();
        let code = &generated.code;
        assert_eq!(generated.strategy_name, "RSI_LT_30.0");
        assert!(code.starts_with("# Trading Strategy: RSI_LT_30.0\n"));
        assert!(code.contains("# Generated on: 2024-03-01 09:30:00"));
        assert!(code.contains("# Capital: ₹100,000"));
        assert!(code.contains("class RSI_LT_30_0Strategy:"));
        assert!(code.contains("self.name = \"RSI_LT_30.0\""));
        assert!(code.contains("self.capital = 100000.0"));
        assert!(code.contains("self.stop_loss_pct = 2.0"));
        assert!(code.contains("self.target_pct = 5.0"));
        assert!(code.contains("Risk Management: 2.0% SL, 5.0% Target"));
        assert!(code.contains("strategy = RSI_LT_30_0Strategy()"));
        assert_eq!(generated.code_size, code.chars().count());
        assert_eq!(generated.indicators_used, vec!["RSI".to_string()]);
    }

    #[test]
    fn test_indicator_calculation_is_substituted() {
        let code = render_at(&params(Indicator::Stochastic, Operator::GreaterThan, 80.0), fixed_time())
            .unwrap()
            .code;
        assert!(code.contains("def calculate_stochastic(self, data: pd.DataFrame, period: int = 14)"));
        assert!(code.contains("stoch_data = TechnicalIndicators.stochastic(high, low, close, period)"));
        assert!(code.contains("indicator_values = self.calculate_stochastic(data)"));
    }

    #[test]
    fn test_entry_condition_is_indented_inside_try() {
        let code = render_at(&params(Indicator::Cci, Operator::CrossesAbove, 100.0), fixed_time())
            .unwrap()
            .code;
        assert!(code.contains(
            "\n            return previous_value <= 100.0 and current_value > 100.0\n"
        ));
    }

    #[test]
    fn test_negative_value_gives_valid_class_name() {
        let generated = render_at(&params(Indicator::WilliamsR, Operator::LessEqual, -80.0), fixed_time()).unwrap();
        assert_eq!(generated.strategy_name, "Williams_R_LTE_-80.0");
        assert!(generated.code.contains("class Williams_R_LTE__80_0Strategy:"));
    }

    #[test]
    fn test_every_combination_renders() {
        for indicator in Indicator::ALL {
            for operator in Operator::ALL {
                let generated = render_at(&params(indicator, operator, 1.5), fixed_time()).unwrap();
                assert!(generated.code.contains(&operator.entry_condition(1.5)));
                assert!(!generated.code.contains("{{"));
            }
        }
    }
}
