//! Strategy domain types shared by the API and the code generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entity::strategies;

pub const MIN_CAPITAL: f64 = 1000.0;
pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported {kind}: {value}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// Technical indicators the generated script knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Indicator {
    Rsi,
    Ema,
    Sma,
    Macd,
    BollingerBands,
    Stochastic,
    WilliamsR,
    Cci,
}

impl Indicator {
    pub const ALL: [Indicator; 8] = [
        Indicator::Rsi,
        Indicator::Ema,
        Indicator::Sma,
        Indicator::Macd,
        Indicator::BollingerBands,
        Indicator::Stochastic,
        Indicator::WilliamsR,
        Indicator::Cci,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Rsi => "RSI",
            Indicator::Ema => "EMA",
            Indicator::Sma => "SMA",
            Indicator::Macd => "MACD",
            Indicator::BollingerBands => "Bollinger_Bands",
            Indicator::Stochastic => "Stochastic",
            Indicator::WilliamsR => "Williams_R",
            Indicator::Cci => "CCI",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Rsi => "RSI (Relative Strength Index)",
            Indicator::Ema => "EMA (Exponential Moving Average)",
            Indicator::Sma => "SMA (Simple Moving Average)",
            Indicator::Macd => "MACD (Moving Average Convergence Divergence)",
            Indicator::BollingerBands => "Bollinger Bands",
            Indicator::Stochastic => "Stochastic Oscillator",
            Indicator::WilliamsR => "Williams %R",
            Indicator::Cci => "CCI (Commodity Channel Index)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Indicator::Rsi => "Momentum oscillator",
            Indicator::Ema => "Weighted average giving more importance to recent prices",
            Indicator::Sma => "Average price over time",
            Indicator::Macd => "Moving Average Convergence Divergence",
            Indicator::BollingerBands => "Volatility bands around moving average",
            Indicator::Stochastic => "Momentum indicator",
            Indicator::WilliamsR => "Momentum indicator similar to Stochastic",
            Indicator::Cci => "Deviation of typical price from its average",
        }
    }

    /// Python method name suffix, e.g. `calculate_rsi`.
    pub fn method_suffix(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// Body of the generated `calculate_<indicator>` method, indented for the class.
    pub fn calculation(&self) -> &'static str {
        match self {
            Indicator::Rsi => {
                r#"try:
            close = data['close']
            return TechnicalIndicators.rsi(close, period)
        except Exception as e:
            print(f"Error calculating RSI: {e}")
            return pd.Series([50] * len(data), index=data.index)"#
            }
            Indicator::Ema => {
                r#"try:
            close = data['close']
            return TechnicalIndicators.ema(close, period)
        except Exception as e:
            print(f"Error calculating EMA: {e}")
            return pd.Series([0] * len(data), index=data.index)"#
            }
            Indicator::Sma => {
                r#"try:
            close = data['close']
            return TechnicalIndicators.sma(close, period)
        except Exception as e:
            print(f"Error calculating SMA: {e}")
            return pd.Series([0] * len(data), index=data.index)"#
            }
            Indicator::Macd => {
                r#"try:
            close = data['close']
            macd_data = TechnicalIndicators.macd(close)
            return macd_data["macd"]
        except Exception as e:
            print(f"Error calculating MACD: {e}")
            return pd.Series([0] * len(data), index=data.index)"#
            }
            Indicator::BollingerBands => {
                r#"try:
            close = data['close']
            bb_data = TechnicalIndicators.bollinger_bands(close, period)
            return bb_data["middle"]
        except Exception as e:
            print(f"Error calculating Bollinger Bands: {e}")
            return pd.Series([0] * len(data), index=data.index)"#
            }
            Indicator::Stochastic => {
                r#"try:
            high = data['high']
            low = data['low']
            close = data['close']
            stoch_data = TechnicalIndicators.stochastic(high, low, close, period)
            return stoch_data["k"]
        except Exception as e:
            print(f"Error calculating Stochastic: {e}")
            return pd.Series([50] * len(data), index=data.index)"#
            }
            Indicator::WilliamsR => {
                r#"try:
            high = data['high']
            low = data['low']
            close = data['close']
            return TechnicalIndicators.williams_r(high, low, close, period)
        except Exception as e:
            print(f"Error calculating Williams %R: {e}")
            return pd.Series([-50] * len(data), index=data.index)"#
            }
            Indicator::Cci => {
                r#"try:
            high = data['high']
            low = data['low']
            close = data['close']
            return TechnicalIndicators.cci(high, low, close, period)
        except Exception as e:
            print(f"Error calculating CCI: {e}")
            return pd.Series([0] * len(data), index=data.index)"#
            }
        }
    }
}

impl FromStr for Indicator {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match key.as_str() {
            "RSI" => Ok(Indicator::Rsi),
            "EMA" => Ok(Indicator::Ema),
            "SMA" => Ok(Indicator::Sma),
            "MACD" => Ok(Indicator::Macd),
            "BOLLINGERBANDS" | "BOLLINGER" | "BB" => Ok(Indicator::BollingerBands),
            "STOCHASTIC" | "STOCH" => Ok(Indicator::Stochastic),
            "WILLIAMSR" | "WILLIAMS" => Ok(Indicator::WilliamsR),
            "CCI" => Ok(Indicator::Cci),
            _ => Err(UnknownOption {
                kind: "indicator",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Indicator {
    type Error = UnknownOption;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Indicator> for &'static str {
    fn from(indicator: Indicator) -> Self {
        indicator.as_str()
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison applied between the indicator value and the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Operator {
    GreaterThan,
    LessThan,
    Equal,
    GreaterEqual,
    LessEqual,
    CrossesAbove,
    CrossesBelow,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::Equal,
        Operator::GreaterEqual,
        Operator::LessEqual,
        Operator::CrossesAbove,
        Operator::CrossesBelow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::Equal => "==",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::CrossesAbove => "crosses_above",
            Operator::CrossesBelow => "crosses_below",
        }
    }

    /// Short token used inside generated strategy names.
    pub fn code(&self) -> &'static str {
        match self {
            Operator::GreaterThan => "GT",
            Operator::LessThan => "LT",
            Operator::Equal => "EQ",
            Operator::GreaterEqual => "GTE",
            Operator::LessEqual => "LTE",
            Operator::CrossesAbove => "XUP",
            Operator::CrossesBelow => "XDOWN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Operator::GreaterThan => "Greater than (>)",
            Operator::LessThan => "Less than (<)",
            Operator::Equal => "Equal to (==)",
            Operator::GreaterEqual => "Greater than or equal (>=)",
            Operator::LessEqual => "Less than or equal (<=)",
            Operator::CrossesAbove => "Crosses Above",
            Operator::CrossesBelow => "Crosses Below",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operator::GreaterThan => "Value is greater than threshold",
            Operator::LessThan => "Value is less than threshold",
            Operator::Equal => "Value equals threshold (within 0.01)",
            Operator::GreaterEqual => "Value is greater than or equal to threshold",
            Operator::LessEqual => "Value is less than or equal to threshold",
            Operator::CrossesAbove => "Value crosses above threshold",
            Operator::CrossesBelow => "Value crosses below threshold",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operator::CrossesAbove | Operator::CrossesBelow => "cross",
            _ => "comparison",
        }
    }

    /// Python statement returning the entry signal for `value`.
    pub fn entry_condition(&self, value: f64) -> String {
        let v = py_float(value);
        match self {
            Operator::GreaterThan
            | Operator::LessThan
            | Operator::GreaterEqual
            | Operator::LessEqual => format!("return current_value {} {}", self.as_str(), v),
            Operator::Equal => format!("return abs(current_value - {}) < 0.01", v),
            Operator::CrossesAbove => {
                format!("return previous_value <= {} and current_value > {}", v, v)
            }
            Operator::CrossesBelow => {
                format!("return previous_value >= {} and current_value < {}", v, v)
            }
        }
    }
}

impl FromStr for Operator {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            ">" | "gt" | "greater_than" | "above" => Ok(Operator::GreaterThan),
            "<" | "lt" | "less_than" | "below" => Ok(Operator::LessThan),
            "==" | "=" | "eq" | "equals" | "equal" => Ok(Operator::Equal),
            ">=" | "gte" | "greater_equal" => Ok(Operator::GreaterEqual),
            "<=" | "lte" | "less_equal" => Ok(Operator::LessEqual),
            "crosses_above" | "xup" | "crossover" => Ok(Operator::CrossesAbove),
            "crosses_below" | "xdown" | "crossunder" => Ok(Operator::CrossesBelow),
            _ => Err(UnknownOption {
                kind: "operator",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Operator {
    type Error = UnknownOption;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Operator> for &'static str {
    fn from(operator: Operator) -> Self {
        operator.as_str()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The handful of fields substituted into the generated script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub indicator: Indicator,
    pub operator: Operator,
    pub value: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub capital: f64,
}

impl StrategyParams {
    /// Every rule the parameters break; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.value.is_finite() {
            errors.push("Threshold value must be a finite number".to_string());
        }
        if !(self.stop_loss > 0.0 && self.stop_loss < 100.0) {
            errors.push("Stop loss must be between 0 and 100%".to_string());
        }
        if !(self.target > 0.0 && self.target.is_finite()) {
            errors.push("Target must be greater than 0%".to_string());
        }
        if !(self.capital >= MIN_CAPITAL && self.capital.is_finite()) {
            errors.push(format!("Capital must be at least ₹{}", format_thousands(MIN_CAPITAL)));
        }
        errors
    }

    /// `RSI_LT_30.0` style identifier.
    pub fn strategy_name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.indicator.as_str(),
            self.operator.code(),
            py_float(self.value)
        )
    }
}

impl TryFrom<&strategies::Model> for StrategyParams {
    type Error = UnknownOption;

    fn try_from(model: &strategies::Model) -> Result<Self, Self::Error> {
        Ok(StrategyParams {
            indicator: model.indicator.parse()?,
            operator: model.operator.parse()?,
            value: model.value,
            stop_loss: model.stop_loss,
            target: model.target,
            capital: model.capital,
        })
    }
}

/// A named strategy ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDraft {
    pub name: String,
    pub description: Option<String>,
    pub params: StrategyParams,
}

impl StrategyDraft {
    pub fn new(name: impl Into<String>, description: Option<String>, params: StrategyParams) -> Self {
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Self {
            name: name.into().trim().to_string(),
            description,
            params,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let name_len = self.name.chars().count();
        if name_len < NAME_MIN_LEN {
            errors.push(format!("Strategy name must be at least {} characters", NAME_MIN_LEN));
        } else if name_len > NAME_MAX_LEN {
            errors.push(format!("Strategy name must be at most {} characters", NAME_MAX_LEN));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_LEN {
                errors.push(format!(
                    "Description must be at most {} characters",
                    DESCRIPTION_MAX_LEN
                ));
            }
        }
        errors.extend(self.params.validate());
        errors
    }
}

/// Raw builder fields exactly as a browser submits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyInput {
    pub name: String,
    pub description: String,
    pub indicator: String,
    pub operator: String,
    pub value: String,
    pub stop_loss: String,
    pub target: String,
    pub capital: String,
}

impl StrategyInput {
    /// Parse and validate the numeric and option fields.
    pub fn params(&self) -> Result<StrategyParams, Vec<String>> {
        let mut errors = Vec::new();

        let indicator = if self.indicator.trim().is_empty() {
            errors.push("Please select a technical indicator".to_string());
            None
        } else {
            self.indicator
                .parse::<Indicator>()
                .map_err(|e| errors.push(e.to_string()))
                .ok()
        };
        let operator = if self.operator.trim().is_empty() {
            errors.push("Please select an operator".to_string());
            None
        } else {
            self.operator
                .parse::<Operator>()
                .map_err(|e| errors.push(e.to_string()))
                .ok()
        };

        let value = parse_number(&self.value, "Threshold value", "Please enter a threshold value", &mut errors);
        let stop_loss = parse_number(&self.stop_loss, "Stop loss", "Please enter a stop loss", &mut errors);
        let target = parse_number(&self.target, "Target", "Please enter a target", &mut errors);
        let capital = parse_number(&self.capital, "Capital", "Please enter your capital", &mut errors);

        match (indicator, operator, value, stop_loss, target, capital) {
            (Some(indicator), Some(operator), Some(value), Some(stop_loss), Some(target), Some(capital))
                if errors.is_empty() =>
            {
                let params = StrategyParams {
                    indicator,
                    operator,
                    value,
                    stop_loss,
                    target,
                    capital,
                };
                let problems = params.validate();
                if problems.is_empty() {
                    Ok(params)
                } else {
                    Err(problems)
                }
            }
            _ => Err(errors),
        }
    }

    pub fn draft(&self) -> Result<StrategyDraft, Vec<String>> {
        let params = self.params();
        let description = Some(self.description.clone());
        match params {
            Ok(params) => {
                let draft = StrategyDraft::new(self.name.clone(), description, params);
                let errors = draft.validate();
                if errors.is_empty() {
                    Ok(draft)
                } else {
                    Err(errors)
                }
            }
            Err(mut errors) => {
                let name_len = self.name.trim().chars().count();
                if name_len < NAME_MIN_LEN {
                    errors.insert(
                        0,
                        format!("Strategy name must be at least {} characters", NAME_MIN_LEN),
                    );
                }
                Err(errors)
            }
        }
    }

    pub fn from_model(model: &strategies::Model) -> Self {
        Self {
            name: model.name.clone(),
            description: model.description.clone().unwrap_or_default(),
            indicator: model.indicator.clone(),
            operator: model.operator.clone(),
            value: py_float(model.value),
            stop_loss: py_float(model.stop_loss),
            target: py_float(model.target),
            capital: py_float(model.capital),
        }
    }
}

fn parse_number(raw: &str, field: &str, missing: &str, errors: &mut Vec<String>) -> Option<f64> {
    let raw = raw.trim().replace(',', "");
    if raw.is_empty() {
        errors.push(missing.to_string());
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            errors.push(format!("{} must be a number", field));
            None
        }
    }
}

/// Format a float the way Python's `str(float)` does: positional between 1e-4
/// and 1e16, exponent form (`1e+20`, `2.5e-05`) outside that range.
pub fn py_float(value: f64) -> String {
    let magnitude = value.abs();
    if !value.is_finite() {
        format!("{}", value)
    } else if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-4) {
        let sci = format!("{:e}", value);
        match sci.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => sci,
        }
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Round to whole units and group thousands: `100000.0` -> `100,000`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsi_params() -> StrategyParams {
        StrategyParams {
            indicator: Indicator::Rsi,
            operator: Operator::LessThan,
            value: 30.0,
            stop_loss: 2.0,
            target: 5.0,
            capital: 100000.0,
        }
    }

    fn input() -> StrategyInput {
        StrategyInput {
            name: "RSI dip buyer".to_string(),
            description: String::new(),
            indicator: "RSI".to_string(),
            operator: "<".to_string(),
            value: "30".to_string(),
            stop_loss: "2".to_string(),
            target: "5".to_string(),
            capital: "100000".to_string(),
        }
    }

    #[test]
    fn test_indicator_aliases() {
        assert_eq!("rsi".parse::<Indicator>().unwrap(), Indicator::Rsi);
        assert_eq!("Bollinger Bands".parse::<Indicator>().unwrap(), Indicator::BollingerBands);
        assert_eq!("BB".parse::<Indicator>().unwrap(), Indicator::BollingerBands);
        assert_eq!("Williams %R".parse::<Indicator>().unwrap(), Indicator::WilliamsR);
        assert_eq!("STOCH".parse::<Indicator>().unwrap(), Indicator::Stochastic);
        assert!("ADX".parse::<Indicator>().is_err());
        for indicator in Indicator::ALL {
            assert_eq!(indicator.as_str().parse::<Indicator>().unwrap(), indicator);
        }
    }

    #[test]
    fn test_operator_aliases() {
        assert_eq!("greater_than".parse::<Operator>().unwrap(), Operator::GreaterThan);
        assert_eq!("below".parse::<Operator>().unwrap(), Operator::LessThan);
        assert_eq!("equals".parse::<Operator>().unwrap(), Operator::Equal);
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::GreaterEqual);
        assert!("between".parse::<Operator>().is_err());
        assert!("not_equal".parse::<Operator>().is_err());
    }

    #[test]
    fn test_operator_codes_are_distinct() {
        // `>=` must not collapse into `GT=` the way chained replacements would.
        assert_eq!(Operator::GreaterEqual.code(), "GTE");
        assert_eq!(Operator::LessEqual.code(), "LTE");
        let codes: std::collections::HashSet<_> = Operator::ALL.iter().map(|o| o.code()).collect();
        assert_eq!(codes.len(), Operator::ALL.len());
    }

    #[test]
    fn test_entry_conditions() {
        assert_eq!(Operator::LessThan.entry_condition(30.0), "return current_value < 30.0");
        assert_eq!(
            Operator::Equal.entry_condition(50.5),
            "return abs(current_value - 50.5) < 0.01"
        );
        assert_eq!(
            Operator::CrossesAbove.entry_condition(0.0),
            "return previous_value <= 0.0 and current_value > 0.0"
        );
        assert_eq!(
            Operator::CrossesBelow.entry_condition(-100.0),
            "return previous_value >= -100.0 and current_value < -100.0"
        );
    }

    #[test]
    fn test_serde_uses_canonical_strings() {
        let json = serde_json::to_value(rsi_params()).unwrap();
        assert_eq!(json["indicator"], "RSI");
        assert_eq!(json["operator"], "<");

        let parsed: StrategyParams = serde_json::from_value(serde_json::json!({
            "indicator": "Bollinger Bands",
            "operator": "crosses_above",
            "value": 20,
            "stop_loss": 1.5,
            "target": 3,
            "capital": 5000
        }))
        .unwrap();
        assert_eq!(parsed.indicator, Indicator::BollingerBands);
        assert_eq!(parsed.operator, Operator::CrossesAbove);
    }

    #[test]
    fn test_params_validation_collects_all_errors() {
        let params = StrategyParams {
            stop_loss: 100.0,
            target: 0.0,
            capital: 999.0,
            ..rsi_params()
        };
        let errors = params.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("Stop loss"));
        assert!(errors[1].contains("Target"));
        assert!(errors[2].contains("Capital must be at least ₹1,000"));
        assert!(rsi_params().validate().is_empty());
    }

    #[test]
    fn test_negative_threshold_is_allowed() {
        let params = StrategyParams {
            indicator: Indicator::Macd,
            operator: Operator::CrossesBelow,
            value: -0.5,
            ..rsi_params()
        };
        assert!(params.validate().is_empty());
        assert_eq!(params.strategy_name(), "MACD_XDOWN_-0.5");
    }

    #[test]
    fn test_strategy_name() {
        assert_eq!(rsi_params().strategy_name(), "RSI_LT_30.0");
    }

    #[test]
    fn test_input_parses() {
        let draft = input().draft().unwrap();
        assert_eq!(draft.name, "RSI dip buyer");
        assert_eq!(draft.description, None);
        assert_eq!(draft.params, rsi_params());
    }

    #[test]
    fn test_input_reports_missing_fields() {
        let form = StrategyInput {
            indicator: String::new(),
            operator: String::new(),
            value: "abc".to_string(),
            ..input()
        };
        let errors = form.params().unwrap_err();
        assert!(errors.contains(&"Please select a technical indicator".to_string()));
        assert!(errors.contains(&"Please select an operator".to_string()));
        assert!(errors.contains(&"Threshold value must be a number".to_string()));
    }

    #[test]
    fn test_draft_name_length() {
        let form = StrategyInput {
            name: " ab ".to_string(),
            ..input()
        };
        let errors = form.draft().unwrap_err();
        assert_eq!(errors, vec!["Strategy name must be at least 3 characters".to_string()]);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(py_float(30.0), "30.0");
        assert_eq!(py_float(2.5), "2.5");
        assert_eq!(py_float(-1.0), "-1.0");
        assert_eq!(format_thousands(100000.0), "100,000");
        assert_eq!(format_thousands(1234567.6), "1,234,568");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
    }

    #[test]
    fn test_exponent_form_outside_positional_range() {
        assert_eq!(py_float(1e20), "1e+20");
        assert_eq!(py_float(1.5e16), "1.5e+16");
        assert_eq!(py_float(-2e17), "-2e+17");
        assert_eq!(py_float(1e15), "1000000000000000.0");
        assert_eq!(py_float(0.00001), "1e-05");
        assert_eq!(py_float(0.0001), "0.0001");
        assert_eq!(py_float(0.0), "0.0");

        let params = StrategyParams {
            value: 1e20,
            ..rsi_params()
        };
        assert_eq!(params.strategy_name(), "RSI_LT_1e+20");
    }
}
