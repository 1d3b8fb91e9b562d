//! Configuration validation
//!
//! Field bounds are declared with `validator` on the config types. This
//! module walks the top-level config and each symbol separately so every
//! failure carries a JSON path like `["symbols", 0, "riskPerTrade"]`.

use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::types::BotConfig;

/// One segment of the path to an offending value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub path: Vec<PathSegment>,
    pub code: String,
    pub message: String,
}

impl BotConfig {
    /// Check every bound, collecting all issues instead of stopping at the first
    pub fn check(&self) -> Result<(), Vec<ConfigIssue>> {
        let mut issues = Vec::new();

        if let Err(errors) = self.validate() {
            collect_issues(&[], &errors, &mut issues);
        }

        for (index, symbol) in self.symbols.iter().enumerate() {
            if let Err(errors) = symbol.validate() {
                let prefix = [
                    PathSegment::Key("symbols".to_string()),
                    PathSegment::Index(index),
                ];
                collect_issues(&prefix, &errors, &mut issues);
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            issues.sort_by(|a, b| a.path.cmp(&b.path));
            Err(issues)
        }
    }
}

/// Deserialize and validate a config document
pub fn parse_config(value: serde_json::Value) -> Result<BotConfig, Vec<ConfigIssue>> {
    let config: BotConfig = serde_json::from_value(value).map_err(|e| {
        vec![ConfigIssue {
            path: Vec::new(),
            code: "invalid_type".to_string(),
            message: e.to_string(),
        }]
    })?;

    config.check()?;
    Ok(config)
}

fn collect_issues(prefix: &[PathSegment], errors: &ValidationErrors, out: &mut Vec<ConfigIssue>) {
    for (field, field_errors) in errors.field_errors() {
        let mut path = prefix.to_vec();
        path.push(PathSegment::Key(camel_case(field)));

        for error in field_errors.iter() {
            out.push(ConfigIssue {
                path: path.clone(),
                code: error.code.to_string(),
                message: describe(error),
            });
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let min = error.params.get("min");
    let max = error.params.get("max");
    match (error.code.as_ref(), min, max) {
        ("range", Some(min), Some(max)) => {
            format!("must be between {} and {}", bound(min), bound(max))
        }
        ("length", Some(min), None) => {
            format!("must contain at least {} element(s)", bound(min))
        }
        (code, _, _) => format!("failed {} check", code),
    }
}

/// Render a bound without a trailing `.0` on whole numbers
fn bound(value: &serde_json::Value) -> String {
    match value.as_f64() {
        Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        Some(n) => n.to_string(),
        None => value.to_string(),
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> serde_json::Value {
        json!({
            "symbols": [{
                "symbol": "EURUSD",
                "timeframe": "M15",
                "maxSimultaneousTrades": 3,
                "riskPerTrade": 0.01,
                "minConfidence": 0.7
            }],
            "maxDailyLossPercent": 5,
            "maxDrawdownPercent": 20,
            "maxTotalExposurePercent": 40,
            "tradeCooldownMinutes": 15
        })
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(BotConfig::default().check().is_ok());
    }

    #[test]
    fn test_parse_valid_document() {
        let config = parse_config(valid_document()).unwrap();
        assert_eq!(config.symbols.len(), 1);
        assert_eq!(config.symbols[0].max_simultaneous_trades, 3.0);
        assert_eq!(config.trade_cooldown_minutes, 15.0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut doc = valid_document();
        doc["symbols"][0]["riskPerTrade"] = json!(0.05);
        doc["symbols"][0]["minConfidence"] = json!(1);
        doc["symbols"][0]["maxSimultaneousTrades"] = json!(10);
        doc["maxDailyLossPercent"] = json!(20);
        doc["maxDrawdownPercent"] = json!(5);
        doc["tradeCooldownMinutes"] = json!(240);
        assert!(parse_config(doc).is_ok());
    }

    #[test]
    fn test_symbol_issue_carries_path() {
        let mut doc = valid_document();
        doc["symbols"][0]["riskPerTrade"] = json!(0.2);

        let issues = parse_config(doc).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].path,
            vec![
                PathSegment::Key("symbols".to_string()),
                PathSegment::Index(0),
                PathSegment::Key("riskPerTrade".to_string()),
            ]
        );
        assert_eq!(issues[0].code, "range");
        assert!(issues[0].message.contains("between"));
    }

    #[test]
    fn test_collects_every_issue() {
        let mut doc = valid_document();
        doc["maxDrawdownPercent"] = json!(80);
        doc["tradeCooldownMinutes"] = json!(0);
        doc["symbols"][0]["minConfidence"] = json!(0.05);

        let issues = parse_config(doc).unwrap_err();
        let paths: Vec<String> = issues
            .iter()
            .map(|i| serde_json::to_string(&i.path).unwrap())
            .collect();

        assert_eq!(issues.len(), 3);
        assert!(paths.contains(&r#"["maxDrawdownPercent"]"#.to_string()));
        assert!(paths.contains(&r#"["tradeCooldownMinutes"]"#.to_string()));
        assert!(paths.contains(&r#"["symbols",0,"minConfidence"]"#.to_string()));
    }

    #[test]
    fn test_empty_symbol_list_rejected() {
        let mut doc = valid_document();
        doc["symbols"] = json!([]);

        let issues = parse_config(doc).unwrap_err();
        assert_eq!(issues[0].path, vec![PathSegment::Key("symbols".to_string())]);
        assert_eq!(issues[0].code, "length");
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let mut doc = valid_document();
        doc["maxDailyLossPercent"] = json!("five");

        let issues = parse_config(doc).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "invalid_type");
        assert!(issues[0].path.is_empty());
    }

    #[test]
    fn test_fractional_counts_within_bounds_accepted() {
        let mut doc = valid_document();
        doc["tradeCooldownMinutes"] = json!(1.5);
        doc["symbols"][0]["maxSimultaneousTrades"] = json!(2.5);

        let config = parse_config(doc).unwrap();
        assert_eq!(config.trade_cooldown_minutes, 1.5);
        assert_eq!(config.symbols[0].max_simultaneous_trades, 2.5);
    }

    #[test]
    fn test_negative_count_is_a_range_issue() {
        let mut doc = valid_document();
        doc["tradeCooldownMinutes"] = json!(-5);
        doc["symbols"][0]["maxSimultaneousTrades"] = json!(5_000_000_000u64);

        let issues = parse_config(doc).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(
            issues[0].path,
            vec![
                PathSegment::Key("symbols".to_string()),
                PathSegment::Index(0),
                PathSegment::Key("maxSimultaneousTrades".to_string()),
            ]
        );
        assert_eq!(issues[0].code, "range");
        assert_eq!(issues[0].message, "must be between 1 and 10");
        assert_eq!(
            issues[1].path,
            vec![PathSegment::Key("tradeCooldownMinutes".to_string())]
        );
        assert_eq!(issues[1].code, "range");
        assert_eq!(issues[1].message, "must be between 1 and 240");
    }

    #[test]
    fn test_fractional_bounds_keep_decimals() {
        let mut doc = valid_document();
        doc["symbols"][0]["riskPerTrade"] = json!(0.0001);

        let issues = parse_config(doc).unwrap_err();
        assert_eq!(issues[0].message, "must be between 0.001 and 0.05");
    }

    #[test]
    fn test_camel_case_conversion() {
        assert_eq!(camel_case("max_total_exposure_percent"), "maxTotalExposurePercent");
        assert_eq!(camel_case("symbols"), "symbols");
        assert_eq!(camel_case("riskPerTrade"), "riskPerTrade");
    }
}
