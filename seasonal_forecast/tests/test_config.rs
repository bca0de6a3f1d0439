use pretty_assertions::assert_eq;
use rstest::rstest;
use seasonal_forecast::config::{ForecastConfig, PipelineProfile};
use seasonal_forecast::expand::ExpansionRule;
use seasonal_forecast::rank::RankingKey;
use seasonal_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = ForecastConfig::default();

    assert_eq!(config.horizon_months, 60);
    assert_eq!(config.confidence_level, 0.95);
    assert_eq!(config.min_required_months, 12);
    assert_eq!(config.top_n, 10);
    assert_eq!(config.ranking_key, RankingKey::FinalForecast);
    assert_eq!(config.expansion, ExpansionRule::Identity);
    assert_eq!(config.workers, None);
    assert!(config.validate().is_ok());
}

#[rstest]
#[case(PipelineProfile::Aggregate, ExpansionRule::Identity, 1)]
#[case(PipelineProfile::Sector, ExpansionRule::Identity, 10)]
#[case(PipelineProfile::Metro, ExpansionRule::CompositeCodes, 10)]
fn test_profiles(
    #[case] profile: PipelineProfile,
    #[case] expansion: ExpansionRule,
    #[case] top_n: usize,
) {
    let config = ForecastConfig::for_profile(profile);
    assert_eq!(config.expansion, expansion);
    assert_eq!(config.top_n, top_n);
    assert_eq!(config.horizon_months, 60);
}

#[test]
fn test_partial_json_takes_defaults() {
    let config = ForecastConfig::from_json_str(
        r#"{ "horizon_months": 24, "expansion": "composite_codes", "ranking_key": "historical_mean" }"#,
    )
    .unwrap();

    assert_eq!(config.horizon_months, 24);
    assert_eq!(config.expansion, ExpansionRule::CompositeCodes);
    assert_eq!(config.ranking_key, RankingKey::HistoricalMean);
    assert_eq!(config.top_n, 10);
}

#[rstest]
#[case(r#"{ "horizon_months": 0 }"#)]
#[case(r#"{ "confidence_level": 1.0 }"#)]
#[case(r#"{ "confidence_level": -0.5 }"#)]
#[case(r#"{ "min_required_months": 0 }"#)]
#[case(r#"{ "top_n": 0 }"#)]
#[case(r#"{ "max_iterations": 0 }"#)]
#[case(r#"{ "workers": 0 }"#)]
fn test_invalid_values_are_rejected(#[case] json: &str) {
    assert!(ForecastConfig::from_json_str(json).is_err());
}

#[test]
fn test_malformed_json_is_config_error() {
    let result = ForecastConfig::from_json_str("{ horizon_months: ");
    assert!(matches!(result, Err(ForecastError::ConfigError(_))));
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{ "top_n": 3, "workers": 2 }}"#).unwrap();

    let config = ForecastConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.top_n, 3);
    assert_eq!(config.workers, Some(2));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = ForecastConfig::from_json_file("/nonexistent/outlook.json");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_round_trips_through_json() {
    let config = ForecastConfig::for_profile(PipelineProfile::Metro).with_workers(4);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(ForecastConfig::from_json_str(&json).unwrap(), config);
}
