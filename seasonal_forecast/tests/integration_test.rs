mod common;

use common::{monthly_observations, ym, MeanModel};
use pretty_assertions::assert_eq;
use seasonal_forecast::config::{ForecastConfig, PipelineProfile};
use seasonal_forecast::data::Observation;
use seasonal_forecast::utils::SyntheticSeries;
use seasonal_forecast::{CancellationFlag, ForecastError, ForecastPipeline, RankingKey};

fn metro_feed() -> Vec<Observation> {
    let mut feed = Vec::new();
    // contributes to WV, KY and OH
    feed.extend(monthly_observations("Huntington-Ashland, WV-KY-OH", &[30.0; 24]));
    feed.extend(monthly_observations("Abilene, TX", &[80.0; 24]));
    feed.extend(monthly_observations("Columbus, OH", &[10.0; 24]));
    // too short on its own
    feed.extend(monthly_observations("Cheyenne, WY", &[5.0; 11]));
    feed.push(Observation::new(ym(2016, 1).first_day().unwrap(), "   ", 1.0));
    feed.push(Observation::new(ym(2016, 1).first_day().unwrap(), "Nowhere, ", 1.0));
    feed
}

fn mean_pipeline(config: ForecastConfig) -> ForecastPipeline<MeanModel> {
    ForecastPipeline::with_model(config, MeanModel::default()).unwrap()
}

#[test]
fn test_metro_run() {
    let config = ForecastConfig::for_profile(PipelineProfile::Metro).with_horizon(12);
    let output = mean_pipeline(config).run(&metro_feed()).unwrap();

    // OH averages its own 10s with the shared 30s
    let order: Vec<(&str, f64)> = output
        .ranking
        .iter()
        .map(|e| (e.group.as_str(), e.score))
        .collect();
    assert_eq!(order, vec![("TX", 80.0), ("KY", 30.0), ("WV", 30.0), ("OH", 20.0)]);

    assert_eq!(output.ranked.len(), 4);
    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].group, "WY");
    assert!(matches!(
        output.skipped[0].error,
        ForecastError::InsufficientData { needed: 12, got: 11 }
    ));
    assert_eq!(output.dropped_records.malformed, 1);
    assert_eq!(output.dropped_records.degenerate, 1);
    assert!(!output.cancelled);

    let outlooks = output.outlooks();
    assert_eq!(outlooks[0].group_key, "TX");
    assert_eq!(outlooks[0].historical.len(), 24);
    assert_eq!(outlooks[0].forecast.len(), 12);
    assert_eq!(outlooks[0].forecast[0].month, ym(2017, 1));
}

#[test]
fn test_top_n_limits_ranked_but_not_ranking() {
    let config = ForecastConfig::for_profile(PipelineProfile::Metro)
        .with_horizon(6)
        .with_top_n(2);
    let output = mean_pipeline(config).run(&metro_feed()).unwrap();

    assert_eq!(output.ranked.len(), 2);
    assert_eq!(output.ranking.len(), 4);
    assert_eq!(output.ranked[1].group(), "KY");
}

#[test]
fn test_identity_keeps_composite_keys() {
    let config = ForecastConfig::for_profile(PipelineProfile::Sector).with_horizon(6);
    let output = mean_pipeline(config).run(&metro_feed()).unwrap();

    let groups: Vec<&str> = output.ranking.iter().map(|e| e.group.as_str()).collect();
    assert_eq!(
        groups,
        vec!["Abilene, TX", "Huntington-Ashland, WV-KY-OH", "Columbus, OH"]
    );
    // blank and trailing-comma keys are elementary as-is
    assert_eq!(output.dropped_records.degenerate, 0);
}

#[test]
fn test_no_fittable_group_is_empty_result() {
    let feed = monthly_observations("Cheyenne, WY", &[5.0; 11]);
    let config = ForecastConfig::for_profile(PipelineProfile::Metro);

    let result = mean_pipeline(config).run(&feed);
    assert!(matches!(result, Err(ForecastError::EmptyResultSet)));

    let result = mean_pipeline(ForecastConfig::default()).run(&[]);
    assert!(matches!(result, Err(ForecastError::EmptyResultSet)));
}

#[test]
fn test_cancel_before_start() {
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let config = ForecastConfig::for_profile(PipelineProfile::Metro);
    let result = mean_pipeline(config).run_with_cancellation(&metro_feed(), &cancel);
    assert!(matches!(result, Err(ForecastError::Cancelled)));
}

#[test]
fn test_cancel_mid_run_keeps_finished_groups() {
    let cancel = CancellationFlag::new();
    let model = MeanModel {
        cancel_after_first: Some(cancel.clone()),
    };
    let config = ForecastConfig::for_profile(PipelineProfile::Metro).with_workers(1);
    let pipeline = ForecastPipeline::with_model(config, model).unwrap();

    let output = pipeline.run_with_cancellation(&metro_feed(), &cancel).unwrap();

    assert!(output.cancelled);
    assert_eq!(output.ranking.len(), 1);
    // groups are fitted in key order, so KY went first
    assert_eq!(output.ranked[0].group(), "KY");
    let cancelled: Vec<&str> = output
        .skipped
        .iter()
        .filter(|s| matches!(s.error, ForecastError::Cancelled))
        .map(|s| s.group.as_str())
        .collect();
    assert_eq!(cancelled, vec!["OH", "TX", "WV", "WY"]);
}

#[test]
fn test_output_serializes() {
    let config = ForecastConfig::for_profile(PipelineProfile::Metro).with_horizon(3);
    let output = mean_pipeline(config).run(&metro_feed()).unwrap();

    let json = output.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["ranked"][0]["fit"]["group"], "TX");
    assert_eq!(value["skipped"][0]["group"], "WY");
    assert!(value["skipped"][0]["reason"]
        .as_str()
        .unwrap()
        .starts_with("Insufficient data"));
}

#[test]
fn test_sarima_pipeline_is_idempotent() {
    let gen = SyntheticSeries::new(120.0, 0.4, 12.0, 2.0);
    let mut feed = gen.observations("Software", ym(2016, 1), 48, 3).unwrap();
    feed.extend(gen.observations("Nursing", ym(2016, 1), 48, 4).unwrap());
    feed.extend(
        SyntheticSeries::new(60.0, -0.1, 5.0, 1.0)
            .observations("Retail", ym(2017, 1), 36, 5)
            .unwrap(),
    );

    let config = ForecastConfig::for_profile(PipelineProfile::Sector).with_horizon(12);
    let pipeline = ForecastPipeline::new(config).unwrap();

    let first = pipeline.run(&feed).unwrap();
    let mut shuffled = feed.clone();
    shuffled.reverse();
    let second = pipeline.run(&shuffled).unwrap();

    assert_eq!(first.ranking.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_trend_and_season_are_continued() {
    let gen = SyntheticSeries::new(100.0, 0.5, 10.0, 1.0);
    let months = 96;
    let feed = gen.observations("National", ym(2012, 1), months, 42).unwrap();

    let config = ForecastConfig::for_profile(PipelineProfile::Aggregate).with_horizon(36);
    let output = ForecastPipeline::new(config).unwrap().run(&feed).unwrap();

    assert_eq!(output.ranked.len(), 1);
    let fit = &output.ranked[0].fit;
    assert_eq!(fit.forecast.len(), 36);
    assert_eq!(fit.forecast[0].month, ym(2020, 1));
    assert!(fit.r_squared <= 1.0);

    for (h, point) in fit.forecast.iter().enumerate() {
        let expected = gen.expected(months + h);
        let tolerance = if h < 12 { 6.0 } else { 0.1 * expected };
        assert!(
            (point.mean - expected).abs() < tolerance,
            "month {}: forecast {} vs expected {}",
            point.month,
            point.mean,
            expected
        );
        assert!(point.lower <= point.mean && point.mean <= point.upper);
    }

    // the trend carries on: the last forecast year sits above the first
    let first_year: f64 = fit.forecast[..12].iter().map(|p| p.mean).sum();
    let last_year: f64 = fit.forecast[24..].iter().map(|p| p.mean).sum();
    assert!(last_year > first_year);

    // flat counts as non-decreasing up to a small numerical slack
    let slack = 1e-2;
    for pair in fit.forecast.windows(2) {
        assert!(pair[0].width() > 0.0);
        assert!(pair[1].width() >= pair[0].width() * (1.0 - slack));
    }
    assert!(fit.forecast[35].width() > fit.forecast[0].width());
}

#[test]
fn test_ranking_key_from_config() {
    let config = ForecastConfig::for_profile(PipelineProfile::Metro)
        .with_horizon(3)
        .with_ranking_key(RankingKey::HistoricalMean);
    let output = mean_pipeline(config).run(&metro_feed()).unwrap();

    assert_eq!(output.ranked[0].group(), "TX");
    assert_eq!(output.ranked[0].score, 80.0);
}
