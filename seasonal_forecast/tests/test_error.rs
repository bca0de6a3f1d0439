use forecast_math::MathError;
use seasonal_forecast::ForecastError;

#[test]
fn test_error_messages() {
    let err = ForecastError::InsufficientData { needed: 12, got: 11 };
    assert_eq!(
        err.to_string(),
        "Insufficient data: need at least 12 monthly points, got 11"
    );

    let err = ForecastError::MalformedGroupKey("  ".to_string());
    assert_eq!(err.to_string(), "Malformed group key: \"  \"");

    let err = ForecastError::FitFailed("did not converge".to_string());
    assert_eq!(err.to_string(), "Model fit failed: did not converge");
}

#[test]
fn test_error_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: ForecastError = io.into();
    assert!(matches!(err, ForecastError::IoError(_)));

    let math = MathError::InvalidInput("bad".to_string());
    let err: ForecastError = math.into();
    assert!(matches!(err, ForecastError::MathError(_)));
    assert_eq!(err.to_string(), "Math error: Invalid input: bad");

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: ForecastError = json.into();
    assert!(matches!(err, ForecastError::ConfigError(_)));
}
