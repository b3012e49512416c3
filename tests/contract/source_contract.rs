use std::sync::Arc;

use tickrange_core::{
    AlphaVantageAdapter, CannedHttpClient, HttpClient, MarketstackAdapter, PriceSeriesSource,
    ProviderId, SourceErrorKind, Symbol, YahooChartAdapter,
};

const MARKETSTACK_BODY: &str = r#"{"data": [
    {"date": "2024-05-03T00:00:00+0000", "high": 184.0, "low": 181.0, "close": 183.4},
    {"date": "2024-05-02T00:00:00+0000", "high": 174.0, "low": 171.0, "close": 173.0}
]}"#;

const YAHOO_BODY: &str = r#"{"chart": {"result": [{
    "timestamp": [1714656600, 1714743000],
    "indicators": {"quote": [{"high": [174.0, 184.0], "low": [171.0, 181.0], "close": [173.0, 183.4]}]}
}], "error": null}}"#;

const ALPHAVANTAGE_BODY: &str = r#"{"Time Series (Daily)": {
    "2024-05-02": {"2. high": "174.0", "3. low": "171.0", "4. close": "173.0"},
    "2024-05-03": {"2. high": "184.0", "3. low": "181.0", "4. close": "183.4"}
}}"#;

struct SourceCase {
    id: ProviderId,
    build: fn(Arc<dyn HttpClient>) -> Arc<dyn PriceSeriesSource>,
    valid_body: &'static str,
}

fn source_cases() -> Vec<SourceCase> {
    vec![
        SourceCase {
            id: ProviderId::Marketstack,
            build: |client| Arc::new(MarketstackAdapter::new(client, "key")),
            valid_body: MARKETSTACK_BODY,
        },
        SourceCase {
            id: ProviderId::Yahoo,
            build: |client| Arc::new(YahooChartAdapter::new(client)),
            valid_body: YAHOO_BODY,
        },
        SourceCase {
            id: ProviderId::Alphavantage,
            build: |client| Arc::new(AlphaVantageAdapter::new(client, "key")),
            valid_body: ALPHAVANTAGE_BODY,
        },
    ]
}

fn aapl() -> Symbol {
    Symbol::parse("AAPL").expect("valid symbol")
}

#[tokio::test]
async fn every_source_reports_its_provider_id() {
    for case in source_cases() {
        let source = (case.build)(Arc::new(CannedHttpClient::ok_json(case.valid_body)));
        assert_eq!(source.id(), case.id);
    }
}

#[tokio::test]
async fn valid_payload_yields_series_for_requested_symbol() {
    for case in source_cases() {
        let source = (case.build)(Arc::new(CannedHttpClient::ok_json(case.valid_body)));

        let series = source
            .fetch(&aapl())
            .await
            .unwrap_or_else(|error| panic!("provider '{}' fetch failed: {error}", case.id));

        assert_eq!(series.symbol.as_str(), "AAPL", "provider '{}': symbol", case.id);
        assert_eq!(series.len(), 2, "provider '{}': point count", case.id);
        assert!(series.len() <= 365, "provider '{}': history cap", case.id);
        for point in &series.points {
            assert!(
                point.high.is_finite() && point.low.is_finite() && point.close.is_finite(),
                "provider '{}': finite prices",
                case.id
            );
        }
        let latest = series
            .points
            .iter()
            .max_by_key(|point| point.date)
            .expect("non-empty");
        assert_eq!(latest.close, 183.4, "provider '{}': latest close", case.id);
    }
}

#[tokio::test]
async fn non_success_status_is_transport_for_every_source() {
    for case in source_cases() {
        let source = (case.build)(Arc::new(CannedHttpClient::status(503, "unavailable")));

        let error = source.fetch(&aapl()).await.expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::Transport, "provider '{}'", case.id);
        assert_eq!(error.code(), "source.transport");
    }
}

#[tokio::test]
async fn network_failure_is_transport_for_every_source() {
    for case in source_cases() {
        let source = (case.build)(Arc::new(CannedHttpClient::failing("dns lookup failed")));

        let error = source.fetch(&aapl()).await.expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::Transport, "provider '{}'", case.id);
    }
}

#[tokio::test]
async fn unparseable_payload_is_no_data_for_every_source() {
    for case in source_cases() {
        let source = (case.build)(Arc::new(CannedHttpClient::ok_json("not json")));

        let error = source.fetch(&aapl()).await.expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::NoData, "provider '{}'", case.id);
        assert_eq!(error.code(), "source.no_data");
    }
}

#[tokio::test]
async fn credentials_never_appear_in_error_messages() {
    let client = Arc::new(CannedHttpClient::failing("connection reset"));
    let sources: Vec<Arc<dyn PriceSeriesSource>> = vec![
        Arc::new(MarketstackAdapter::new(client.clone(), "top-secret-key")),
        Arc::new(AlphaVantageAdapter::new(client, "top-secret-key")),
    ];

    for source in sources {
        let error = source.fetch(&aapl()).await.expect_err("must fail");
        assert!(
            !error.to_string().contains("top-secret-key"),
            "provider '{}' leaked its key",
            source.id()
        );
    }
}
