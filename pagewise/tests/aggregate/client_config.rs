use std::time::Duration;

use futures::StreamExt;
use pagewise::{Client, ClientConfiguration, ConfigError, ThrottleParameters};
use pagewise_mock::MockPageFetcher;

use crate::helpers::{ENDPOINT, as_fetcher};

#[test]
fn missing_credential_is_reported_before_anything_else() {
    let err = Client::builder()
        .api_endpoint("not a url")
        .build()
        .err()
        .expect("must fail");
    assert_eq!(err, ConfigError::MissingCredential);

    let err = Client::builder()
        .security_id("   ")
        .api_endpoint(ENDPOINT)
        .default_throttle()
        .build()
        .err()
        .expect("blank credential");
    assert_eq!(err, ConfigError::MissingCredential);
}

#[test]
fn endpoint_must_be_an_absolute_http_base() {
    for bad in ["", "data.example.com/v2", "ftp://data.example.com/", "mailto:ops@example.com"] {
        let err = Client::builder()
            .security_id("key")
            .api_endpoint(bad)
            .default_throttle()
            .build()
            .err()
            .unwrap_or_else(|| panic!("{bad:?} must be rejected"));
        assert!(
            matches!(err, ConfigError::MissingEndpoint { .. }),
            "{bad:?} gave {err:?}"
        );
    }
}

#[test]
fn throttle_parameters_must_be_present_and_positive() {
    let err = Client::builder()
        .security_id("key")
        .api_endpoint(ENDPOINT)
        .build()
        .err()
        .expect("no throttle");
    assert!(matches!(err, ConfigError::MissingThrottleParameters { .. }));

    for params in [
        ThrottleParameters::new(0, 10, Duration::from_secs(1)),
        ThrottleParameters::new(1, 0, Duration::from_secs(1)),
        ThrottleParameters::new(1, 10, Duration::ZERO),
    ] {
        let err = Client::builder()
            .security_id("key")
            .api_endpoint(ENDPOINT)
            .throttle(params)
            .build()
            .err()
            .expect("non-positive limit");
        assert!(matches!(err, ConfigError::MissingThrottleParameters { .. }));
    }
}

#[test]
fn deserialized_configuration_builds_a_client() {
    let json = r#"{
        "security_id": "key",
        "api_endpoint": "https://data.example.com/v2/",
        "throttle": { "max_concurrent": 3, "max_per_interval": 50, "interval": { "secs": 10, "nanos": 0 } }
    }"#;
    let cfg: ClientConfiguration = serde_json::from_str(json).expect("valid json");
    let client = pagewise::ClientBuilder::from_configuration(cfg)
        .build()
        .expect("valid configuration");

    assert_eq!(client.base_url().as_str(), ENDPOINT);
    assert_eq!(client.throttler().parameters().max_concurrent, 3);
    assert_eq!(client.throttler().parameters().interval, Duration::from_secs(10));
    assert_eq!(client.configuration().security_id_str(), "key");
}

#[tokio::test]
async fn rejected_configurations_never_reach_the_fetcher() {
    let mock = MockPageFetcher::<u32>::builder()
        .pages("trades", vec![vec![1, 2], vec![3]])
        .build();

    let rejected = [
        Client::builder(),
        Client::builder().api_endpoint(ENDPOINT).default_throttle(),
        Client::builder().security_id("key").default_throttle(),
        Client::builder().security_id("key").api_endpoint("ftp://data.example.com/"),
        Client::builder().security_id("key").api_endpoint(ENDPOINT),
        Client::builder()
            .security_id("key")
            .api_endpoint(ENDPOINT)
            .throttle(ThrottleParameters::new(1, 0, Duration::from_secs(1))),
    ];
    for builder in rejected {
        let attempt = builder
            .build()
            .map(|client| client.list(as_fetcher(&mock), "trades"));
        if let Ok(mut items) = attempt {
            while items.next().await.is_some() {}
            panic!("configuration should have been rejected");
        }
    }
    assert_eq!(mock.call_count(), 0);
}
