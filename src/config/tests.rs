use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;

const ALL_VARS: &[&str] = &[
    "PLAGD_PORT",
    "PLAGD_BIND_ADDR",
    "PLAGD_ENV",
    "PLAGD_OPENAI_API_KEY",
    "PLAGD_OPENAI_BASE_URL",
    "PLAGD_COMPLETION_MODEL",
    "PLAGD_EMBEDDING_MODEL",
    "PLAGD_EMBEDDING_DIM",
    "PLAGD_SUPABASE_URL",
    "PLAGD_SUPABASE_KEY",
    "PLAGD_SAMPLE_COUNT",
    "PLAGD_RATE_LIMIT_BACKOFF_MS",
    "PLAGD_MAX_RETRY_ATTEMPTS",
    "PLAGD_SIMILARITY_THRESHOLD",
    "PLAGD_TOP_K",
    "PLAGD_QUEUE_CAPACITY",
    "PLAGD_REQUEST_TIMEOUT_SECS",
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_plagd_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        for var in ALL_VARS {
            env::remove_var(var);
        }
    }
}

fn live_config() -> Config {
    Config {
        mode: ProviderMode::Live,
        openai_api_key: Some("sk-test".to_string()),
        supabase_url: Some("https://db.example.com".to_string()),
        supabase_key: Some("service-key".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.mode, ProviderMode::Dev);
    assert_eq!(config.embedding_dim, 1536);
    assert_eq!(config.sample_count, 2);
    assert_eq!(config.rate_limit_backoff, Duration::from_secs(2));
    assert!(config.max_retry_attempts.is_none());
    assert_eq!(config.similarity_threshold, 0.5);
    assert_eq!(config.top_k, 3);
    assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
    assert!(config.validate().is_ok());
}

#[test]
fn test_socket_addr() {
    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_plagd_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert_eq!(config.mode, ProviderMode::Dev);
    assert!(config.openai_api_key.is_none());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_plagd_env();

    with_env_vars(
        &[
            ("PLAGD_PORT", "3000"),
            ("PLAGD_BIND_ADDR", "::1"),
            ("PLAGD_EMBEDDING_DIM", "8"),
            ("PLAGD_SAMPLE_COUNT", "4"),
            ("PLAGD_RATE_LIMIT_BACKOFF_MS", "250"),
            ("PLAGD_MAX_RETRY_ATTEMPTS", "5"),
            ("PLAGD_SIMILARITY_THRESHOLD", "0.75"),
            ("PLAGD_TOP_K", "10"),
            ("PLAGD_QUEUE_CAPACITY", "16"),
            ("PLAGD_REQUEST_TIMEOUT_SECS", "5"),
            ("PLAGD_COMPLETION_MODEL", "gpt-4o"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.port, 3000);
            assert_eq!(
                config.bind_addr,
                IpAddr::V6(std::net::Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
            );
            assert_eq!(config.embedding_dim, 8);
            assert_eq!(config.sample_count, 4);
            assert_eq!(config.rate_limit_backoff, Duration::from_millis(250));
            assert_eq!(config.max_retry_attempts, Some(5));
            assert_eq!(config.similarity_threshold, 0.75);
            assert_eq!(config.top_k, 10);
            assert_eq!(config.queue_capacity, 16);
            assert_eq!(config.request_timeout, Duration::from_secs(5));
            assert_eq!(config.completion_model, "gpt-4o");
        },
    );
}

#[test]
#[serial]
fn test_zero_max_retry_attempts_means_unbounded() {
    clear_plagd_env();

    with_env_vars(&[("PLAGD_MAX_RETRY_ATTEMPTS", "0")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.max_retry_attempts.is_none());
        assert!(config.retry_policy().is_unbounded());
    });
}

#[test]
#[serial]
fn test_from_env_mode() {
    clear_plagd_env();

    with_env_vars(&[("PLAGD_ENV", "LIVE")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.mode, ProviderMode::Live);
    });

    with_env_vars(&[("PLAGD_ENV", "staging")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidMode { .. })));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_port() {
    clear_plagd_env();

    with_env_vars(&[("PLAGD_PORT", "0")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidPort { .. })
        ));
    });

    with_env_vars(&[("PLAGD_PORT", "not-a-number")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::PortParseError { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_bind_addr() {
    clear_plagd_env();

    with_env_vars(&[("PLAGD_BIND_ADDR", "localhost")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidBindAddr { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_number() {
    clear_plagd_env();

    with_env_vars(&[("PLAGD_TOP_K", "three")], || {
        match Config::from_env() {
            Err(ConfigError::InvalidNumber { name, value }) => {
                assert_eq!(name, "PLAGD_TOP_K");
                assert_eq!(value, "three");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    });
}

#[test]
#[serial]
fn test_blank_values_fall_back_to_defaults() {
    clear_plagd_env();

    with_env_vars(
        &[("PLAGD_OPENAI_API_KEY", "   "), ("PLAGD_EMBEDDING_DIM", "")],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.openai_api_key.is_none());
            assert_eq!(config.embedding_dim, 1536);
        },
    );
}

#[test]
fn test_validate_rejects_bad_numbers() {
    let cases = [
        Config {
            embedding_dim: 0,
            ..Default::default()
        },
        Config {
            sample_count: 0,
            ..Default::default()
        },
        Config {
            top_k: 0,
            ..Default::default()
        },
        Config {
            similarity_threshold: 1.5,
            ..Default::default()
        },
        Config {
            similarity_threshold: f32::NAN,
            ..Default::default()
        },
        Config {
            queue_capacity: 0,
            ..Default::default()
        },
        Config {
            request_timeout: Duration::ZERO,
            ..Default::default()
        },
    ];

    for config in cases {
        assert!(
            matches!(config.validate(), Err(ConfigError::OutOfRange { .. })),
            "expected OutOfRange for {config:?}"
        );
    }
}

#[test]
fn test_validate_live_requires_credentials() {
    assert!(live_config().validate().is_ok());

    let missing_key = Config {
        openai_api_key: None,
        ..live_config()
    };
    assert!(matches!(
        missing_key.validate(),
        Err(ConfigError::MissingEnvVar {
            name: "PLAGD_OPENAI_API_KEY"
        })
    ));

    let missing_store = Config {
        supabase_key: None,
        ..live_config()
    };
    assert!(matches!(
        missing_store.validate(),
        Err(ConfigError::MissingEnvVar {
            name: "PLAGD_SUPABASE_KEY"
        })
    ));
}

#[test]
fn test_dev_mode_needs_no_credentials() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(config.openai_config().is_err());
}

#[test]
fn test_derived_settings() {
    let config = Config {
        embedding_dim: 8,
        sample_count: 3,
        top_k: 5,
        similarity_threshold: 0.25,
        rate_limit_backoff: Duration::from_millis(100),
        max_retry_attempts: Some(4),
        ..live_config()
    };

    let pipeline = config.pipeline_config();
    assert_eq!(pipeline.sample_count, 3);
    assert_eq!(pipeline.dims, DimConfig::new(8));
    assert_eq!(pipeline.retry.backoff, Duration::from_millis(100));
    assert_eq!(pipeline.retry.max_attempts, Some(4));

    let scorer = config.scorer();
    assert_eq!(scorer.dimension(), 8);
    assert_eq!(scorer.top_k(), 5);
    assert_eq!(scorer.threshold(), 0.25);

    let openai = config.openai_config().unwrap();
    assert_eq!(openai.api_key, "sk-test");
    assert_eq!(openai.timeout, config.request_timeout);
}

#[test]
fn test_debug_redacts_secrets() {
    let rendered = format!("{:?}", live_config());
    assert!(!rendered.contains("sk-test"));
    assert!(!rendered.contains("service-key"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn test_provider_mode_display_round_trip() {
    assert_eq!(ProviderMode::Dev.to_string(), "dev");
    assert_eq!("live".parse::<ProviderMode>().unwrap(), ProviderMode::Live);
}
