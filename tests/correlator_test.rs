use log_grouper::{
    Config, Correlator, RecordingSink, RequestHead, ResponseInfo, Severity, Transport,
};
use std::time::Duration;

fn test_config() -> Config {
    let mut config = Config {
        project: "P".to_string(),
        queue_capacity: 1_000,
        batch_size: 100,
        flush_interval_ms: 50,
        shutdown_timeout_ms: 2_000,
        ..Config::default()
    };
    config.post_process();
    config
}

fn setup(config: &Config) -> (Correlator, Transport, RecordingSink) {
    let sink = RecordingSink::new();
    let transport = Transport::spawn(config.transport_config(), sink.clone()).unwrap();
    let correlator = Correlator::new(config, transport.clone());
    (correlator, transport, sink)
}

fn head(trace_header: Option<&str>) -> RequestHead {
    RequestHead {
        method: "GET".to_string(),
        url: "http://svc.test/items".to_string(),
        remote_ip: Some("10.0.0.9".to_string()),
        user_agent: Some("curl/8.0".to_string()),
        referer: None,
        request_size: Some(0),
        trace_header: trace_header.map(str::to_string),
    }
}

#[tokio::test]
async fn one_parent_and_n_children_per_request() {
    let config = test_config();
    let (correlator, transport, sink) = setup(&config);

    let mut logger = correlator.begin_request(head(None));
    logger.log(Severity::Info, "starting");
    logger.log(Severity::Warning, "slow lookup");
    logger.log(Severity::Info, "done");
    logger.finish(ResponseInfo {
        status: 200,
        response_size: Some(64),
    });

    transport.shutdown().await;

    assert_eq!(sink.records_for("application").len(), 3);
    assert_eq!(sink.records_for("request_log").len(), 1);
}

#[tokio::test]
async fn request_without_logs_still_emits_one_parent() {
    let config = test_config();
    let (correlator, transport, sink) = setup(&config);

    let logger = correlator.begin_request(head(None));
    let severity = logger.finish(ResponseInfo {
        status: 404,
        response_size: None,
    });

    transport.shutdown().await;

    assert_eq!(severity, Severity::Warning);
    let parents = sink.records_for("request_log");
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0].severity, Severity::Warning);
    assert_eq!(parents[0].message, None);
    let summary = parents[0].http_request.as_ref().unwrap();
    assert_eq!(summary.status, 404);
    assert!(sink.records_for("application").is_empty());
}

#[tokio::test]
async fn error_log_dominates_success_status() {
    let config = test_config();
    let (correlator, transport, sink) = setup(&config);

    let mut logger = correlator.begin_request(head(None));
    logger.log(Severity::Error, "lookup failed, using fallback");
    let severity = logger.finish(ResponseInfo {
        status: 200,
        response_size: Some(10),
    });

    transport.shutdown().await;

    assert_eq!(severity, Severity::Error);
    let parents = sink.records_for("request_log");
    assert_eq!(parents[0].severity, Severity::Error);
    assert_eq!(parents[0].http_request.as_ref().unwrap().status, 200);
}

#[tokio::test]
async fn parent_severity_never_undershoots_status_floor() {
    for (status, floor) in [(204, Severity::Info), (418, Severity::Warning), (502, Severity::Error)]
    {
        let config = test_config();
        let (correlator, transport, _sink) = setup(&config);

        let mut logger = correlator.begin_request(head(None));
        logger.log(Severity::Debug, "detail");
        let severity = logger.finish(ResponseInfo {
            status,
            response_size: None,
        });
        assert!(severity >= floor, "status {status} resolved to {severity}");

        transport.shutdown().await;
    }
}

#[tokio::test]
async fn below_threshold_records_are_neither_emitted_nor_aggregated() {
    let mut config = test_config();
    config.min_severity = Severity::Warning;
    let (correlator, transport, sink) = setup(&config);

    let mut logger = correlator.begin_request(head(None));
    logger.log(Severity::Info, "chatty detail");
    logger.log(Severity::Debug, "chattier detail");
    let severity = logger.finish(ResponseInfo {
        status: 200,
        response_size: None,
    });

    transport.shutdown().await;

    assert_eq!(severity, Severity::Info);
    assert!(sink.records_for("application").is_empty());
    assert_eq!(sink.records_for("request_log").len(), 1);
}

#[tokio::test]
async fn trace_and_span_propagate_to_parent_and_children() {
    let config = test_config();
    let (correlator, transport, sink) = setup(&config);

    let mut logger = correlator.begin_request(head(Some("abc123/456;o=1")));
    logger.log(Severity::Info, "with trace");
    logger.finish(ResponseInfo {
        status: 200,
        response_size: None,
    });

    transport.shutdown().await;

    let children = sink.records_for("application");
    assert_eq!(children[0].trace.as_deref(), Some("projects/P/traces/abc123"));
    assert_eq!(children[0].span_id.as_deref(), Some("456"));

    let parents = sink.records_for("request_log");
    assert_eq!(parents[0].trace.as_deref(), Some("projects/P/traces/abc123"));
    assert_eq!(parents[0].span_id.as_deref(), Some("456"));
}

#[tokio::test]
async fn native_context_mode_suppresses_parent_only() {
    let mut config = test_config();
    config.native_context = true;
    let (correlator, transport, sink) = setup(&config);

    let mut logger = correlator.begin_request(head(None));
    logger.log(Severity::Warning, "still forwarded");
    let severity = logger.finish(ResponseInfo {
        status: 500,
        response_size: None,
    });

    transport.shutdown().await;

    assert_eq!(severity, Severity::Error);
    assert!(sink.records_for("request_log").is_empty());
    assert_eq!(sink.records_for("application").len(), 1);
}

#[tokio::test]
async fn log_prefix_renames_both_streams() {
    let mut config = test_config();
    config.log_prefix = Some("svc".to_string());
    let (correlator, transport, sink) = setup(&config);

    let mut logger = correlator.begin_request(head(None));
    logger.log(Severity::Info, "hello");
    logger.finish(ResponseInfo {
        status: 200,
        response_size: None,
    });

    transport.shutdown().await;

    assert_eq!(sink.records_for("svc_application").len(), 1);
    assert_eq!(sink.records_for("svc_request_log").len(), 1);
    assert!(sink.records_for("application").is_empty());
}

#[tokio::test]
async fn concurrent_requests_keep_independent_tallies() {
    let config = test_config();
    let (correlator, transport, sink) = setup(&config);

    // Interleave two requests' observe/escalate sequences on independent
    // loggers; each must resolve as if it ran alone.
    let mut a = correlator.begin_request(head(None));
    let mut b = correlator.begin_request(head(None));

    a.log(Severity::Error, "a: failure");
    b.log(Severity::Info, "b: fine");
    a.log(Severity::Info, "a: recovering");
    b.log(Severity::Info, "b: still fine");

    let severity_b = b.finish(ResponseInfo {
        status: 200,
        response_size: None,
    });
    let severity_a = a.finish(ResponseInfo {
        status: 200,
        response_size: None,
    });

    transport.shutdown().await;

    assert_eq!(severity_a, Severity::Error);
    assert_eq!(severity_b, Severity::Info);
    assert_eq!(sink.records_for("request_log").len(), 2);
    assert_eq!(sink.records_for("application").len(), 4);
}

#[tokio::test]
async fn parallel_requests_across_tasks() {
    let config = test_config();
    let (correlator, transport, sink) = setup(&config);

    let mut handles = Vec::new();
    for i in 0..8 {
        let correlator = correlator.clone();
        handles.push(tokio::spawn(async move {
            let mut logger = correlator.begin_request(head(None));
            let severity = if i % 2 == 0 {
                Severity::Info
            } else {
                Severity::Critical
            };
            logger.log(severity, format!("request {i}"));
            logger.finish(ResponseInfo {
                status: 200,
                response_size: None,
            })
        }));
    }

    let mut critical = 0;
    for (i, handle) in handles.into_iter().enumerate() {
        let resolved = handle.await.unwrap();
        if i % 2 == 0 {
            assert_eq!(resolved, Severity::Info);
        } else {
            assert_eq!(resolved, Severity::Critical);
            critical += 1;
        }
    }
    assert_eq!(critical, 4);

    transport.shutdown().await;

    assert_eq!(sink.records_for("request_log").len(), 8);
    assert_eq!(sink.records_for("application").len(), 8);
}

#[tokio::test]
async fn parent_latency_serializes_with_five_decimals() {
    let config = test_config();
    let (correlator, transport, sink) = setup(&config);

    let logger = correlator.begin_request(head(None));
    tokio::time::sleep(Duration::from_millis(5)).await;
    logger.finish(ResponseInfo {
        status: 200,
        response_size: None,
    });

    transport.shutdown().await;

    let parents = sink.records_for("request_log");
    let value = serde_json::to_value(&parents[0]).unwrap();
    let latency = value["http_request"]["latency"].as_str().unwrap();
    assert!(latency.ends_with('s'));
    let digits = latency.trim_end_matches('s').split_once('.').unwrap().1;
    assert_eq!(digits.len(), 5);
}
