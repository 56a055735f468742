//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置文件 -> 输出构建 -> 发布 的端到端测试（内存客户端，无需 GCP）
//! - 发布摘要统计

#[cfg(test)]
mod contract_tests {
    use contracts::{ContractError, Event, EventData, OutputConfig};

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_default_output_is_disabled() {
        let config = OutputConfig::default();
        assert!(!config.pubsub.is_enabled());
        assert!(config.pubsub.publish_timeout().is_none());
    }

    #[test]
    fn test_event_object_snapshot() {
        let time = chrono::DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let event = Event::new(
            "alerts",
            "firing",
            Some(EventData::Raw(bytes::Bytes::from_static(br#"{"n":1}"#))),
        )
        .with_time(time);

        let object = event.json_object().unwrap();
        assert_eq!(object["channel"], "alerts");
        assert_eq!(object["type"], "firing");
        assert_eq!(object["data"]["n"], 1);
        assert!(object["time"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_raw_non_json_payload_is_conversion_error() {
        let event = Event::new(
            "alerts",
            "firing",
            Some(EventData::Raw(bytes::Bytes::from_static(b"plain text"))),
        );
        assert!(matches!(
            event.json_object(),
            Err(ContractError::EventConversion { .. })
        ));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;

    use bytes::Bytes;
    use config_loader::ConfigLoader;
    use contracts::{ContractError, Event, EventData, EventOutput, PubSubOutputConfig};
    use dispatcher::{create_dispatcher, Dispatcher, MemoryPublisher};
    use observability::PublishSummary;
    use serde_json::json;

    const CONFIG: &str = r#"
[pubsub]
credentials = '{"type":"service_account"}'
project_id = "events-prod"
message = '{"channel":"{{ channel }}","text":"{{ data.text }}"}'
topic_selector = """
{% for t in data.topics %}{{ t }}
{% endfor %}"""
"#;

    async fn build(
        config_path: &Path,
        client: MemoryPublisher,
    ) -> Option<Dispatcher<MemoryPublisher>> {
        let config = ConfigLoader::load_from_path(config_path).unwrap();
        create_dispatcher(&config.pubsub, &config.template, move |_: &PubSubOutputConfig| async move {
            Ok::<_, ContractError>(client)
        })
        .await
        .unwrap()
    }

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn event(text: &str, topics: &[&str]) -> Event {
        Event::new(
            "alerts",
            "firing",
            Some(EventData::Json(json!({"text": text, "topics": topics}))),
        )
    }

    /// End-to-end test: config file -> output -> memory client
    ///
    /// 验证完整的数据流：
    /// 1. ConfigLoader 加载并验证 TOML
    /// 2. create_dispatcher 编译模板并创建输出
    /// 3. 每个事件按 topic 列表依次发布，失败的 topic 不影响其他 topic
    /// 4. PublishSummary 汇总计数
    #[tokio::test]
    async fn test_e2e_config_to_publish() {
        let file = config_file(CONFIG);
        let client = MemoryPublisher::new().fail_topic("broken");
        let output = build(file.path(), client).await.unwrap();

        output.send(Some(event("cpu", &["ops", "broken", "audit"])));
        output.send(Some(event("disk", &["ops"])));
        output.send(Some(Event::new("alerts", "firing", None)));
        output.send(None);
        output.shutdown().await;

        let mut published = output.client().published();
        published.sort_by(|a, b| a.payload.cmp(&b.payload).then(a.topic.cmp(&b.topic)));
        let pairs: Vec<_> = published
            .iter()
            .map(|m| (m.topic.as_str(), m.payload.clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("audit", Bytes::from_static(br#"{"channel":"alerts","text":"cpu"}"#)),
                ("ops", Bytes::from_static(br#"{"channel":"alerts","text":"cpu"}"#)),
                ("ops", Bytes::from_static(br#"{"channel":"alerts","text":"disk"}"#)),
            ]
        );

        let summary = PublishSummary::from_counts(output.metrics().snapshot());
        assert_eq!(summary.total_requests, 4);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.topics["ops"].requests, 2);
        assert_eq!(summary.topics["broken"].errors, 1);
        assert_eq!(summary.topics["audit"].successes(), 1);
        assert!(output.client().is_shut_down());

        let report = summary.to_string();
        assert!(report.contains("Requests: 4"));
        assert!(report.contains("Errors: 1 (25.00%)"));
    }

    #[tokio::test]
    async fn test_e2e_disabled_output() {
        let file = config_file(
            r#"
[pubsub]
project_id = "events-prod"
message = "{{ data }}"
"#,
        );

        assert!(build(file.path(), MemoryPublisher::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_e2e_templates_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let message_path = dir.path().join("message.tera");
        let selector_path = dir.path().join("selector.tera");
        std::fs::write(&message_path, "{{ type }}@{{ channel }}").unwrap();
        std::fs::write(&selector_path, "{{ channel }}-events").unwrap();

        let config_path = dir.path().join("output.toml");
        std::fs::write(
            &config_path,
            format!(
                "[pubsub]\ncredentials = \"{{}}\"\nproject_id = \"p\"\nmessage = {:?}\ntopic_selector = {:?}\n",
                message_path.display().to_string(),
                selector_path.display().to_string(),
            ),
        )
        .unwrap();

        let output = build(&config_path, MemoryPublisher::new()).await.unwrap();
        output.send(Some(event("cpu", &[])));
        output.shutdown().await;

        let published = output.client().published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "alerts-events");
        assert_eq!(published[0].payload, Bytes::from_static(b"firing@alerts"));
    }

    #[tokio::test]
    async fn test_e2e_many_concurrent_events_drain() {
        let file = config_file(CONFIG);
        let client = MemoryPublisher::new().with_delay(Duration::from_millis(5));
        let output = build(file.path(), client).await.unwrap();

        let sink: &dyn EventOutput = &output;
        for i in 0..100 {
            sink.send(Some(event(&format!("e{i}"), &["a", "b"])));
        }
        output.shutdown().await;

        assert_eq!(output.in_flight(), 0);
        assert_eq!(output.client().published().len(), 200);
        assert_eq!(output.metrics().total_requests(), 200);
        assert_eq!(output.metrics().total_errors(), 0);
    }
}
