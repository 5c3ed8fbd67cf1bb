//! Loading configuration from files and wiring it into the engines

use sociograph::config::{ConfigLoader, LogFormat, LogLevel};
use sociograph::prelude::*;
use std::io::Write;

#[test]
fn test_yaml_file_configures_engines() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temp file");
    writeln!(
        file,
        "logging:\n  level: warn\n  format: json\n  stdout: false\n\
         relationships:\n  default_mutual_limit: 5\n\
         requests:\n  notification_type_key: follow.requested"
    )
    .unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_file(file.path()).expect("Failed to load file");
    let config = loader.extract().expect("Failed to extract config");

    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(!config.logging.stdout);
    assert_eq!(config.relationships.default_mutual_limit, 5);
    assert_eq!(config.relationships.default_query_limit, 200);
    assert_eq!(config.requests.notification_type_key, "follow.requested");

    let graph = init(config).expect("Failed to initialize");
    assert_eq!(graph.config().requests.notification_type_key, "follow.requested");
}

#[test]
fn test_json_file_with_invalid_values_is_rejected() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    write!(file, r#"{{"inbox": {{"default_page_size": 600, "max_page_size": 500}}}}"#).unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_file(file.path()).unwrap();
    assert!(loader.extract().is_err());
}

#[tokio::test]
async fn test_request_type_key_reaches_approver_items() {
    let config = ConfigBuilder::testing()
        .with_request_type_key("follow.requested")
        .build()
        .unwrap();
    let private = EntityRef::user("private");
    let graph = Sociograph::builder()
        .with_config(config)
        .with_governance(std::sync::Arc::new(
            StaticPolicy::new().require_approval(private.clone()),
        ))
        .build()
        .unwrap();

    graph
        .notifications()
        .create_follow_request(NewFollowRequest::follow(
            "acme",
            EntityRef::user("r"),
            private.clone(),
            "k1",
        ))
        .await
        .unwrap();

    let page = graph
        .notifications()
        .query_inbox(InboxQuery::new("acme", private))
        .await
        .unwrap();
    assert_eq!(page.items[0].event.kind, "follow.requested");
}

#[test]
fn test_version_is_set() {
    assert!(!sociograph::VERSION.is_empty());
}
