//! Loading a config file and installing it process-wide.
//!
//! Installing touches process-global state (the global publisher and the
//! tracing subscriber), so this binary holds a single test.

use courier_config::{Config, ConfigError, ConfigLayer};
use courier_events::{EventsError, FailurePolicy, PublisherConfig, args, configure_global, global};
use courier_telemetry::{LogFormat, LogTarget};
use courier_test::{Recorder, panicking_handler, test_channel};

#[test]
fn installed_config_drives_the_global_publisher_and_logging() {
    let dir = tempfile::tempdir().unwrap();

    // A log directory that cannot be created fails the install up front.
    let occupied = dir.path().join("occupied");
    std::fs::write(&occupied, "a file, not a directory").unwrap();
    let broken = dir.path().join("broken.toml");
    std::fs::write(
        &broken,
        format!(
            r#"
            [publisher]
            failure_policy = "propagate"

            [logging]
            target = {{ file = '{}' }}
            "#,
            occupied.join("logs").display()
        ),
    )
    .unwrap();
    let broken = Config::load_file(&broken).unwrap();
    assert!(matches!(broken.install(), Err(ConfigError::Telemetry(_))));

    let logs = dir.path().join("logs");
    let path = dir.path().join("courier.toml");
    std::fs::write(
        &path,
        format!(
            r#"
            [publisher]
            failure_policy = "isolate"

            [logging]
            level = "debug"
            format = "json"
            ansi = false
            target = {{ file = '{}' }}

            [logging.file]
            prefix = "integration"
            rotation = "never"
            "#,
            logs.display()
        ),
    )
    .unwrap();

    let resolved = Config::load(Some(&path)).unwrap();
    assert_eq!(resolved.source("publisher.failure_policy"), Some(ConfigLayer::Explicit));
    let config = resolved.config;
    assert_eq!(config.publisher.failure_policy, FailurePolicy::Isolate);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.target, LogTarget::File(logs.clone()));

    config.install().unwrap();
    assert!(logs.is_dir());

    // Both halves of the install are one-shot.
    assert!(matches!(config.install(), Err(ConfigError::Telemetry(_))));
    assert!(matches!(
        configure_global(PublisherConfig::default()),
        Err(EventsError::AlreadyConfigured)
    ));

    assert_eq!(global().config().failure_policy, FailurePolicy::Isolate);

    let channel = test_channel("integration.install");
    let recorder = Recorder::new();
    let panicking = panicking_handler("isolated");
    global().subscribe(&channel, move |receiver, args| panicking(receiver, args));
    recorder.subscribe(global(), &channel);

    let delivery = global().publish(&channel, args![]).unwrap().unwrap();
    assert_eq!(delivery.failures(), 1);
    assert_eq!(recorder.count(), 1);

    tracing::info!(channel = %channel, "install check complete");
    let written = std::fs::read_dir(&logs).unwrap().count();
    assert!(written >= 1);
}
