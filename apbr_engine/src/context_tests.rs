//! Unit tests for context.rs

use crate::context::{Config, RenderContext};
use crate::graphics_device::MockGraphicsDevice;
use crate::log::{BuildProfile, DiagnosticSink, LogSeverity, MemoryLogger};

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.app_name, "APBR");
    assert_eq!(config.app_version, (0, 1, 0));
    assert_eq!(config.info_log_capacity, 512);
}

#[test]
fn test_config_version_string() {
    let config = Config {
        app_version: (2, 10, 3),
        ..Config::default()
    };
    assert_eq!(config.version_string(), "2.10.3");
}

#[test]
fn test_new_logs_welcome_line() {
    let logger = MemoryLogger::new();
    let config = Config {
        app_name: "Triangle".to_string(),
        app_version: (1, 2, 0),
        ..Config::default()
    };

    let _ctx = RenderContext::new(
        MockGraphicsDevice::new(),
        DiagnosticSink::with_profile(logger.clone(), BuildProfile::Debug),
        config,
    );

    assert_eq!(logger.len(), 1);
    assert!(logger.contains(LogSeverity::Info, "Welcome to Triangle version 1.2.0"));
}

#[test]
fn test_welcome_line_filtered_in_release() {
    let logger = MemoryLogger::new();
    let _ctx = RenderContext::new(
        MockGraphicsDevice::new(),
        DiagnosticSink::with_profile(logger.clone(), BuildProfile::Release),
        Config::default(),
    );

    assert!(logger.is_empty());
}

#[test]
fn test_accessors() {
    let device = MockGraphicsDevice::new();
    let ctx = RenderContext::new(
        device.clone(),
        DiagnosticSink::with_profile(MemoryLogger::new(), BuildProfile::Release),
        Config::default(),
    );

    assert_eq!(ctx.config().info_log_capacity, 512);
    assert_eq!(ctx.sink().min_severity(), LogSeverity::Warn);

    let program = ctx.device().create_program();
    assert!(device.is_program_live(program));
}

#[test]
fn test_drop_flushes_sink() {
    let logger = MemoryLogger::new();
    {
        let _ctx = RenderContext::new(
            MockGraphicsDevice::new(),
            DiagnosticSink::with_profile(logger.clone(), BuildProfile::Debug),
            Config::default(),
        );
        assert_eq!(logger.flush_count(), 0);
    }

    assert_eq!(logger.flush_count(), 1);
}

#[test]
fn test_debug_output() {
    let ctx = RenderContext::new(
        MockGraphicsDevice::new(),
        DiagnosticSink::with_profile(MemoryLogger::new(), BuildProfile::Debug),
        Config::default(),
    );
    let debug = format!("{:?}", ctx);

    assert!(debug.contains("RenderContext"));
    assert!(debug.contains("APBR"));
}
