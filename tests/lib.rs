use modal_registry::logger;


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use super::test_utils::{content, test_registry};

    fn setup() {
        let _ = logger::init();
        logger::enable_logging();
        logger::set_log_to_stdout(false);
    }

    #[test]
    fn test_logger_init_is_repeatable() {
        setup();
        assert!(logger::init().is_ok());
        assert!(logger::is_logging_enabled());
    }

    #[test]
    fn test_logger_writes_registry_activity_to_file() {
        setup();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let log_path = dir.path().join("modal.log");
        logger::set_log_file(log_path.to_str().expect("utf-8 path"))
            .expect("Failed to set log file");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build runtime");
        runtime.block_on(async {
            let registry = test_registry();
            let handle = registry.open_default(content("Logged"));
            registry.close_modal_with_success(handle.id(), json!(true));
            assert_eq!(handle.await, json!(true));
        });

        let written = std::fs::read_to_string(&log_path).expect("Failed to read log");
        assert!(written.contains("Opening modal"));
        assert!(written.contains("modal_registry"));
    }
}
