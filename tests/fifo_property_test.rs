use proptest::prelude::*;
use proptest::sample::Index;
use rask_logkit::{LogConfig, Logger, StderrConsole, values};
use std::sync::Arc;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_file_lines_keep_call_order(messages in proptest::collection::vec("[a-z]{1,12}", 1..60)) {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir).with_buffer_size(3);

        let bodies = log_and_read(config, &messages, None);

        prop_assert_eq!(bodies, expected(&messages));
    }

    #[test]
    fn prop_order_survives_full_queue_and_stop(
        messages in proptest::collection::vec("[a-z]{1,12}", 1..120),
        capacity in 2usize..=8,
        stop_at in any::<Index>(),
    ) {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir)
            .with_buffer_size(2)
            .with_queue_capacity(capacity);
        let stop_at = stop_at.index(messages.len());

        let bodies = log_and_read(config, &messages, Some(stop_at));

        prop_assert_eq!(bodies, expected(&messages));
    }
}

fn file_config(dir: &TempDir) -> LogConfig {
    LogConfig::default()
        .with_dir(dir.path())
        .with_file_switch(true)
        .with_console_switch(false)
        .with_head_switch(false)
}

/// Logs `messages` in order, calling `stop()` right before the message at
/// `stop_at`, releases, and returns the bodies found in today's file.
fn log_and_read(config: LogConfig, messages: &[String], stop_at: Option<usize>) -> Vec<String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    let written = runtime.block_on(async {
        let logger = Logger::new(config, Arc::new(StderrConsole));
        for (i, message) in messages.iter().enumerate() {
            if stop_at == Some(i) {
                logger.stop();
            }
            logger.i_tag("fifo", values![format!("{i}:{message}")]);
        }
        logger.release().await;
        std::fs::read_to_string(logger.current_log_file_path()).unwrap()
    });

    written
        .lines()
        .filter_map(|line| line.split_once("I/fifo: ").map(|(_, body)| body.to_string()))
        .collect()
}

fn expected(messages: &[String]) -> Vec<String> {
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| format!("{i}:{message}"))
        .collect()
}
