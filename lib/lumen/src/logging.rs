pub use slog::{crit, debug, error, info, o, trace, warn, Discard, Logger};

/// Builds the root terminal logger. All crates receive child loggers derived
/// from the one returned here.
pub fn init() -> Logger {
    use sloggers::{Config, LoggerConfig};

    let config: LoggerConfig = serdeconv::from_toml_str(
        r#"
type = "terminal"
level = "debug"
destination = "stderr"
"#,
    )
    .expect("Error parsing logger config");

    config.build_logger().expect("Error building logger")
}
