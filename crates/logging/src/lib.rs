use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

const PATTERN: &str = "SP | {d(%Y-%m-%d %H:%M:%S)} | {({l}):5.5} | {f}:{L} — {m}{n}";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("could not open log file: {0}")]
    File(#[from] std::io::Error),
    #[error("invalid logging configuration: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),
    #[error("a logger is already installed: {0}")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

/// Installs the console sink and, when `file` is given, a file sink.
pub fn init(file: Option<&str>, level: LevelFilter) -> Result<(), LoggingError> {
    let config = build_config(file, level)?;
    log4rs::init_config(config)?;

    log_panics::init();
    Ok(())
}

fn build_config(file: Option<&str>, level: LevelFilter) -> Result<Config, LoggingError> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    let mut root = Root::builder().appender("stdout");
    let mut config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)));

    if let Some(file) = file {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(file)?;

        config = config.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let config = config.build(root.build(level))?;

    Ok(config)
}
