use anyhow::Context;
use helm_kernel::config::ConfigLoader;
use helm_logger::{LevelFilter, LogFormat, Logger, Rotation};
use helm_server::Server;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        loader = loader.file(path);
    }
    let cfg = loader.load_api().context("Critical: Configuration is malformed")?;

    let logging = &cfg.logging;
    let mut logger = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .format(logging.format.parse::<LogFormat>()?)
        .level(logging.level.parse::<LevelFilter>().context("Invalid logging.level")?);
    if let Some(directives) = &logging.directives {
        logger = logger.directives(directives.as_str());
    }
    if let Some(dir) = &logging.dir {
        logger = logger.file(dir, Rotation::DAILY);
    }
    let _log = logger.init()?;

    Server::builder().config(cfg).build().await?.run().await
}
