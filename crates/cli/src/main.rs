//! # Event Pub/Sub CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 模板渲染预览
//! - 事件发布与优雅关闭

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_publish, run_render, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 日志由 observability 初始化，Prometheus 端口由 run 命令单独开启
    observability::init_tracing(&observability::ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: cli.log_level().to_string(),
        log_span_close: cli.verbose > 1,
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Event Pub/Sub CLI starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_publish(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Render(args) => run_render(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
