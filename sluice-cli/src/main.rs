//! sluice CLI 엔트리포인트
//!
//! 인자 해석 → 로깅 초기화 → 서브커맨드 디스패치 순서로 실행하고,
//! 에러는 [`CliError::exit_code`]에 따라 프로세스 종료 코드로 변환합니다.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use sluice_core::config::{GeneralConfig, SluiceConfig};

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Run(args) => {
            // run은 설정 파일이 필수이므로 로깅도 [general]로 초기화한다
            let config = SluiceConfig::load(&cli.config)?;
            logging::init_tracing(&config.general, cli.log_level.as_deref())?;
            commands::run::execute(args, &config, &writer)
        }
        Commands::Formats => {
            logging::init_tracing(&GeneralConfig::default(), cli.log_level.as_deref())?;
            commands::formats::execute(&writer)
        }
        Commands::Config(args) => {
            // 깨진 설정 파일도 진단해야 하므로 로깅은 기본값으로 초기화한다
            logging::init_tracing(&GeneralConfig::default(), cli.log_level.as_deref())?;
            commands::config::execute(args, &cli.config, &writer)
        }
    }
}
