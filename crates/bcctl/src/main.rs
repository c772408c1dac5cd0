//! `bcctl`: run a command on a target through a broadcast relay and exit with its outcome.

mod cli;
mod config;

use std::{process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use bcctl_core::{
    Broadcaster, ExecutionController, NoProgress, ProgressReporter, TeamCityProgress,
    TrackingIdGenerator,
};
use bcctl_info::TargetInfoEndpoint;
use bcctl_model::ExitOutcome;
use bcctl_observe::{LoggerConfig, logger_init};
use bcctl_relay::TcpRelay;
use clap::Parser;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

use crate::{
    cli::{Cli, Command, ExecArgs, InfoArgs},
    config::FileConfig,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(outcome) => ExitCode::from(outcome.code()),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitOutcome> {
    let logger = LoggerConfig::new(cli.log_format, cli.log_level.clone());
    logger_init(&logger).context("failed to initialise logging")?;

    let file = FileConfig::load_or_default(&cli.config_file);
    let (host, port) = file.broadcaster(cli.broadcaster_host.clone(), cli.broadcaster_port);

    let target = match &cli.command {
        Command::Exec(args) => args.target.clone(),
        Command::Info(args) => args.target.clone(),
    };
    let controller = ExecutionController::new(host, port, target)?;
    debug!(relay = %controller.endpoint(), exec_target = controller.target(), "controller ready");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    let outcome = match cli.command {
        Command::Exec(args) => execute(&runtime, &controller, args, cli.teamcity),
        Command::Info(args) => show_info(&runtime, &controller, args),
    };
    Ok(outcome)
}

fn execute(
    runtime: &Runtime,
    controller: &ExecutionController,
    args: ExecArgs,
    teamcity: bool,
) -> ExitOutcome {
    let reporter: Arc<dyn ProgressReporter> = if teamcity {
        Arc::new(TeamCityProgress::stdout())
    } else {
        Arc::new(NoProgress)
    };
    let relay: Arc<dyn Broadcaster> = Arc::new(TcpRelay::new(
        controller.endpoint().clone(),
        controller.target(),
    ));

    let request = controller.prepare(
        &TrackingIdGenerator::default(),
        args.cmd,
        args.args,
        Duration::from_secs(args.waiting_timeout),
        Duration::from_secs(args.pending_timeout),
    );
    info!(
        tracking_id = %request.tracking_id(),
        "Executing \"{}\" on {}",
        request.command_line(),
        request.target()
    );

    let outcome = runtime.block_on(controller.run_execution(request, relay, reporter));
    info!(%outcome, "execution finished");
    outcome
}

fn show_info(runtime: &Runtime, controller: &ExecutionController, args: InfoArgs) -> ExitOutcome {
    let timeout = Duration::from_secs(args.timeout);

    if !args.rest {
        let relay: Arc<dyn Broadcaster> = Arc::new(TcpRelay::new(
            controller.endpoint().clone(),
            controller.target(),
        ));
        return runtime.block_on(controller.run_info(timeout, relay, std::io::stdout()));
    }

    let endpoint = controller.endpoint();
    let api = TargetInfoEndpoint::new(
        controller.target(),
        endpoint.host(),
        args.api_port.unwrap_or(endpoint.port()),
    );
    match runtime.block_on(api.fetch(timeout)) {
        Ok(body) => {
            println!("{body}");
            ExitOutcome::Success
        }
        Err(e) => {
            error!("{e}");
            ExitOutcome::Failure
        }
    }
}
