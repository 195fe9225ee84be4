use clap::Parser;
use tracing_subscriber::EnvFilter;

use repaw_service::RepawService;

pub mod worker;

#[derive(Debug, Parser)]
#[command(
	version = repaw_cli::VERSION,
	rename_all = "kebab",
	styles = repaw_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = repaw_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = repaw_storage::db::Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.providers.embedding.dimensions).await?;

	let sweep = config.sweep.clone();
	let state = worker::WorkerState { sweep, service: RepawService::new(config, db) };

	worker::run_sweeper(state).await
}
