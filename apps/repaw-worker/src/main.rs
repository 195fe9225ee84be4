use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = repaw_worker::Args::parse();
	repaw_worker::run(args).await
}
