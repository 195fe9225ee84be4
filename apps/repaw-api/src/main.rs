use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = repaw_api::Args::parse();
	repaw_api::run(args).await
}
