use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = asterism_api::Args::parse();

	asterism_api::run(args).await
}
