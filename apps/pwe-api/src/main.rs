use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = pwe_api::Args::parse();

	pwe_api::run(args).await
}
