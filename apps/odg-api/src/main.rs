use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = odg_api::Args::parse();

	odg_api::run(args).await
}
