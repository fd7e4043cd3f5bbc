use clap::Parser;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = odg_chart::Args::parse();

	odg_chart::run(args)
}
