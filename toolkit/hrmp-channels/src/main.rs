use clap::Parser;
use ice_hrmp_channels::cli::{OpenChannelsCmd, setup_logging};

#[tokio::main]
async fn main() {
	if let Err(e) = setup_logging() {
		eprintln!("Could not set up logging: {e}");
		std::process::exit(1);
	}
	let cmd = OpenChannelsCmd::parse();
	if let Err(e) = ice_hrmp_channels::channels::run(&cmd.plan()).await {
		log::error!("{e}");
		std::process::exit(1);
	}
}
