use std::env;

use rmc::driver::{self, Command};

fn main() -> anyhow::Result<()> {
    let options = match driver::Options::parse_args(env::args().skip(1))? {
        Command::Help => {
            println!("{}", driver::USAGE);
            return Ok(());
        }
        Command::Run(options) => options,
    };

    driver::init_logging(options.verbose);
    driver::run(&options)?;

    Ok(())
}
