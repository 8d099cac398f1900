use std::process;

use rlox::cli;

fn main() {
    env_logger::init();

    let cli = match cli::parse() {
        Ok(cli) => cli,
        Err(why) => {
            println!("{}", why);
            process::exit(cli::EXIT_USAGE);
        }
    };
    process::exit(cli.run());
}
