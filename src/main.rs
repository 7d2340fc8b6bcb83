use converter::commands::Converter;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

fn main() {
    // Receive cmd args
    let args = Converter::from_args();

    // logs go to stderr, stdout is for the user messages
    let default_filter = if args.verbose {
        "converter=debug,warn"
    } else {
        "converter=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // execute commands
    match args.handle() {
        Ok(out) => println!("{}", out),
        Err(e) => {
            println!("Error: {:?}", e);
            std::process::exit(1);
        }
    }
}
