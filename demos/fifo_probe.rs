// Sampler diagnostics example
//
// Restarts the PIO sampler and drains raw words from its receive FIFO, which
// is handy when bringing up new firmware.

use clap::Parser;
use pico_la_rs::{PicoConnector, SessionConfig};

#[derive(Parser)]
#[command(name = "fifo_probe")]
#[command(about = "Restart the sampler and dump raw FIFO words")]
struct Args {
    /// Serial port of the analyzer
    port: String,

    #[arg(short, long, default_value_t = 8, help = "Maximum number of words to read")]
    words: usize,

    #[arg(long, help = "Do not restart the sampler first")]
    no_restart: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = SessionConfig::new().with_port(args.port);
    let mut analyzer = PicoConnector::connect(&config)?;

    if !args.no_restart {
        for line in analyzer.restart_sampler()? {
            println!("> {}", line);
        }
    }

    for i in 0..args.words {
        match analyzer.query_fifo()? {
            Some(word) => println!("{:3}: 0x{:08x} {:032b}", i, word, word),
            None => {
                println!("FIFO empty after {} word(s)", i);
                break;
            }
        }
    }

    Ok(())
}
