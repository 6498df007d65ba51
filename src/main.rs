use clap::{Parser, Subcommand};
use log::error;

use fincalc::api::{Calculator, run_calculator_json, run_http_server};

#[derive(Parser, Debug)]
#[command(
    name = "fincalc",
    about = "Personal-finance calculators: mortgage payoff, buy vs rent, FIRE and more"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve every calculator as a JSON endpoint under /api.
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Run one calculator and print its result as JSON.
    Calc {
        #[arg(value_enum)]
        calculator: Calculator,
        /// camelCase JSON inputs; missing fields take the calculator defaults.
        #[arg(long, default_value = "{}")]
        json: String,
        #[arg(long, help = "Pretty-print the result")]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = run_http_server(port).await {
                error!("server error: {e}");
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Calc {
            calculator,
            json,
            pretty,
        } => {
            let rendered = run_calculator_json(calculator, &json).and_then(|value| {
                let text = if pretty {
                    serde_json::to_string_pretty(&value)?
                } else {
                    serde_json::to_string(&value)?
                };
                Ok(text)
            });
            match rendered {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(2);
                }
            }
        }
    }
}
