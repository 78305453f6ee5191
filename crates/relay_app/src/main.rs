mod platform;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use relay_core::TemplateKey;
use relay_engine::PromptLibrary;
use relay_logging::relay_error;

use platform::logging::{self, LogDestination};
use platform::{describe, load_config, run_host, run_send, SendRequest};

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Relay selected text to a chat backend and present the reply")]
#[command(version)]
struct Cli {
    /// Path to the RON configuration file
    #[arg(short, long, global = true, default_value = "relay.ron")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Where log output goes
    #[arg(long, global = true, value_enum, default_value = "stderr")]
    log: LogDestination,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a browser extension over native messaging on stdin/stdout
    Host,

    /// Send one selection and print the result
    Send {
        /// Selection text; read from stdin when omitted
        #[arg(short, long)]
        text: Option<String>,

        /// URL of the page the selection came from
        #[arg(long)]
        url: Option<String>,

        /// Title of the page the selection came from
        #[arg(long)]
        title: Option<String>,

        /// Prompt template to prepend (summarize, format)
        #[arg(long, value_parser = parse_template)]
        template: Option<TemplateKey>,
    },

    /// Validate the configuration without sending anything
    CheckConfig,

    /// List prompt templates and whether they load
    Templates,
}

fn parse_template(raw: &str) -> Result<TemplateKey, String> {
    TemplateKey::parse(raw).ok_or_else(|| {
        format!(
            "unknown template \"{raw}\" (expected one of: {})",
            PromptLibrary::list().join(", ")
        )
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            relay_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Host => {
            run_host(config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Send {
            text,
            url,
            title,
            template,
        } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read selection from stdin")?;
                    buf
                }
            };
            let request = SendRequest {
                text,
                page_url: url,
                page_title: title,
                template,
            };
            let shown = run_send(config, request, io::stdout())?;
            Ok(match shown {
                Some(presentation) if !presentation.is_error => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        Commands::CheckConfig => {
            println!("{}", describe(&config));
            match config.validate() {
                Ok(()) => {
                    println!("Configuration OK");
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    println!("{}: {}", err.title(), err);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Templates => {
            let library = PromptLibrary::new(config.prompts_dir.clone());
            for key in TemplateKey::ALL {
                let body = library.get(key);
                if body.is_empty() {
                    println!("{:<10} {}  (missing)", key.as_str(), key.relative_path());
                } else {
                    println!(
                        "{:<10} {}  ({} chars)",
                        key.as_str(),
                        key.relative_path(),
                        body.chars().count()
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
