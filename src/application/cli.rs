#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::runner;
use super::runner::RunOptions;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ShareName;
use crate::domain::models::ToolName;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!(
        "Created default config file at {}",
        config_file_path.display()
    );
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Toolgate")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Toolgate with environment variable RUST_LOG=toolgate")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_run() -> Command {
    return Command::new("run")
        .about("Run a tool. Omit the tool name to pick one interactively.")
        .arg(
            Arg::new("tool")
                .help("Which tool to run.")
                .num_args(1)
                .value_parser(PossibleValuesParser::new(ToolName::VARIANTS)),
        )
        .arg(
            Arg::new("field")
                .short('f')
                .long("field")
                .help("A tool field as key=value. Repeat for every field. Run `toolgate tools` to see each tool's fields.")
                .action(ArgAction::Append)
                .num_args(1),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("File to upload for tools that take one.")
                .num_args(1)
                .value_parser(value_parser!(path::PathBuf)),
        )
        .arg(
            Arg::new("interactive")
                .long("interactive")
                .help("Prompt for any field not passed with --field.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("copy")
                .long("copy")
                .help("Copy output number N to the clipboard.")
                .num_args(1)
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("download")
                .short('d')
                .long("download")
                .help("Save the result to the download directory. Binary results are always saved.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("share")
                .long("share")
                .help("Share the result, falling back to the clipboard when no share target is configured.")
                .action(ArgAction::SetTrue),
        );
}

fn run_options(matches: &ArgMatches) -> RunOptions {
    return RunOptions {
        tool: matches
            .get_one::<String>("tool")
            .and_then(|e| return ToolName::parse(e)),
        fields: matches
            .get_many::<String>("field")
            .map(|values| return values.map(|e| return e.to_string()).collect())
            .unwrap_or_default(),
        input: matches.get_one::<path::PathBuf>("input").cloned(),
        interactive: matches.get_flag("interactive"),
        copy: matches.get_one::<usize>("copy").copied(),
        download: matches.get_flag("download"),
        share: matches.get_flag("share"),
    };
}

fn global_arg(key: ConfigKey, env: &'static str, help: String) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("toolgate")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(subcommand_run())
        .subcommand(Command::new("credits").about("Print your remaining credits."))
        .subcommand(Command::new("tools").about("List every tool with its fields."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("TOOLGATE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(global_arg(
            ConfigKey::ClerkID,
            "TOOLGATE_CLERK_ID",
            "Your user id from sign in. Attached to every backend call.".to_string(),
        ))
        .arg(global_arg(
            ConfigKey::ApiURL,
            "TOOLGATE_API_URL",
            format!("Base URL of the tool API. [default: {}]", Config::default(ConfigKey::ApiURL)),
        ))
        .arg(global_arg(
            ConfigKey::PlansURL,
            "TOOLGATE_PLANS_URL",
            format!("Base URL of the plans and credits API. [default: {}]", Config::default(ConfigKey::PlansURL)),
        ))
        .arg(global_arg(
            ConfigKey::PricingURL,
            "TOOLGATE_PRICING_URL",
            format!("Page shown when you run out of credits. [default: {}]", Config::default(ConfigKey::PricingURL)),
        ))
        .arg(global_arg(
            ConfigKey::DownloadDir,
            "TOOLGATE_DOWNLOAD_DIR",
            format!("Directory results are downloaded to. [default: {}]", Config::default(ConfigKey::DownloadDir)),
        ))
        .arg(global_arg(
            ConfigKey::DenylistFile,
            "TOOLGATE_DENYLIST_FILE",
            "Extra prohibited terms, one per line, on top of the built-in list.".to_string(),
        ))
        .arg(
            global_arg(
                ConfigKey::ShareTarget,
                "TOOLGATE_SHARE_TARGET",
                format!("Where shared results go. [default: {}]", Config::default(ConfigKey::ShareTarget)),
            )
            .value_parser(PossibleValuesParser::new(ShareName::VARIANTS)),
        )
        .arg(global_arg(
            ConfigKey::ShareCommand,
            "TOOLGATE_SHARE_COMMAND",
            "Program run by the command share target. Receives the title as an argument and the text on stdin.".to_string(),
        ));
}

/// Parses arguments and runs the selected command. Returns false when the
/// command ran but did not succeed, such as a blocked or failed tool.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("run", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return runner::run_tool(run_options(subcmd_matches)).await;
        }
        Some(("credits", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return runner::print_credits().await;
        }
        Some(("tools", _)) => {
            println!("{}", runner::tools_text());
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        Some(("debug", debug_matches)) => match debug_matches.subcommand() {
            Some(("log-path", _)) => {
                println!("{}", crate::log_dir().join("debug.log").display());
            }
            Some(("enum-config", _)) => {
                println!("{}", ConfigKey::VARIANTS.join("\n"));
            }
            _ => {
                subcommand_debug().print_long_help()?;
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
        }
        _ => {
            build().print_long_help()?;
        }
    }

    return Ok(true);
}
