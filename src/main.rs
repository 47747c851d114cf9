use clap::{Arg, Command};
use log::LevelFilter;
use recipient_guard::{
    build_detector, Config, Error, FormValue, IdentityConverter, NewThreadForm, SpamDetector,
    SpamDetectorConfig, ThreadComposer, UserDirectory, UserProvider, UsernameConverter,
};
use std::process;

fn main() {
    let matches = Command::new("recipient-guard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve message recipients and screen new threads for spam")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/recipient-guard.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("resolve")
                .long("resolve")
                .value_name("TEXT")
                .help("Resolve a comma separated recipient list and print it normalized")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("sender")
                .long("sender")
                .value_name("USERNAME")
                .help("Sender of the draft to check")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("TEXT")
                .help("Recipients of the draft to check")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("subject")
                .long("subject")
                .value_name("TEXT")
                .default_value("")
                .help("Subject of the draft to check"),
        )
        .arg(
            Arg::new("body")
                .long("body")
                .value_name("TEXT")
                .default_value("")
                .help("Body of the draft to check"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with rule evidence")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/recipient-guard.yaml");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    let directory = match config.directory() {
        Ok(directory) => directory,
        Err(e) => {
            eprintln!("Invalid user directory: {e}");
            process::exit(1);
        }
    };

    let detector = match build_detector(&config.spam) {
        Ok(detector) => detector,
        Err(e) => {
            eprintln!("Invalid spam detector configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("Configuration OK");
        println!("  users: {}", directory.len());
        println!("  spam detector: {}", detector_label(&config));
        return;
    }

    let json = matches.get_flag("json");
    let composer = ThreadComposer::new(UsernameConverter::new(&directory), detector);

    if let Some(text) = matches.get_one::<String>("resolve") {
        resolve(&composer, text, json);
        return;
    }

    if let Some(sender) = matches.get_one::<String>("sender") {
        let form = NewThreadForm {
            recipients: matches.get_one::<String>("to").cloned().into(),
            subject: matches
                .get_one::<String>("subject")
                .cloned()
                .unwrap_or_default(),
            body: matches
                .get_one::<String>("body")
                .cloned()
                .unwrap_or_default(),
        };
        check_draft(&composer, &directory, sender, &form, json);
        return;
    }

    eprintln!("Nothing to do: pass --resolve, --sender/--to or --test-config");
    process::exit(2);
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the user list and spam rules to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn detector_label(config: &Config) -> String {
    match &config.spam {
        SpamDetectorConfig::Noop => "noop".to_string(),
        SpamDetectorConfig::Rules {
            threshold,
            blocked_senders,
            content_patterns,
            max_recipients,
            ..
        } => format!(
            "rules (threshold {}, {} blocked senders, {} content patterns, max recipients {})",
            threshold,
            blocked_senders.len(),
            content_patterns.len(),
            max_recipients.map_or("unlimited".to_string(), |m| m.to_string())
        ),
    }
}

fn resolve<C, D>(composer: &ThreadComposer<C, D>, text: &str, json: bool)
where
    C: IdentityConverter,
    D: SpamDetector,
{
    let converter = composer.recipients_converter();
    let resolved = converter.reverse(&FormValue::from(text)).and_then(|set| {
        let count = set.as_ref().map_or(0, |s| s.len());
        converter
            .forward(&FormValue::from(set))
            .map(|normalized| (count, normalized))
    });

    match resolved {
        Ok((count, normalized)) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "recipients": normalized, "count": count })
                );
            } else {
                println!("{normalized}");
            }
        }
        Err(e) => report_error(&e, json),
    }
}

fn check_draft<C, D>(
    composer: &ThreadComposer<C, D>,
    directory: &UserDirectory,
    sender: &str,
    form: &NewThreadForm,
    json: bool,
) where
    C: IdentityConverter,
    D: SpamDetector,
{
    let sender = match directory.find_by_username(sender) {
        Ok(Some(sender)) => sender,
        Ok(None) => {
            eprintln!("Unknown sender: {sender}");
            process::exit(1);
        }
        Err(e) => report_error(&e, json),
    };

    match composer.compose(&sender, form) {
        Ok(message) => {
            if json {
                match serde_json::to_string_pretty(&message) {
                    Ok(out) => println!("{out}"),
                    Err(e) => {
                        eprintln!("Error serializing message: {e}");
                        process::exit(1);
                    }
                }
            } else {
                println!(
                    "Accepted: {} -> {}",
                    message.sender.username,
                    message.recipients.usernames().join(", ")
                );
            }
        }
        Err(e) => report_error(&e, json),
    }
}

fn report_error(error: &Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": error.to_string() }));
    } else {
        eprintln!("Rejected: {error}");
    }
    process::exit(1);
}
