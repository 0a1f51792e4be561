use std::{
    io::{self, Read, Write},
    process::ExitCode,
    sync::Arc,
};

use clap::{builder::BoolishValueParser, Arg, ArgAction, ArgMatches, Command};
use tracing::{error, info, span, Level};

use blobstorage::{
    adapters::{gcs::GcsClient, memory::MemoryClient, s3::S3Client, ObjectClient},
    util::object::{parse_location_from_uri, parse_provider_from_uri, Provider},
    CloudStorage, ContentFile, StorageError, StorageSettings,
};

fn cli() -> Command {
    let name = || Arg::new("NAME").required(true).index(1);

    clap::Command::new("blobstorage")
        .about("File storage operations against an object bucket")
        .arg(
            Arg::new("BUCKET_URI")
                .help("gs://bucket[/prefix], s3://bucket[/prefix] or mem://bucket")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .env("GOOGLE_CLOUD_STORAGE_URL"),
        )
        .arg(
            Arg::new("cache-control")
                .long("cache-control")
                .env("GOOGLE_CLOUD_STORAGE_DEFAULT_CACHE_CONTROL"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new())
                .env("GOOGLE_CLOUD_STORAGE_LOGGING"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new())
                .env("GOOGLE_CLOUD_STORAGE_DEBUG"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("cat").arg(name()))
        .subcommand(
            Command::new("put")
                .arg(name())
                .arg(Arg::new("FILE").help("defaults to stdin").index(2)),
        )
        .subcommand(Command::new("rm").arg(name()))
        .subcommand(Command::new("exists").arg(name()))
        .subcommand(Command::new("ls").arg(Arg::new("PREFIX").default_value("").index(1)))
        .subcommand(Command::new("stat").arg(name()))
        .subcommand(Command::new("url").arg(name()))
}

fn settings_from(matches: &ArgMatches) -> StorageSettings {
    let mut settings = StorageSettings::from_env();

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        settings.base_url = base_url.clone();
    }
    if let Some(cache_control) = matches.get_one::<String>("cache-control") {
        settings.default_cache_control = cache_control.clone();
    }
    settings.logging_enabled |= matches.get_flag("log");
    settings.debug |= matches.get_flag("debug");

    settings
}

fn connect(provider: Provider) -> Result<Arc<dyn ObjectClient>, StorageError> {
    let client: Arc<dyn ObjectClient> = match provider {
        Provider::GCS => Arc::new(GcsClient::connect()?),
        Provider::AWS => Arc::new(S3Client::connect()?),
        Provider::Memory => Arc::new(MemoryClient::new()),
    };

    Ok(client)
}

fn run(matches: &ArgMatches) -> Result<(), StorageError> {
    let bucket_uri = matches
        .get_one::<String>("BUCKET_URI")
        .ok_or_else(|| StorageError::InvalidLocation(String::new()))?;
    let provider = parse_provider_from_uri(bucket_uri)?;
    let location = parse_location_from_uri(bucket_uri)?;
    info!(bucket_uri = %bucket_uri, location = %location, "args");

    let settings = settings_from(matches);
    let storage = CloudStorage::new(connect(provider)?, settings, Some(&location), None);

    let mut stdout = io::stdout().lock();
    let name_of = |sub: &ArgMatches| sub.get_one::<String>("NAME").cloned().unwrap_or_default();

    match matches.subcommand() {
        Some(("cat", sub)) => {
            let file = storage.open(&name_of(sub))?;
            stdout.write_all(file.as_bytes())?;
        }
        Some(("put", sub)) => {
            let data = match sub.get_one::<String>("FILE") {
                Some(path) => std::fs::read(path)?,
                None => {
                    let mut buf = Vec::new();
                    io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };

            let saved = storage.save(&name_of(sub), &mut ContentFile::new(data))?;
            writeln!(stdout, "{}", saved)?;
        }
        Some(("rm", sub)) => storage.delete(&name_of(sub))?,
        Some(("exists", sub)) => {
            writeln!(stdout, "{}", storage.exists(&name_of(sub))?)?;
        }
        Some(("ls", sub)) => {
            let prefix = sub.get_one::<String>("PREFIX").cloned().unwrap_or_default();
            let (directories, files) = storage.listdir(&prefix)?;

            for dir in directories {
                writeln!(stdout, "{}/", dir)?;
            }
            for file in files {
                writeln!(stdout, "{}", file)?;
            }
        }
        Some(("stat", sub)) => {
            let name = name_of(sub);
            writeln!(stdout, "size: {}", storage.size(&name)?)?;
            writeln!(stdout, "created: {}", storage.created_time(&name)?)?;
            writeln!(stdout, "modified: {}", storage.modified_time(&name)?)?;
        }
        Some(("url", sub)) => {
            let name = name_of(sub);
            writeln!(stdout, "{}", storage.url(&name))?;

            if let Some(local) = storage.emulator_url(&name) {
                writeln!(stdout, "local: {}", local)?;
            }
        }
        _ => {}
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .json()
        .with_writer(io::stderr)
        .init();

    let span = span!(Level::INFO, "main", context = "main");
    let _e = span.enter();
    info!("called");

    let matches = cli().get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error_message = %err, error_group = "run");
            eprintln!("blobstorage: {}", err);
            ExitCode::FAILURE
        }
    }
}
