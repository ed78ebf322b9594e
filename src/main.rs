use comfort_cloud::cli::{self, Options};
use comfort_cloud::client::ComfortCloudClient;
use comfort_cloud::config::Config;
use comfort_cloud::error::ClientError;
use comfort_cloud::models::comfort_cloud::{Device, History, HistoryQuery, OperationMode};
use comfort_cloud::session::{self, Resumed};
use core::fmt;
use log::{error, info, warn};
use std::path::PathBuf;

#[derive(Debug)]
struct LoadedEnvFile {
    path: PathBuf,
    explicit: bool,
}

/// Why the binary stopped; each kind has its own exit code.
#[derive(Debug)]
enum Failure {
    Usage(String),
    Client(ClientError),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Usage(_) => 2,
            Failure::Client(ClientError::Transport(_)) => 3,
            Failure::Client(ClientError::HttpStatus { .. }) => 4,
            Failure::Client(ClientError::Auth(_)) => 5,
            Failure::Client(ClientError::Decode(_)) => 6,
            Failure::Client(ClientError::Control(_)) => 7,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Usage(s) => write!(f, "{}", s),
            Failure::Client(e) => write!(f, "{}", e),
        }
    }
}

impl From<ClientError> for Failure {
    fn from(value: ClientError) -> Self {
        Failure::Client(value)
    }
}

fn run(opts: &Options) -> Result<(), Failure> {
    // 1) Load config
    let cfg = Config::from_env().map_err(Failure::Usage)?;
    info!(
        "Config loaded (server={}, device={}, stored_token={}, credentials={}, timeout={})",
        cfg.server,
        cfg.device.as_deref().unwrap_or("-"),
        cfg.token.is_some(),
        cfg.credentials().is_some(),
        cfg.timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "-".to_string()),
    );

    // 2) Resume or create a session
    let mut client = ComfortCloudClient::with_config(&cfg.server, &cfg.transport());
    match session::resume(&mut client, cfg.token.as_deref(), cfg.credentials().as_ref())? {
        Resumed::Reused => info!("Authenticated with stored token"),
        Resumed::LoggedIn(token) => {
            info!("Authenticated with username/password");
            match cfg.persist_token(&token) {
                Ok(()) => info!("Session token saved to {}", cfg.token_file.display()),
                Err(e) => warn!("Could not save session token to {}: {}", cfg.token_file.display(), e),
            }
        }
    }

    // 3) Listing needs no device
    if opts.list {
        info!("Listing available devices");
        let devices = client.list_devices()?;
        if devices.is_empty() {
            return Err(Failure::Usage("No devices for configured account".to_string()));
        }
        info!("{} device(s) found", devices.len());
        for device in &devices {
            println!("{}", device);
        }
        return Ok(());
    }

    if !opts.needs_device() {
        warn!("Nothing to do; see --help");
        return Ok(());
    }

    // 4) Device actions, one request each
    let device = opts
        .device
        .clone()
        .or_else(|| cfg.device.clone())
        .ok_or_else(|| Failure::Usage("No device configured, use --device or COMFORT_CLOUD_DEVICE".to_string()))?;

    if opts.status {
        info!("Fetching status for {}", device);
        print_status(&client.get_device_status(&device)?);
    }

    if let Some(mode) = opts.history {
        info!("Fetching history for this {}", mode);
        print_history(&client.get_device_history(&device, &HistoryQuery::today(mode))?);
    }

    if opts.on {
        info!("Turning device on");
        client.turn_on(&device)?;
    }

    if opts.off {
        info!("Turning device off");
        client.turn_off(&device)?;
    }

    if let Some(t) = opts.temperature {
        info!("Setting temperature to {} degrees Celsius", t);
        client.set_temperature(&device, t)?;
    }

    if let Some(mode) = opts.mode {
        info!("Setting mode to {}", mode);
        client.set_mode(&device, mode)?;
    }

    Ok(())
}

fn print_status(status: &Device) {
    println!("GUID: {}", status.device_guid);
    println!("Capabilities:");
    println!("Auto mode: {}", status.auto_mode);
    println!("Heat mode: {}", status.heat_mode);
    println!("Dry mode: {}", status.dry_mode);
    println!("Cool mode: {}", status.cool_mode);
    println!("Fan mode: {}", status.fan_mode);
    println!("Fan Speed mode: {}", status.fan_speed_mode);
    println!("Quiet mode: {}", status.quiet_mode);
    println!("Eco function: {}", status.eco_function);
    println!("EcoNavi function: {}", status.eco_navi);
    println!("iAutoX: {}", status.i_auto_x);
    println!("NanoeX: {}", status.nanoe);
    println!("Modes:");
    for &mode in OperationMode::ALL.iter().filter(|m| status.supports(**m)) {
        match status.temperature_range(mode) {
            Some((min, max)) => println!("{}: {}-{}", mode, min, max),
            None => println!("{}", mode),
        }
    }
    println!("Current status:");
    println!("Status: {}", status.parameters.operate);
    println!("Online: {}", status.parameters.online);
    println!("Temperature: {:.1}", status.parameters.temperature_set);
    println!("Inside temperature: {:.1}", status.parameters.inside_temperature);
    println!("Outside temperature: {:.1}", status.parameters.out_temperature);
    println!("Mode: {}", status.parameters.operation_mode);
}

fn print_history(history: &History) {
    println!("#,AverageSettingTemp,AverageInsideTemp,AverageOutsideTemp");
    for entry in &history.entries {
        println!(
            "{},{},{},{}",
            entry.data_number + 1,
            entry.average_setting_temp,
            entry.average_inside_temp,
            entry.average_outside_temp
        );
    }
    let empty = history.entries.iter().filter(|e| e.is_empty()).count();
    if empty > 0 {
        info!("{} of {} bucket(s) carry no data", empty, history.entries.len());
    }
}

fn configure_env(opts: &Options) -> Result<Option<LoadedEnvFile>, String> {
    if let Some(path) = opts.env_file.clone() {
        if !path.is_file() {
            return Err(format!("env file not found: {}", path.display()));
        }
        cli::load_env_file(&path)?;
        return Ok(Some(LoadedEnvFile { path, explicit: true }));
    }

    let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
    let default_path = cwd.join(".env");
    if default_path.is_file() {
        cli::load_env_file(&default_path)?;
        Ok(Some(LoadedEnvFile {
            path: default_path,
            explicit: false,
        }))
    } else {
        Ok(None)
    }
}

fn main() {
    let opts = match cli::parse_args(std::env::args_os().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("fatal: {}\n\n{}", err, cli::USAGE);
            std::process::exit(2);
        }
    };
    if opts.help {
        println!("{}", cli::USAGE);
        return;
    }
    if opts.version {
        println!("version: {}", env!("CARGO_PKG_VERSION"));
        println!("commit: {}", env!("BUILD_TIME_GIT_HASH"));
        return;
    }

    let loaded_env = match configure_env(&opts) {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(2);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    let mut logger = env_logger::Builder::from_env(default_filter);
    logger.format_timestamp_secs();
    if opts.quiet {
        logger.filter_level(log::LevelFilter::Off);
    }
    logger.init();

    if let Some(info) = loaded_env.as_ref() {
        let origin = if info.explicit { "CLI-specified" } else { "default" };
        info!("Environment loaded from {} .env file: {}", origin, info.path.display());
    }

    info!(
        "comfort-cloud {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run(&opts) {
        error!("fatal: {}", e);
        std::process::exit(e.exit_code());
    }
}
