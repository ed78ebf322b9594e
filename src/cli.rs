//! Command-line surface: flag parsing and `.env` loading for the binary.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::models::comfort_cloud::{DataMode, OperationMode};

pub const USAGE: &str = "\
Usage: comfort-cloud [OPTIONS]

Options:
  --env-file PATH     Load environment from PATH instead of ./.env
  --device GUID       Device to issue commands to (overrides COMFORT_CLOUD_DEVICE)
  --list              List available devices
  --status            Display current status of the device
  --on                Turn the device on
  --off               Turn the device off
  --temp CELSIUS      Set the temperature
  --mode MODE         Set mode: auto, dry, cool, heat, fan
  --history PERIOD    Display history: day, week, month, year
  --quiet             Don't output any log messages
  --version           Show build version information
  --help              Show this help";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pub env_file: Option<PathBuf>,
    pub device: Option<String>,
    pub list: bool,
    pub status: bool,
    pub on: bool,
    pub off: bool,
    pub temperature: Option<f64>,
    pub mode: Option<OperationMode>,
    pub history: Option<DataMode>,
    pub quiet: bool,
    pub version: bool,
    pub help: bool,
}

impl Options {
    /// Whether any action needs a device GUID.
    pub fn needs_device(&self) -> bool {
        self.status || self.on || self.off || self.temperature.is_some() || self.mode.is_some() || self.history.is_some()
    }
}

/// Parse arguments, program name excluded. Both `--flag value` and `--flag=value` are accepted.
pub fn parse_args<I>(args: I) -> Result<Options, String>
where
    I: IntoIterator<Item = OsString>,
{
    let mut opts = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let arg = arg
            .into_string()
            .map_err(|_| "argument contains invalid UTF-8".to_string())?;
        if arg == "--" {
            break;
        }
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };

        let mut value = |name: &str| -> Result<String, String> {
            let v = match inline.clone() {
                Some(v) => v,
                None => args
                    .next()
                    .and_then(|v| v.into_string().ok())
                    .ok_or_else(|| format!("`{}` requires a value", name))?,
            };
            if v.is_empty() {
                return Err(format!("`{}` requires a value", name));
            }
            Ok(v)
        };

        match flag.as_str() {
            "--env-file" => set_once(&mut opts.env_file, PathBuf::from(value("--env-file")?), "--env-file")?,
            "--device" => set_once(&mut opts.device, value("--device")?, "--device")?,
            "--temp" => {
                let raw = value("--temp")?;
                let t = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|t| t.is_finite())
                    .ok_or_else(|| format!("invalid temperature '{}'", raw))?;
                set_once(&mut opts.temperature, t, "--temp")?
            }
            "--mode" => set_once(&mut opts.mode, value("--mode")?.parse::<OperationMode>()?, "--mode")?,
            "--history" => set_once(&mut opts.history, value("--history")?.parse::<DataMode>()?, "--history")?,
            "--list" => opts.list = true,
            "--status" => opts.status = true,
            "--on" => opts.on = true,
            "--off" => opts.off = true,
            "--quiet" => opts.quiet = true,
            "--version" => opts.version = true,
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unrecognised argument: {}", other)),
        }
    }

    if opts.on && opts.off {
        return Err("`--on` and `--off` are mutually exclusive".to_string());
    }
    Ok(opts)
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &str) -> Result<(), String> {
    if slot.is_some() {
        return Err(format!("`{}` provided more than once", name));
    }
    *slot = Some(value);
    Ok(())
}

/// Load `KEY=value` lines from `path` into the process environment.
/// Variables already present in the environment win.
pub fn load_env_file(path: &Path) -> Result<(), String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {}", path.display(), e))?;
    let reader = BufReader::new(file);

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("failed to read {} at line {}: {}", path.display(), index + 1, e))?;
        let assignment = parse_env_assignment(&line).map_err(|e| format!("{}:{}: {}", path.display(), index + 1, e))?;
        if let Some((key, value)) = assignment
            && std::env::var_os(&key).is_none()
        {
            // Updating process-level environment variables is unsafe on some targets.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }

    Ok(())
}

/// Parse one `.env` line. Blank lines and comments yield `None`.
pub fn parse_env_assignment(line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let body = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);
    let (key, raw) = body.split_once('=').ok_or_else(|| "missing '=' in assignment".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("environment variable name cannot be empty".to_string());
    }
    if key.chars().any(char::is_whitespace) {
        return Err(format!("environment variable name contains whitespace: {}", key));
    }

    let raw = raw.trim();
    let value = if let Some(rest) = raw.strip_prefix('"') {
        unquote(rest, '"', true)?
    } else if let Some(rest) = raw.strip_prefix('\'') {
        unquote(rest, '\'', false)?
    } else {
        raw.split('#').next().unwrap_or_default().trim_end().to_string()
    };
    Ok(Some((key.to_string(), value)))
}

/// Read a quoted value up to `quote`; only double quotes process escapes.
fn unquote(input: &str, quote: char, escapes: bool) -> Result<String, String> {
    let mut result = String::new();
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if escapes && ch == '\\' {
            let escaped = chars
                .next()
                .ok_or_else(|| "unterminated escape sequence in quoted value".to_string())?;
            result.push(match escaped {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                other => other,
            });
        } else if ch == quote {
            let remainder = chars.as_str().trim();
            return if remainder.is_empty() || remainder.starts_with('#') {
                Ok(result)
            } else {
                Err("unexpected characters after closing quote".to_string())
            };
        } else {
            result.push(ch);
        }
    }

    Err("unterminated quoted value".to_string())
}
