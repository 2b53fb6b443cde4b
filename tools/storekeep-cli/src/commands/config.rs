//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use serde_json::json;
use storekeep_auth::{PasswordHasher, PasswordPolicy};
use storekeep_core::clock::SystemClock;
use storekeep_core::ids::CouponId;
use storekeep_core::promotion::{Coupon, CouponStatus};
use tracing_subscriber::EnvFilter;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig, CONFIG_FILE_NAMES};
use crate::context::{find_config_file, Context};

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Set { key, value } => set_config(&key, &value, ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(built-in defaults)"),
    }

    let coupon = &ctx.config.coupon;
    ctx.output.info("[coupon]");
    ctx.output
        .kv("validity_days", &coupon.validity_days.to_string());
    ctx.output.kv("kind", coupon.kind.label());
    ctx.output.kv("value", &coupon.value.to_string());
    ctx.output.kv("status", coupon.status.label());
    ctx.output.kv("stock", &coupon.stock.to_string());

    let password = &ctx.config.password;
    ctx.output.info("[password]");
    ctx.output.kv("memory_kib", &password.memory_kib.to_string());
    ctx.output.kv("iterations", &password.iterations.to_string());
    ctx.output.kv("parallelism", &password.parallelism.to_string());
    ctx.output.kv("default_password", "********");
    ctx.output.kv("min_length", &password.min_length.to_string());
    ctx.output
        .kv("max_memory_kib", &password.max_memory_kib.to_string());
    ctx.output
        .kv("max_iterations", &password.max_iterations.to_string());

    ctx.output.info("[logging]");
    ctx.output.kv("filter", &ctx.config.logging.filter);

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = get_config_value(&ctx.config, key)?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }

    Ok(())
}

fn set_config(key: &str, value: &str, ctx: &Context) -> Result<()> {
    let Some(config_path) = ctx
        .config_path
        .clone()
        .or_else(|| find_config_file(&ctx.cwd))
    else {
        bail!("No config file found. Run `storekeep config init` to create one.");
    };
    let config_path = config_path.to_string_lossy().to_string();

    let mut config = CliConfig::load(&config_path)?;
    set_config_value(&mut config, key, value)?;
    config.save(&config_path)?;

    ctx.output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_FILE_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check_config(&ctx.config);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Collect errors and warnings for a configuration.
fn check_config(config: &CliConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = Coupon::with_defaults(CouponId::new("config-check"), &config.coupon, &SystemClock)
    {
        errors.push(format!("coupon: {}", e));
    }
    if config.coupon.status == CouponStatus::Active && config.coupon.stock <= 0 {
        warnings.push("coupon.status is active but coupon.stock is 0".to_string());
    }

    match PasswordHasher::new(config.password.clone()) {
        Ok(hasher) => {
            if hasher
                .validate_strength(&config.password.default_password)
                .is_err()
            {
                warnings.push("password.default_password does not meet the strength rules".to_string());
            }
        }
        Err(e) => errors.push(format!("password: {}", e)),
    }
    let recommended = PasswordPolicy::default();
    if config.password.memory_kib < recommended.memory_kib {
        warnings.push(format!(
            "password.memory_kib {} is below the recommended {}",
            config.password.memory_kib, recommended.memory_kib
        ));
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.filter) {
        errors.push(format!("logging.filter: {}", e));
    }

    (errors, warnings)
}

fn get_config_value(config: &CliConfig, key: &str) -> Result<String> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["coupon", "validity_days"] => Ok(config.coupon.validity_days.to_string()),
        ["coupon", "kind"] => Ok(format!("\"{}\"", config.coupon.kind.code())),
        ["coupon", "value"] => Ok(config.coupon.value.to_string()),
        ["coupon", "status"] => Ok(format!("\"{}\"", config.coupon.status.code())),
        ["coupon", "stock"] => Ok(config.coupon.stock.to_string()),
        ["password", "memory_kib"] => Ok(config.password.memory_kib.to_string()),
        ["password", "iterations"] => Ok(config.password.iterations.to_string()),
        ["password", "parallelism"] => Ok(config.password.parallelism.to_string()),
        ["password", "default_password"] => {
            Ok(format!("\"{}\"", config.password.default_password))
        }
        ["password", "min_length"] => Ok(config.password.min_length.to_string()),
        ["password", "max_memory_kib"] => Ok(config.password.max_memory_kib.to_string()),
        ["password", "max_iterations"] => Ok(config.password.max_iterations.to_string()),
        ["logging", "filter"] => Ok(format!("\"{}\"", config.logging.filter)),
        _ => bail!("Unknown config key: {}", key),
    }
}

fn set_config_value(config: &mut CliConfig, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["coupon", "validity_days"] => config.coupon.validity_days = value.parse()?,
        ["coupon", "kind"] => config.coupon.kind = value.parse()?,
        ["coupon", "value"] => config.coupon.value = value.parse()?,
        ["coupon", "status"] => config.coupon.status = value.parse()?,
        ["coupon", "stock"] => config.coupon.stock = value.parse()?,
        ["password", "memory_kib"] => config.password.memory_kib = value.parse()?,
        ["password", "iterations"] => config.password.iterations = value.parse()?,
        ["password", "parallelism"] => config.password.parallelism = value.parse()?,
        ["password", "default_password"] => config.password.default_password = value.to_string(),
        ["password", "min_length"] => config.password.min_length = value.parse()?,
        ["password", "max_memory_kib"] => config.password.max_memory_kib = value.parse()?,
        ["password", "max_iterations"] => config.password.max_iterations = value.parse()?,
        ["logging", "filter"] => config.logging.filter = value.to_string(),
        _ => bail!("Unknown or read-only config key: {}", key),
    }

    Ok(())
}
