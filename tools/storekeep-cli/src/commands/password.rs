//! Password hashing commands.

use anyhow::{bail, Context as _, Result};
use serde_json::json;
use storekeep_auth::PasswordHasher;

use super::{PasswordArgs, PasswordCommand};
use crate::context::Context;

/// Run the password command.
pub fn run(args: PasswordArgs, ctx: &Context) -> Result<()> {
    match args.command {
        PasswordCommand::Hash {
            password,
            allow_weak,
        } => hash_password(&password, allow_weak, ctx),
        PasswordCommand::Verify { password, hash } => verify_password(&password, &hash, ctx),
        PasswordCommand::Inspect { hash } => inspect_hash(&hash, ctx),
    }
}

fn hasher(ctx: &Context) -> Result<PasswordHasher> {
    PasswordHasher::new(ctx.config.password.clone()).context("Invalid password policy")
}

fn hash_password(password: &str, allow_weak: bool, ctx: &Context) -> Result<()> {
    let hasher = hasher(ctx)?;

    if allow_weak {
        ctx.output.debug("Skipping strength check");
    } else {
        hasher.validate_strength(password)?;
    }

    let hash = hasher.hash(password)?;
    if ctx.output.is_json() {
        ctx.output.json(&json!({ "hash": hash }));
    } else {
        println!("{}", hash);
    }

    Ok(())
}

fn verify_password(password: &str, hash: &str, ctx: &Context) -> Result<()> {
    let matches = hasher(ctx)?.verify(password, hash)?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "match": matches }));
    }
    if !matches {
        bail!("Password does not match");
    }

    ctx.output.success("Password matches");
    Ok(())
}

fn inspect_hash(hash: &str, ctx: &Context) -> Result<()> {
    let info = PasswordHasher::inspect(hash)?;

    if ctx.output.is_json() {
        ctx.output.json(&info);
        return Ok(());
    }

    ctx.output.header("Password hash");
    ctx.output.kv("algorithm", &info.algorithm);
    if let Some(version) = info.version {
        ctx.output.kv("version", &format!("{:#x}", version));
    }
    ctx.output.kv("memory", &format!("{} KiB", info.memory_kib));
    ctx.output.kv("iterations", &info.iterations.to_string());
    ctx.output.kv("parallelism", &info.parallelism.to_string());

    if let Err(e) = hasher(ctx)?.check_hash(hash) {
        ctx.output.warn(&format!("{}", e));
    }
    let policy = &ctx.config.password;
    if (info.memory_kib, info.iterations, info.parallelism)
        != (policy.memory_kib, policy.iterations, policy.parallelism)
    {
        ctx.output
            .warn("Hash was made with different cost parameters than the current policy");
    }

    Ok(())
}
