use anyhow::{bail, Context};
use session_token::{SessionClaims, SessionTokenCodec};

use marketplace_server::config::{signing_secret_from_env, SECRET_ENV_VAR};

#[derive(Debug, Default)]
struct MintConfig {
    user_id: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
    avatar_url: Option<String>,
    ttl_seconds: Option<i64>,
    verify: Option<String>,
    help: bool,
}

fn main() -> anyhow::Result<()> {
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("server/.env").ok();
    }
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));

    let cfg = parse_args(std::env::args().skip(1))?;
    if cfg.help {
        print_help();
        return Ok(());
    }

    let secret = signing_secret_from_env()
        .with_context(|| format!("{} must be set to mint or verify tokens", SECRET_ENV_VAR))?;
    let codec = SessionTokenCodec::new(Some(secret));

    if let Some(token) = cfg.verify {
        match codec.check_at(&token, session_token::now_secs()) {
            Ok(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
            Err(rejection) => {
                println!("rejected: {}", rejection);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let (Some(user_id), Some(email)) = (cfg.user_id, cfg.email) else {
        bail!("--user-id and --email are required\nUse --help to list the options.");
    };

    let mut claims = SessionClaims::new(user_id, email);
    claims.display_name = cfg.display_name;
    claims.avatar_url = cfg.avatar_url;

    let token = codec.issue(&claims, cfg.ttl_seconds)?;
    println!("{}", token);
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<MintConfig> {
    let mut cfg = MintConfig::default();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--user-id" => cfg.user_id = Some(next_arg_value(&mut args, &arg)?),
            "--email" => cfg.email = Some(next_arg_value(&mut args, &arg)?),
            "--display-name" => cfg.display_name = Some(next_arg_value(&mut args, &arg)?),
            "--avatar-url" => cfg.avatar_url = Some(next_arg_value(&mut args, &arg)?),
            "--ttl-seconds" => {
                let value = next_arg_value(&mut args, &arg)?;
                cfg.ttl_seconds = Some(
                    value
                        .parse::<i64>()
                        .with_context(|| format!("invalid --ttl-seconds: {}", value))?,
                );
            }
            "--verify" => cfg.verify = Some(next_arg_value(&mut args, &arg)?),
            "--help" | "-h" => cfg.help = true,
            other => bail!("unknown argument: {}\nUse --help to list the options.", other),
        }
    }

    Ok(cfg)
}

fn next_arg_value(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    args.next()
        .with_context(|| format!("missing value for {}", flag))
}

fn print_help() {
    println!(
        "mint-token: issue or inspect marketplace session tokens

USAGE:
  mint-token --user-id <id> --email <email> [--display-name <name>] [--avatar-url <url>] [--ttl-seconds <n>]
  mint-token --verify <token>

The signing key is read from {}.",
        SECRET_ENV_VAR
    );
}
