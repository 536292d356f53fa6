//! ai-tier-cli — 模型分级目录查看、回退链解析与对话调试工具
//!
//! Usage:
//!   ai-tier-cli tiers                          Show the tier catalog
//!   ai-tier-cli endpoints                      Show endpoint → tier mappings
//!   ai-tier-cli resolve <endpoint>             Resolve the fallback chain for an endpoint
//!   ai-tier-cli status                         Credential-aware status report (JSON)
//!   ai-tier-cli chat <endpoint> <message...>   Send one message through the fallback chain
//!
//! All commands accept `--catalog <file.yaml>` to use a custom catalog.
//! Credentials are read from the environment variables the catalog's models name
//! (GEMINI_API_KEY / OPENAI_API_KEY / ANTHROPIC_API_KEY for the built-in one).

use ai_tier_router::{AiService, ConversationPayload, Credentials, Error, TierRegistry};
use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!(
        r#"ai-tier-cli — tiered AI model routing

USAGE:
    ai-tier-cli <COMMAND> [--catalog <file.yaml>] [ARGS]

COMMANDS:
    tiers                        Show the tier catalog
    endpoints                    Show endpoint → tier mappings
    resolve <endpoint>           Resolve the fallback chain for an endpoint
    status                       Credential-aware status report (JSON)
    chat <endpoint> <message>    Send one message through the fallback chain
    help                         Show this help message

ENVIRONMENT:
    GEMINI_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY   Provider credentials
    AI_HTTP_TIMEOUT_SECS                                Per-attempt timeout (default 30)
    RUST_LOG                                            Log filter (default: warn)"#
    );
}

/// Strip `--catalog <path>` from `args` and load the registry it names.
fn take_registry(args: &mut Vec<String>) -> anyhow::Result<TierRegistry> {
    if let Some(i) = args.iter().position(|a| a == "--catalog") {
        if i + 1 >= args.len() {
            bail!("--catalog requires a file path");
        }
        let path = args.remove(i + 1);
        args.remove(i);
        return TierRegistry::from_yaml_file(&path)
            .with_context(|| format!("loading catalog {}", path));
    }
    Ok(TierRegistry::builtin().clone())
}

fn cmd_tiers(registry: &TierRegistry) {
    for (name, tier) in registry.model_tiers() {
        println!("{} (priority {}) — {}", name, tier.priority, tier.description);
        for m in &tier.models {
            println!(
                "  {:<45} ${:>6.3}/{:>6.3} per 1M  max {:>6}  needs {}",
                m.id(),
                m.cost_per_million_tokens.input,
                m.cost_per_million_tokens.output,
                m.max_tokens,
                m.requires_key
            );
        }
    }
}

fn cmd_endpoints(registry: &TierRegistry) {
    for (path, tier) in registry.endpoint_mappings() {
        match tier {
            Some(t) => println!("  {:<20} {}", path, t),
            None => println!("  {:<20} (no AI)", path),
        }
    }
}

fn cmd_resolve(
    registry: &TierRegistry,
    args: &[String],
    creds: &Credentials,
) -> anyhow::Result<()> {
    let Some(endpoint) = args.first() else {
        bail!("usage: ai-tier-cli resolve <endpoint>");
    };
    match registry.resolve_for_endpoint(endpoint, creds)? {
        None => println!("{} does not use an AI model", endpoint),
        Some(resolved) => {
            println!("{} → tier {}", resolved.endpoint, resolved.tier);
            for (i, m) in resolved.candidates().enumerate() {
                let role = if i == 0 { "primary " } else { "fallback" };
                println!("  {}. {} {} (${:.3}/1M)", i + 1, role, m.id(), m.total_cost());
            }
        }
    }
    Ok(())
}

async fn cmd_chat(
    registry: &TierRegistry,
    args: &[String],
    creds: &Credentials,
) -> anyhow::Result<()> {
    if args.len() < 2 {
        bail!("usage: ai-tier-cli chat <endpoint> <message...>");
    }
    let endpoint = &args[0];
    let message = args[1..].join(" ");

    let Some(resolved) = registry.resolve_for_endpoint(endpoint, creds)? else {
        bail!("{} does not use an AI model", endpoint);
    };

    let service = AiService::from_env();
    let payload = ConversationPayload::prompt(message);
    match service.call_ai_with_fallback(&resolved, &payload, creds).await {
        Ok(result) => {
            println!("{}", result.response);
            eprintln!(
                "\n[{}/{} tier={} attempt={} fallback={}]",
                result.model_used.provider,
                result.model_used.name,
                result.model_used.tier,
                result.model_used.attempt_number,
                result.model_used.was_fallback
            );
            Ok(())
        }
        Err(Error::AllModelsFailed { attempts }) => {
            eprintln!("All {} candidates failed:", attempts.len());
            for a in &attempts {
                eprintln!("  {}", a);
            }
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        std::process::exit(1);
    }
    let registry = take_registry(&mut args)?;
    if args.is_empty() {
        print_usage();
        std::process::exit(1);
    }
    let command = args.remove(0);
    let creds = Credentials::from_env_keys(registry.credential_names());

    match command.as_str() {
        "tiers" => cmd_tiers(&registry),
        "endpoints" => cmd_endpoints(&registry),
        "resolve" => cmd_resolve(&registry, &args, &creds)?,
        "status" => {
            let report = registry.status(&creds);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "chat" => cmd_chat(&registry, &args, &creds).await?,
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
    Ok(())
}
