use anyhow::{Context as _, Result};
use argdec_common::observability::{init_logging, LogConfig};
use argdec_config::ArgdecConfigLoader;
use argdec_engine::actor::{spawn_actor, ActorHandle};
use argdec_engine::rebuttal::RebuttalSlot;
use argdec_engine::session::Analysis;
use argdec_engine::session_actor::{SessionActor, SessionMsg};
use argdec_engine::thread::{Reaction, ReactionEvent};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::oneshot;

const MAILBOX: usize = 64;

/// Analyze a news article: extract its claims, highlight them, and argue
/// back against each one.
#[derive(Parser, Debug)]
#[command(name = "argdec", version)]
struct Args {
    /// YAML configuration; ARGDEC__-prefixed env vars override file values.
    #[arg(long, default_value = "argdec.yaml")]
    config: PathBuf,

    /// Path to a plain-text file containing the article.
    article: PathBuf,

    /// Also print a short summary and external background for the article.
    #[arg(long)]
    enrich: bool,

    /// Ask one question about the article after the analysis.
    #[arg(long, value_name = "QUESTION")]
    ask: Option<String>,

    /// Open a debate with this stance and print the rebuttal.
    #[arg(long, value_name = "STANCE")]
    debate: Option<String>,

    /// Ask for the rebuttal to be regenerated once, as after a thumbs-down.
    #[arg(long, requires = "debate")]
    regenerate: bool,

    /// Look up a word or phrase from the article.
    #[arg(long, value_name = "TEXT")]
    lookup: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = ArgdecConfigLoader::new()
        .with_file(&args.config)
        .load()
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;

    init_logging(LogConfig::default())?;

    let article = tokio::fs::read_to_string(&args.article)
        .await
        .with_context(|| format!("reading article from {}", args.article.display()))?;

    let client = argdec_llm::build_client(&cfg.completion)?;
    let options = argdec_llm::options_from_spec(&cfg.completion);
    let handle = spawn_actor(SessionActor::new(client, options), MAILBOX);

    let analysis = ask(&handle, |reply| SessionMsg::Submit { article, reply }).await??;
    print_analysis(&analysis);

    if args.enrich {
        let ctx = ask(&handle, |reply| SessionMsg::Enrich { reply }).await??;
        println!("\n== Summary ==\n{}", ctx.summary);
        println!("\n== Background ==\n{}", ctx.background);
    }

    if let Some(question) = args.ask {
        ask(&handle, |reply| SessionMsg::QaToggle { reply }).await?;
        let log = ask(&handle, |reply| SessionMsg::QaSend {
            text: question,
            reply,
        })
        .await??;
        if let Some(answer) = log.last() {
            println!("\n== Answer ==\n{}", answer.content);
        }
    }

    if let Some(stance) = args.debate {
        ask(&handle, |reply| SessionMsg::DebateToggle { reply }).await?;
        let log = ask(&handle, |reply| SessionMsg::DebateSend {
            text: stance,
            reply,
        })
        .await??;
        if let Some(rebuttal) = log.last() {
            println!("\n== Debate ==\n{}", rebuttal.content);
        }
        if args.regenerate {
            let target = log.len().saturating_sub(1);
            let log = ask(&handle, |reply| SessionMsg::DebateReact {
                event: ReactionEvent {
                    kind: Reaction::Down,
                    target,
                },
                reply,
            })
            .await??;
            if let Some(retry) = log.last() {
                println!("\n== Debate (regenerated) ==\n{}", retry.content);
            }
        }
    }

    if let Some(selection) = args.lookup {
        let explanation = ask(&handle, |reply| SessionMsg::Explain { selection, reply }).await??;
        println!("\n== Lookup ==\n{explanation}");
    }

    drop(handle.addr);
    handle.task.await??;
    Ok(())
}

/// One request/reply round-trip against the session actor.
async fn ask<T>(
    handle: &ActorHandle<SessionActor>,
    msg: impl FnOnce(oneshot::Sender<T>) -> SessionMsg,
) -> Result<T> {
    let (tx, rx) = oneshot::channel();
    if handle.addr.send(msg(tx)).await.is_err() {
        anyhow::bail!("session stopped");
    }
    rx.await.context("session dropped the reply")
}

fn print_analysis(analysis: &Analysis) {
    println!("== Annotated article ==\n{}", analysis.annotated);
    println!("\n== Claims and counterarguments ==");
    for (i, pair) in analysis.pairs.iter().enumerate() {
        println!("\n[{}] {}", i + 1, pair.claim.text());
        match &pair.rebuttal {
            RebuttalSlot::Ready(r) => {
                println!("    {}", r.summary);
                for line in r.body.lines().filter(|l| !l.trim().is_empty()) {
                    println!("    {line}");
                }
            }
            RebuttalSlot::Failed(err) => println!("    (no counterargument: {err})"),
        }
    }
}
