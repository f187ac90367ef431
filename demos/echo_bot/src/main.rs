//! Console playground: every stdin line is dispatched as a message event,
//! replies print to stdout.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use herald::{
    ContextCell, GroupBuilder, MessageCreated, RawArguments, Reply, Replier, Router, SendError,
    StaticPrefix, TargetId,
};

struct ConsoleReplier;

#[async_trait]
impl Replier for ConsoleReplier {
    async fn send(&self, target: TargetId, reply: Reply) -> Result<(), SendError> {
        match reply {
            Reply::Text(text) => println!("[{target}] {text}"),
            Reply::Rich(rich) => println!("[{target}] {}", rich.plain_text()),
            Reply::Payload(payload) => println!("[{target}] {}", payload.content),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let commands = GroupBuilder::new("echo", ContextCell::new())
        .description("console playground")
        .command("echo", |_m: MessageCreated, words: Vec<String>| async move {
            words.join(" ")
        })
        .describe("repeats its arguments")
        .command("add", |_m: MessageCreated, a: i64, b: i64| async move {
            (a + b).to_string()
        })
        .describe("adds two integers")
        .command("say", |_m: MessageCreated, raw: RawArguments| async move { raw.0 })
        .describe("echoes the raw remainder verbatim")
        .command("Aーshutdown", |_m: MessageCreated| async {
            "only admins see this in help".to_owned()
        });

    let router = Router::new(Arc::new(ConsoleReplier), StaticPrefix::new("!"), commands)?;
    router.set_sanitizer(|text| text.replace("@everyone", "@\u{200b}everyone"));

    info!("type !<command>; a bare 'help' prints usage; ctrl-d exits");
    print!("{}", router.help());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "help" {
            print!("{}", router.help());
            continue;
        }
        let event = MessageCreated {
            channel_id: TargetId(1),
            author_id: TargetId(2),
            content: line,
        };
        if let Err(err) = router.dispatch(event.into()).await {
            error!(%err, "dispatch failed");
        }
    }
    Ok(())
}
