//! End-to-end dispatch coverage over a recording reply collaborator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use herald_core::{BoxedEvent, CommandFlags, MessageCreated, Reply, Replier, SendError, TargetId};
use herald_framework::{
    ArgError, ContextCell, CustomParse, DispatchError, GroupBuilder, ManualParse, RawArguments,
    Remaining, Router, RouterConfig, StaticPrefix, Tokens,
};

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<(TargetId, Reply)>>,
}

impl Recorder {
    fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, reply)| match reply {
                Reply::Text(text) => text.clone(),
                other => panic!("unexpected reply {other:?}"),
            })
            .collect()
    }
}

#[async_trait]
impl Replier for Recorder {
    async fn send(&self, target: TargetId, reply: Reply) -> Result<(), SendError> {
        self.sent.lock().unwrap().push((target, reply));
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Boom(&'static str);

fn message(content: &str) -> BoxedEvent {
    MessageCreated {
        channel_id: TargetId(69420),
        author_id: TargetId(7),
        content: content.to_owned(),
    }
    .into()
}

#[tokio::test]
async fn middleware_runs_before_the_command() {
    let recorder = Arc::new(Recorder::default());
    let counter = Arc::new(AtomicU64::new(0));

    let mw_counter = counter.clone();
    let cmd_counter = counter.clone();
    let root = GroupBuilder::new("bot", ContextCell::new())
        .middleware(move |_event: BoxedEvent| {
            let counter = mw_counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .command("getCounter", move |_m: MessageCreated| {
            let counter = cmd_counter.clone();
            async move { counter.load(Ordering::SeqCst).to_string() }
        });

    fn pls_do(content: &str) -> Option<&str> {
        content.strip_prefix("pls do ")
    }
    let router = Router::new(recorder.clone(), pls_do, root).unwrap();

    router.dispatch(message("pls do getCounter")).await.unwrap();
    assert_eq!(recorder.texts(), vec!["1".to_owned()]);
}

#[tokio::test]
async fn variadic_arguments_collect_every_token() {
    let recorder = Arc::new(Recorder::default());
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();

    let sink = seen.clone();
    let root = GroupBuilder::new("bot", ContextCell::new()).command(
        "send",
        move |_m: MessageCreated, words: Vec<String>| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = words;
                Err::<(), _>(Boom("oh no"))
            }
        },
    );
    let router = Router::new(recorder, StaticPrefix::new("~"), root).unwrap();

    let err = router
        .dispatch(message("~send hacka doll no. 3"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "oh no");
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["hacka", "doll", "no.", "3"]
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn raw_argument_is_verbatim() {
    let recorder = Arc::new(Recorder::default());
    let seen: Arc<Mutex<String>> = Arc::default();

    let sink = seen.clone();
    let root = GroupBuilder::new("bot", ContextCell::new()).command(
        "content",
        move |_m: MessageCreated, raw: RawArguments| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = raw.into();
            }
        },
    );
    let router = Router::new(recorder, StaticPrefix::new("!"), root).unwrap();

    router.dispatch(message("!content just things")).await.unwrap();
    assert_eq!(*seen.lock().unwrap(), "just things");
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UntilStop(String);

impl CustomParse for UntilStop {
    fn parse_token(token: &str) -> Result<Option<Self>, ArgError> {
        if token == "stop" {
            Ok(None)
        } else {
            Ok(Some(Self(token.to_owned())))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct WordCount(usize);

impl ManualParse for WordCount {
    fn parse_remainder(rest: &str) -> Result<Self, ArgError> {
        Ok(Self(rest.split_whitespace().count()))
    }
}

#[tokio::test]
async fn custom_and_manual_parsers_bind_trailing() {
    let recorder = Arc::new(Recorder::default());

    let root = GroupBuilder::new("bot", ContextCell::new())
        .command(
            "collect",
            |_m: MessageCreated, tokens: Tokens<UntilStop>| async move {
                tokens.len().to_string()
            },
        )
        .command(
            "count",
            |_m: MessageCreated, words: Remaining<WordCount>| async move {
                words.0 .0.to_string()
            },
        );
    let router = Router::new(recorder.clone(), StaticPrefix::new("!"), root).unwrap();

    router.dispatch(message("!collect a b stop c")).await.unwrap();
    router.dispatch(message("!count one two three")).await.unwrap();
    // zero remaining tokens is an empty collection, not an error
    router.dispatch(message("!collect")).await.unwrap();
    assert_eq!(recorder.texts(), vec!["2", "3", "0"]);
}

#[tokio::test]
async fn unknown_command_names_the_token() {
    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .command("noop", |_m: MessageCreated| async {});
    let router = Router::new(recorder, StaticPrefix::new("joe pls "), root).unwrap();

    let err = router.dispatch(message("joe pls no")).await.unwrap_err();
    assert!(err.is_unknown_command());
    assert!(err.to_string().starts_with("Unknown command:"));
}

#[tokio::test]
async fn quiet_unknown_suppresses_the_error() {
    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .quiet_unknown()
        .command("noop", |_m: MessageCreated| async {});
    let router = Router::new(recorder, StaticPrefix::new("!"), root).unwrap();

    assert!(router.dispatch(message("!nothing")).await.is_ok());
}

#[tokio::test]
async fn config_quiet_unknown_applies_globally() {
    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .command("noop", |_m: MessageCreated| async {});
    let router = Router::new(recorder, StaticPrefix::new("!"), root)
        .unwrap()
        .with_config(RouterConfig {
            quiet_unknown: true,
            ..RouterConfig::default()
        });

    assert!(router.dispatch(message("!nothing")).await.is_ok());
}

#[tokio::test]
async fn subgroup_walk_reaches_nested_commands() {
    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .command("top", |_m: MessageCreated| async { "top" })
        .subgroup(
            GroupBuilder::new("testc", ContextCell::new())
                .command("noop", |_m: MessageCreated| async { "noop ran" }),
        );
    let router = Router::new(recorder.clone(), StaticPrefix::new("run "), root).unwrap();

    router.dispatch(message("run testc noop")).await.unwrap();
    assert_eq!(recorder.texts(), vec!["noop ran"]);

    assert!(router.find_command("testc", "noop").is_some());
    assert!(router.find_command("", "top").is_some());
    assert!(router.find_command("testc", "missing").is_none());
    assert!(router.find_command("missing", "noop").is_none());
}

#[tokio::test]
async fn plumb_receives_the_whole_line() {
    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .plumb(|_m: MessageCreated, raw: RawArguments| async move {
            format!("got {:?}", &*raw)
        });
    let router = Router::new(recorder.clone(), StaticPrefix::new("!"), root).unwrap();

    router.dispatch(message("!anything at all")).await.unwrap();
    assert_eq!(recorder.texts(), vec!["got \"anything at all\""]);
}

#[tokio::test]
async fn middleware_error_short_circuits() {
    let recorder = Arc::new(Recorder::default());
    let ran = Arc::new(AtomicU64::new(0));

    let cmd_ran = ran.clone();
    let root = GroupBuilder::new("bot", ContextCell::new())
        .middleware(|_event: BoxedEvent| async { Err::<(), _>(Boom("denied")) })
        .command("noop", move |_m: MessageCreated| {
            let ran = cmd_ran.clone();
            async move {
                ran.fetch_add(1, Ordering::SeqCst);
            }
        });
    let router = Router::new(recorder.clone(), StaticPrefix::new("!"), root).unwrap();

    let err = router.dispatch(message("!noop")).await.unwrap_err();
    assert!(matches!(err, DispatchError::Middleware(_)));
    assert_eq!(err.to_string(), "denied");
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert!(recorder.texts().is_empty());
}

#[tokio::test]
async fn hidden_command_runs_on_every_message() {
    let recorder = Arc::new(Recorder::default());
    let ticks = Arc::new(AtomicU64::new(0));

    let tick = ticks.clone();
    let root = GroupBuilder::new("bot", ContextCell::new())
        .command_with("tick", CommandFlags::HIDDEN, move |_m: MessageCreated| {
            let ticks = tick.clone();
            async move {
                ticks.fetch_add(1, Ordering::SeqCst);
                "never sent".to_owned()
            }
        })
        .command("noop", |_m: MessageCreated| async {});
    let router = Router::new(recorder.clone(), StaticPrefix::new("!"), root).unwrap();

    router.dispatch(message("!noop")).await.unwrap();
    router.dispatch(message("unprefixed chatter")).await.unwrap();

    // ran for both messages, reply discarded both times
    assert_eq!(ticks.load(Ordering::SeqCst), 2);
    assert!(recorder.texts().is_empty());
}

#[tokio::test]
async fn typed_event_handlers_see_matching_events_only() {
    use std::any::Any;

    use herald_core::{Event, ReplySource, TargetError};

    #[derive(Debug, Clone)]
    struct MemberJoined {
        user_id: TargetId,
    }

    impl ReplySource for MemberJoined {
        fn reply_target(&self) -> Result<Option<TargetId>, TargetError> {
            Ok(None)
        }
    }

    impl Event for MemberJoined {
        fn event_name(&self) -> &'static str {
            "member_joined"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    let recorder = Arc::new(Recorder::default());
    let joined: Arc<Mutex<Vec<TargetId>>> = Arc::default();

    let sink = joined.clone();
    let root = GroupBuilder::new("bot", ContextCell::new())
        .on_event("welcome", move |event: MemberJoined| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(event.user_id);
            }
        })
        .command("noop", |_m: MessageCreated| async {});
    let router = Router::new(recorder, StaticPrefix::new("!"), root).unwrap();

    router
        .dispatch(MemberJoined { user_id: TargetId(3) }.into())
        .await
        .unwrap();
    router.dispatch(message("!noop")).await.unwrap();

    assert_eq!(*joined.lock().unwrap(), vec![TargetId(3)]);
}

#[tokio::test]
async fn argument_shortfall_never_invokes_the_handler() {
    let recorder = Arc::new(Recorder::default());
    let ran = Arc::new(AtomicU64::new(0));

    let cmd_ran = ran.clone();
    let root = GroupBuilder::new("bot", ContextCell::new()).command(
        "add",
        move |_m: MessageCreated, a: i64, b: i64| {
            let ran = cmd_ran.clone();
            async move {
                ran.fetch_add(1, Ordering::SeqCst);
                (a + b).to_string()
            }
        },
    );
    let router = Router::new(recorder, StaticPrefix::new("!"), root).unwrap();

    let err = router.dispatch(message("!add 1")).await.unwrap_err();
    assert!(matches!(err, DispatchError::Argument(ArgError::Missing { .. })));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn reply_without_target_is_an_error() {
    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .command("noop", |_m: MessageCreated| async { "hello" });
    let router = Router::new(recorder, StaticPrefix::new("!"), root).unwrap();

    // channel id zero resolves to no target
    let event: BoxedEvent = MessageCreated::with_content("!noop").into();
    let err = router.dispatch(event).await.unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Send(SendError::NoTarget { .. })
    ));
}

#[tokio::test]
async fn sanitizer_rewrites_outgoing_text() {
    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .command("shout", |_m: MessageCreated| async { "hi @everyone" });
    let router = Router::new(recorder.clone(), StaticPrefix::new("!"), root).unwrap();
    router.set_sanitizer(|text| text.replace('@', "@\u{200b}"));

    router.dispatch(message("!shout")).await.unwrap();
    assert_eq!(recorder.texts(), vec!["hi @\u{200b}everyone"]);
}

#[tokio::test]
async fn registrations_are_independent() {
    fn root() -> GroupBuilder {
        GroupBuilder::new("bot", ContextCell::new())
            .command("noop", |_m: MessageCreated| async { "ok" })
    }

    let first = Arc::new(Recorder::default());
    let second = Arc::new(Recorder::default());
    let a = Router::new(first.clone(), StaticPrefix::new("!"), root()).unwrap();
    let b = Router::new(second.clone(), StaticPrefix::new("?"), root()).unwrap();

    a.dispatch(message("!noop")).await.unwrap();
    assert_eq!(first.texts(), vec!["ok"]);
    assert!(second.texts().is_empty());

    b.dispatch(message("?noop")).await.unwrap();
    assert_eq!(second.texts(), vec!["ok"]);
}

#[tokio::test]
async fn later_registrations_join_the_tree() {
    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .command("noop", |_m: MessageCreated| async {});
    let mut router = Router::new(recorder.clone(), StaticPrefix::new("!"), root).unwrap();

    router
        .register(
            GroupBuilder::new("extra", ContextCell::new())
                .command("ping", |_m: MessageCreated| async { "pong" }),
        )
        .unwrap();

    router.dispatch(message("!extra ping")).await.unwrap();
    assert_eq!(recorder.texts(), vec!["pong"]);

    // duplicate name rejected
    let err = router
        .register(GroupBuilder::new("extra", ContextCell::new()))
        .unwrap_err();
    assert!(matches!(
        err,
        herald_framework::SetupError::DuplicateGroup { .. }
    ));
}

#[tokio::test]
async fn help_variants_filter() {
    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .description("test bot")
        .command("send", |_m: MessageCreated, _w: Vec<String>| async {})
        .command("Aーpurge", |_m: MessageCreated| async {});
    let router = Router::new(recorder, StaticPrefix::new("!"), root).unwrap();

    let help = router.help();
    assert!(!help.is_empty());
    assert!(help.contains("send"));
    assert!(!help.contains("purge"));
    assert!(router.help_admin().contains("purge"));
}

#[tokio::test]
async fn context_cell_reaches_handlers() {
    let recorder = Arc::new(Recorder::default());
    let cell = ContextCell::new();

    let captured = cell.clone();
    let root = GroupBuilder::new("bot", cell.clone()).command(
        "direct",
        move |_m: MessageCreated| {
            let cell = captured.clone();
            async move {
                // handlers may bypass the return value and send directly
                let ctx = cell.get().unwrap();
                ctx.reply(TargetId(5), Reply::Text("manual".into()))
                    .await
                    .map(|()| ())
            }
        },
    );
    let router = Router::new(recorder.clone(), StaticPrefix::new("!"), root).unwrap();

    router.dispatch(message("!direct")).await.unwrap();
    let sent = recorder.sent.lock().unwrap().clone();
    assert_eq!(sent, vec![(TargetId(5), Reply::Text("manual".into()))]);
}

#[tokio::test]
async fn tower_service_adapter_dispatches() {
    use tower::Service;

    let recorder = Arc::new(Recorder::default());
    let root = GroupBuilder::new("bot", ContextCell::new())
        .command("ping", |_m: MessageCreated| async { "pong" });
    let mut service = Router::new(recorder.clone(), StaticPrefix::new("!"), root)
        .unwrap()
        .into_service();

    service.call(message("!ping")).await.unwrap();
    assert_eq!(recorder.texts(), vec!["pong"]);
}
