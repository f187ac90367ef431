//! Command, event and middleware handler adapters.
//!
//! Handlers are plain async functions. Blanket implementations over
//! function arities adapt them into type-erased closures the group tables
//! can store, in the same way the return value is adapted through
//! [`CommandOutput`] into the dispatcher's [`Outcome`].

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use herald_core::{BoxedEvent, Event, MessageCreated, Reply, RichText, SendPayload};

use crate::args::{ArgSpec, CommandArg, TokenCursor};
use crate::error::{BoxError, DispatchError};

// ============================================================================
// Outcome - what a command handler's return reduced to
// ============================================================================

/// The interpreted return value of a command handler.
///
/// A reply, if present, is delivered before the error, if present, is
/// propagated as the call's result.
#[derive(Debug, Default)]
pub struct Outcome {
    pub reply: Option<Reply>,
    pub error: Option<BoxError>,
}

/// Conversion of command return types into an [`Outcome`].
///
/// Eligible returns are unit, one of the three reply kinds (plain text,
/// rich content, structured payload), or a `Result` of either with any
/// error type. Anything else fails to satisfy this bound at compile time.
pub trait CommandOutput: Send + 'static {
    fn into_outcome(self) -> Outcome;
}

impl CommandOutput for () {
    fn into_outcome(self) -> Outcome {
        Outcome::default()
    }
}

impl<E> CommandOutput for Result<(), E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_outcome(self) -> Outcome {
        Outcome {
            reply: None,
            error: self.err().map(|e| Box::new(e) as BoxError),
        }
    }
}

macro_rules! impl_reply_output {
    ($($ty:ty),* $(,)?) => {$(
        impl CommandOutput for $ty {
            fn into_outcome(self) -> Outcome {
                Outcome {
                    reply: Some(self.into()),
                    error: None,
                }
            }
        }

        impl<E> CommandOutput for Result<$ty, E>
        where
            E: std::error::Error + Send + Sync + 'static,
        {
            fn into_outcome(self) -> Outcome {
                match self {
                    Ok(value) => Outcome {
                        reply: Some(value.into()),
                        error: None,
                    },
                    Err(err) => Outcome {
                        reply: None,
                        error: Some(Box::new(err)),
                    },
                }
            }
        }
    )*};
}

impl_reply_output!(String, &'static str, RichText, SendPayload, Reply);

/// Conversion of middleware and event-handler return types into a plain
/// result. Unit means success.
pub trait IntoResult: Send + 'static {
    fn into_result(self) -> Result<(), BoxError>;
}

impl IntoResult for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoResult for Result<(), E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(|e| Box::new(e) as BoxError)
    }
}

// ============================================================================
// CommandHandler - arity adapter for command functions
// ============================================================================

/// An async function usable as a command.
///
/// Implemented for functions whose first parameter is the canonical
/// [`MessageCreated`] event, whose further parameters implement
/// [`CommandArg`], and whose return implements [`CommandOutput`].
pub trait CommandHandler<T>: Clone + Send + Sync + 'static {
    /// Descriptors of the declared arguments, in order.
    fn arg_specs() -> Vec<ArgSpec>;

    /// Binds arguments from `line` and invokes the function.
    fn invoke(
        self,
        event: MessageCreated,
        line: String,
    ) -> BoxFuture<'static, Result<Outcome, DispatchError>>;
}

macro_rules! impl_command_handler {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, Fut, Res, $($arg,)*> CommandHandler<(MessageCreated, $($arg,)*)> for F
        where
            F: FnOnce(MessageCreated, $($arg,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: CommandOutput,
            $($arg: CommandArg,)*
        {
            fn arg_specs() -> Vec<ArgSpec> {
                vec![$($arg::spec(),)*]
            }

            fn invoke(
                self,
                event: MessageCreated,
                line: String,
            ) -> BoxFuture<'static, Result<Outcome, DispatchError>> {
                Box::pin(async move {
                    let mut cursor = TokenCursor::new(&line);
                    $(let $arg = $arg::bind(&mut cursor).map_err(DispatchError::Argument)?;)*
                    Ok((self)(event, $($arg,)*).await.into_outcome())
                })
            }
        }
    };
}

impl_command_handler!();
impl_command_handler!(A1);
impl_command_handler!(A1, A2);
impl_command_handler!(A1, A2, A3);
impl_command_handler!(A1, A2, A3, A4);
impl_command_handler!(A1, A2, A3, A4, A5);
impl_command_handler!(A1, A2, A3, A4, A5, A6);
impl_command_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_command_handler!(A1, A2, A3, A4, A5, A6, A7, A8);

// ============================================================================
// Type-erased storage
// ============================================================================

/// A command entry's invoke closure.
pub type BoxedCommand = Arc<
    dyn Fn(MessageCreated, String) -> BoxFuture<'static, Result<Outcome, DispatchError>>
        + Send
        + Sync,
>;

/// A middleware entry: raw event in, error-or-unit out.
pub type BoxedMiddleware =
    Arc<dyn Fn(BoxedEvent) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// An event-handler entry; yields `None` when the runtime event type does
/// not equal the handler's declared type.
pub type BoxedEventHandler =
    Arc<dyn Fn(&BoxedEvent) -> Option<BoxFuture<'static, Result<(), BoxError>>> + Send + Sync>;

/// Erases a command handler for table storage.
pub fn into_command<H, T>(handler: H) -> BoxedCommand
where
    H: CommandHandler<T>,
    T: 'static,
{
    Arc::new(move |event, line| handler.clone().invoke(event, line))
}

/// Erases a middleware function for table storage.
pub fn into_middleware<F, Fut, R>(hook: F) -> BoxedMiddleware
where
    F: Fn(BoxedEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResult,
{
    Arc::new(move |event| {
        let fut = hook(event);
        Box::pin(async move { fut.await.into_result() })
    })
}

/// Erases a typed event handler for table storage.
pub fn into_event_handler<F, E, Fut, R>(handler: F) -> BoxedEventHandler
where
    E: Event + Clone + 'static,
    F: Fn(E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResult,
{
    Arc::new(move |event: &BoxedEvent| {
        let data = event.downcast_ref::<E>()?.clone();
        let fut = handler(data);
        Some(Box::pin(async move { fut.await.into_result() }))
    })
}

/// Erases a hidden command as an event handler on the canonical message
/// event: no argument binding, reply discarded, only the error surfaces.
pub fn into_hidden_handler<H, T>(handler: H) -> BoxedEventHandler
where
    H: CommandHandler<T>,
    T: 'static,
{
    Arc::new(move |event: &BoxedEvent| {
        let message = event.downcast_ref::<MessageCreated>()?.clone();
        let fut = handler.clone().invoke(message, String::new());
        Some(Box::pin(async move {
            let outcome = fut.await.map_err(|e| Box::new(e) as BoxError)?;
            match outcome.error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }))
    })
}
