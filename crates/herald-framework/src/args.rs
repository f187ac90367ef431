//! Argument binding.
//!
//! Each parameter of a command handler (after the event) implements
//! [`CommandArg`], which describes itself for help output and binds itself
//! from the call-local [`TokenCursor`]. Four parameter kinds exist:
//!
//! - plain: a [`ParseToken`] type, exactly one whitespace token
//! - variadic plain: `Vec<T>`, every remaining token
//! - custom: [`Tokens<T>`], one token per call to [`CustomParse`], which
//!   itself decides when to stop
//! - manual: [`Remaining<T>`], the entire unconsumed remainder once
//! - raw: [`RawArguments`], the remainder verbatim with no tokenization
//!
//! Custom, manual, raw and variadic arguments are trailing: registration
//! rejects them anywhere but the final position.

use std::str::FromStr;

use crate::error::ArgError;

// ============================================================================
// Token cursor
// ============================================================================

/// Call-local whitespace tokenizer over a command line remainder.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    rest: &'a str,
}

impl<'a> TokenCursor<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    /// Consumes and returns the next whitespace-delimited token.
    pub fn next_token(&mut self) -> Option<&'a str> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            self.rest = trimmed;
            return None;
        }
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        let (token, rest) = trimmed.split_at(end);
        self.rest = rest;
        Some(token)
    }

    /// Consumes and returns everything left, verbatim except for leading
    /// whitespace.
    pub fn rest(&mut self) -> &'a str {
        let rest = self.rest.trim_start();
        self.rest = "";
        rest
    }

    /// True when no tokens remain.
    pub fn is_exhausted(&self) -> bool {
        self.rest.trim_start().is_empty()
    }
}

// ============================================================================
// Argument descriptors
// ============================================================================

/// The binding strategy of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// One whitespace token.
    Plain,
    /// Per-token consumption driven by the type itself.
    Custom,
    /// The whole unparsed remainder, handed over once.
    Manual,
    /// The remainder verbatim, no tokenization.
    Raw,
}

/// Descriptor of one resolved argument, owned by its command entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub kind: ArgKind,
    /// Display string for help output.
    pub usage: String,
    /// True when this argument absorbs multiple tokens.
    pub variadic: bool,
}

impl ArgSpec {
    pub fn plain(usage: impl Into<String>) -> Self {
        Self {
            kind: ArgKind::Plain,
            usage: usage.into(),
            variadic: false,
        }
    }

    fn trailing(kind: ArgKind, usage: impl Into<String>) -> Self {
        Self {
            kind,
            usage: usage.into(),
            variadic: true,
        }
    }

    /// True when nothing may follow this argument.
    pub fn is_trailing(&self) -> bool {
        self.variadic || self.kind != ArgKind::Plain
    }
}

// ============================================================================
// Parsing contracts
// ============================================================================

/// Single-token parsing contract.
///
/// Implemented for the std text, numeric and boolean types below. Custom
/// types join the registry by implementing this trait and deriving their
/// [`CommandArg`] impl with [`plain_arg!`](crate::plain_arg).
pub trait ParseToken: Sized + Send + 'static {
    /// Parses one whitespace-delimited token.
    fn parse_token(token: &str) -> Result<Self, ArgError>;

    /// Display string for help output.
    fn usage() -> String;
}

/// Per-token parsing contract for trailing [`Tokens`] collections.
///
/// Invoked once per remaining token; returning `Ok(None)` stops the
/// collection without an error.
pub trait CustomParse: Sized + Send + 'static {
    fn parse_token(token: &str) -> Result<Option<Self>, ArgError>;

    fn usage() -> String {
        "value".to_owned()
    }
}

/// Whole-remainder parsing contract for trailing [`Remaining`] arguments.
///
/// Receives the entire unconsumed remainder once, including the empty
/// string when nothing is left.
pub trait ManualParse: Sized + Send + 'static {
    fn parse_remainder(rest: &str) -> Result<Self, ArgError>;

    fn usage() -> String {
        "content".to_owned()
    }
}

// ============================================================================
// CommandArg
// ============================================================================

/// A bindable command parameter.
pub trait CommandArg: Sized + Send + 'static {
    /// Describes this parameter for registration-time validation and help.
    fn spec() -> ArgSpec;

    /// Binds this parameter from the cursor.
    fn bind(cursor: &mut TokenCursor<'_>) -> Result<Self, ArgError>;
}

/// Derives a [`CommandArg`] impl for a type implementing [`ParseToken`].
#[macro_export]
macro_rules! plain_arg {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::args::CommandArg for $ty {
            fn spec() -> $crate::args::ArgSpec {
                $crate::args::ArgSpec::plain(<$ty as $crate::args::ParseToken>::usage())
            }

            fn bind(
                cursor: &mut $crate::args::TokenCursor<'_>,
            ) -> Result<Self, $crate::error::ArgError> {
                let token =
                    cursor
                        .next_token()
                        .ok_or_else(|| $crate::error::ArgError::Missing {
                            usage: <$ty as $crate::args::ParseToken>::usage(),
                        })?;
                <$ty as $crate::args::ParseToken>::parse_token(token)
            }
        }
    )*};
}

macro_rules! impl_parse_token {
    ($($ty:ty => $usage:literal),* $(,)?) => {$(
        impl ParseToken for $ty {
            fn parse_token(token: &str) -> Result<Self, ArgError> {
                <$ty as FromStr>::from_str(token).map_err(|err| ArgError::Invalid {
                    usage: $usage.to_owned(),
                    token: token.to_owned(),
                    reason: err.to_string(),
                })
            }

            fn usage() -> String {
                $usage.to_owned()
            }
        }
    )*};
}

impl_parse_token! {
    String => "string",
    bool => "bool",
    char => "char",
    i8 => "int", i16 => "int", i32 => "int", i64 => "int",
    u8 => "uint", u16 => "uint", u32 => "uint", u64 => "uint",
    f32 => "float", f64 => "float",
}

plain_arg!(String, bool, char, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Trailing variadic plain argument: every remaining token, in order.
impl<T: ParseToken> CommandArg for Vec<T> {
    fn spec() -> ArgSpec {
        ArgSpec {
            kind: ArgKind::Plain,
            usage: T::usage(),
            variadic: true,
        }
    }

    fn bind(cursor: &mut TokenCursor<'_>) -> Result<Self, ArgError> {
        let mut out = Vec::new();
        while let Some(token) = cursor.next_token() {
            out.push(T::parse_token(token)?);
        }
        Ok(out)
    }
}

/// The unmodified remainder of the command line as one opaque value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArguments(pub String);

impl std::ops::Deref for RawArguments {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RawArguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<RawArguments> for String {
    fn from(raw: RawArguments) -> String {
        raw.0
    }
}

impl CommandArg for RawArguments {
    fn spec() -> ArgSpec {
        ArgSpec::trailing(ArgKind::Raw, "content")
    }

    fn bind(cursor: &mut TokenCursor<'_>) -> Result<Self, ArgError> {
        Ok(RawArguments(cursor.rest().to_owned()))
    }
}

/// Trailing collection populated one token at a time by a [`CustomParse`]
/// type. Zero remaining tokens yield an empty collection, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens<T>(pub Vec<T>);

impl<T> std::ops::Deref for Tokens<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T: CustomParse> CommandArg for Tokens<T> {
    fn spec() -> ArgSpec {
        ArgSpec::trailing(ArgKind::Custom, T::usage())
    }

    fn bind(cursor: &mut TokenCursor<'_>) -> Result<Self, ArgError> {
        let mut out = Vec::new();
        while let Some(token) = cursor.next_token() {
            match T::parse_token(token)? {
                Some(value) => out.push(value),
                None => break,
            }
        }
        Ok(Tokens(out))
    }
}

/// Trailing argument handed the entire unconsumed remainder once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remaining<T>(pub T);

impl<T> std::ops::Deref for Remaining<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ManualParse> CommandArg for Remaining<T> {
    fn spec() -> ArgSpec {
        ArgSpec::trailing(ArgKind::Manual, T::usage())
    }

    fn bind(cursor: &mut TokenCursor<'_>) -> Result<Self, ArgError> {
        T::parse_remainder(cursor.rest()).map(Remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tokenizes_whitespace() {
        let mut cursor = TokenCursor::new("  send hacka  doll ");
        assert_eq!(cursor.next_token(), Some("send"));
        assert_eq!(cursor.next_token(), Some("hacka"));
        assert_eq!(cursor.next_token(), Some("doll"));
        assert_eq!(cursor.next_token(), None);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn cursor_rest_is_verbatim() {
        let mut cursor = TokenCursor::new("content just  things");
        assert_eq!(cursor.next_token(), Some("content"));
        assert_eq!(cursor.rest(), "just  things");
        assert_eq!(cursor.next_token(), None);
    }

    #[test]
    fn plain_binding_consumes_one_token() {
        let mut cursor = TokenCursor::new("42 rest");
        let n = i64::bind(&mut cursor).unwrap();
        assert_eq!(n, 42);
        assert_eq!(cursor.rest(), "rest");
    }

    #[test]
    fn plain_shortfall_is_missing() {
        let mut cursor = TokenCursor::new("");
        assert_eq!(
            String::bind(&mut cursor),
            Err(ArgError::Missing {
                usage: "string".into()
            })
        );
    }

    #[test]
    fn plain_parse_failure_names_token() {
        let mut cursor = TokenCursor::new("nope");
        let err = i64::bind(&mut cursor).unwrap_err();
        assert!(matches!(err, ArgError::Invalid { ref token, .. } if token == "nope"));
    }

    #[test]
    fn variadic_plain_collects_everything() {
        let mut cursor = TokenCursor::new("hacka doll no. 3");
        let args = Vec::<String>::bind(&mut cursor).unwrap();
        assert_eq!(args, ["hacka", "doll", "no.", "3"]);
    }

    #[test]
    fn raw_is_not_tokenized() {
        let mut cursor = TokenCursor::new("just things");
        let raw = RawArguments::bind(&mut cursor).unwrap();
        assert_eq!(&*raw, "just things");
    }

    struct UntilStop(String);

    impl CustomParse for UntilStop {
        fn parse_token(token: &str) -> Result<Option<Self>, ArgError> {
            if token == "stop" {
                Ok(None)
            } else {
                Ok(Some(UntilStop(token.to_owned())))
            }
        }
    }

    #[test]
    fn custom_stops_on_request() {
        let mut cursor = TokenCursor::new("a b stop c");
        let parsed = Tokens::<UntilStop>::bind(&mut cursor).unwrap();
        let words: Vec<&str> = parsed.iter().map(|w| w.0.as_str()).collect();
        assert_eq!(words, ["a", "b"]);
    }

    #[test]
    fn custom_with_no_tokens_is_empty() {
        let mut cursor = TokenCursor::new("");
        let parsed = Tokens::<UntilStop>::bind(&mut cursor).unwrap();
        assert!(parsed.is_empty());
    }

    struct WordCount(usize);

    impl ManualParse for WordCount {
        fn parse_remainder(rest: &str) -> Result<Self, ArgError> {
            Ok(WordCount(rest.split_whitespace().count()))
        }
    }

    #[test]
    fn manual_receives_whole_remainder() {
        let mut cursor = TokenCursor::new("one two three");
        let parsed = Remaining::<WordCount>::bind(&mut cursor).unwrap();
        assert_eq!(parsed.0.0, 3);
    }

    #[test]
    fn trailing_specs() {
        assert!(RawArguments::spec().is_trailing());
        assert!(Vec::<String>::spec().is_trailing());
        assert!(Tokens::<UntilStop>::spec().is_trailing());
        assert!(Remaining::<WordCount>::spec().is_trailing());
        assert!(!String::spec().is_trailing());
    }
}
