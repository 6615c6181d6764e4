// We want a few things here:
// 1. A way to create a new error with a backtrace
// 2. A way to centralize setting a breakpoint to trap any error in the system fairly soon
//    after it's created (or at least when it's propagated from a library we use back to us)
// 3. Same but for logging / emitting error messages into the tracing/logging system
// 4. A coarse kind discriminant, because callers of a codec genuinely branch on
//    "ran out of space" vs. "the stream is garbage"

use backtrace_error::DynBacktraceError;
use std::borrow::Cow;
use tracing::error;

#[cfg(test)]
use test_log::test;

/// The coarse classes of codec failure. Everything an encoder or decoder can
/// return falls into one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Sink can't take another byte, source has too few bytes left, or a
    /// fixed-capacity table/arena is full.
    OutOfSpace,
    /// A typed read was issued against a token of a different kind.
    InvalidToken,
    /// The token kind is reserved: it classifies, but its payload has no
    /// defined representation here.
    UnsupportedTag,
    /// The byte stream (or a requested width/length/index) is not something
    /// the format can express.
    Malformed,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    #[allow(dead_code)]
    inner: DynBacktraceError,
}

pub type Result<T> = std::result::Result<T, Error>;

struct SimpleErr(Cow<'static, str>);
impl std::fmt::Debug for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for SimpleErr {}

impl Error {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(kind: ErrorKind, err: E) -> Error {
        error!(target: "yajbe", "{:?}: {:?}", kind, err);
        let dbe = DynBacktraceError::from(err);
        Error { kind, inner: dbe }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub fn err(kind: ErrorKind, msg: impl Into<Cow<'static, str>>) -> Error {
    let err = SimpleErr(msg.into());
    Error::new(kind, err)
}

#[test]
fn test_error() {
    let err = err(ErrorKind::OutOfSpace, "test error");
    assert_eq!(err.kind(), ErrorKind::OutOfSpace);
}
