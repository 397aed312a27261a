//! Diagnostic sinks.

/// Receives a human readable message whenever an encode or decode call
/// fails.  Reporting never alters the outcome of the call.
pub trait ErrorSink {
    fn report(&self, message: &str);
}

/// Forwards diagnostics to the `log` facade at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, message: &str) {
        log::warn!(target: "mime_encoded_word", "{}", message);
    }
}

/// Discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ErrorSink for NullSink {
    fn report(&self, _message: &str) {}
}

impl<F> ErrorSink for F
where
    F: Fn(&str),
{
    fn report(&self, message: &str) {
        self(message)
    }
}
