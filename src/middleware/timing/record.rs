//! The value a timing log line is rendered from.

use std::fmt::{self, Write};

/// One measured request.
///
/// Only built once the downstream stack returned successfully.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    /// The request path.
    pub operation: String,
    /// Wall-clock time spent downstream, in fractional milliseconds.
    pub duration_ms: f64,
    pub correlation_id: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Operation: {}; Duration: {}; CorrelationId: {}",
            self.operation, self.duration_ms, self.correlation_id,
        )
    }
}

/// Substitutes `{operation}`, `{duration}` and `{correlationId}` in
/// `template`.
///
/// Names match ASCII case-insensitively. Unknown placeholders and
/// unterminated braces are copied through untouched. The duration keeps the
/// full precision of `f64`'s `Display`.
pub(crate) fn render_template(template: &str, record: &LogRecord) -> String {
    let mut out = String::with_capacity(template.len() + record.operation.len() + 48);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];

        let Some(close) = tail.find(['{', '}']) else {
            out.push_str(&rest[open..]);
            return out;
        };

        if tail.as_bytes()[close] == b'{' {
            // `{{name}`: the first brace is literal text.
            out.push('{');
            rest = tail;
            continue;
        }

        let name = &tail[..close];
        if name.eq_ignore_ascii_case("operation") {
            out.push_str(&record.operation);
        } else if name.eq_ignore_ascii_case("duration") {
            let _ = write!(out, "{}", record.duration_ms);
        } else if name.eq_ignore_ascii_case("correlationid") {
            out.push_str(&record.correlation_id);
        } else {
            out.push('{');
            out.push_str(name);
            out.push('}');
        }
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    out
}
