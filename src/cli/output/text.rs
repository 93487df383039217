use owo_colors::{OwoColorize, Stream};

use crate::types::RunSummary;

/// One line per violation and directive error on stdout, aborted files on
/// stderr. Only the rule id is colored, and only when the stream supports it.
pub fn render(summary: &RunSummary, stack_trace: bool) {
    for violation in &summary.violations {
        let id = violation
            .rule_id
            .if_supports_color(Stream::Stdout, |id| id.yellow());
        let mut line = String::new();
        let _ = violation.write_line(&mut line, &id);
        println!("{line}");
    }
    for failure in &summary.pragma_failures {
        println!("{failure}");
    }

    for failure in &summary.scan_failures {
        eprintln!(
            "{}",
            failure
                .message
                .if_supports_color(Stream::Stderr, |m| m.red())
        );
        if stack_trace {
            eprintln!("{}", failure.detail);
        }
    }
}
