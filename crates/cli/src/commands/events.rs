//! Operator alert stream.

use std::io::BufRead;

use chrono::Utc;
use tracing::{info, warn};
use vitrina_admin::events::AlertFeed;

use super::{CommandResult, emit};

/// Turn JSON event lines from stdin into toasts until end of input.
///
/// Malformed lines are logged and skipped.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub fn run() -> CommandResult {
    let mut feed = AlertFeed::default();
    let mut handled = 0_usize;
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let now = Utc::now();
        feed.prune(now);
        match feed.handle_line(&line, now) {
            Ok(Some(toast)) => {
                handled += 1;
                emit(toast);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Skipping event"),
        }
    }
    info!(handled, "Event stream closed");
    Ok(())
}
