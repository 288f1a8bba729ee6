use console::Term;

/// Exit status used when interrupted by Ctrl+C.
pub(crate) const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Set up the Ctrl+C handler.
///
/// Snapshot writes are atomic renames, so stopping between requests leaves
/// every file either fully replaced or untouched.
pub(crate) fn setup_shutdown_handler() {
    tokio::spawn(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            return;
        }

        if Term::stderr().is_term() {
            eprintln!("\n\nInterrupted. Snapshots saved so far are kept.");
        } else {
            tracing::warn!("Interrupted; snapshots saved so far are kept");
        }

        std::process::exit(INTERRUPTED_EXIT_CODE);
    });
}
