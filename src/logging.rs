use std::env;

/// Initialize logging. Output goes to stderr, leaving stdout to the bar.
pub fn init(quiet: bool) {
    if env::var("RUST_LOG").is_err() {
        let level = if quiet {
            "warn"
        } else if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        };
        env::set_var("RUST_LOG", format!("netspeed={}", level));
    }

    let _ = pretty_env_logger::try_init_timed();
}
