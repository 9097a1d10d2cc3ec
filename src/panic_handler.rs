use log::error;
use std::panic;

/// Install readable panic reports: full backtraces in debug builds, a short
/// crash report in release builds. Every panic is also written to the log.
pub fn initialize_panic_handler() {
    #[cfg(debug_assertions)]
    better_panic::install();

    #[cfg(not(debug_assertions))]
    human_panic::setup_panic!(Metadata::new(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));

    let report_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            error!("Panic: {}", msg);
        } else if let Some(msg) = panic_info.payload().downcast_ref::<String>() {
            error!("Panic: {}", msg);
        } else {
            error!("Panic with unknown payload");
        }
        report_hook(panic_info);
    }));
}

#[cfg(not(debug_assertions))]
use human_panic::Metadata;
