use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::RwLock;
use std::time::SystemTime;

use once_cell::sync::Lazy;

use crate::batch::TransferCode;
use crate::transfer::TransferHandle;
use crate::utils::{format_datetime, format_elapsed};

#[derive(Clone)]
enum DebugTarget {
    Console,
    File(String),
}

#[derive(Clone)]
struct DebugConfig {
    enabled: bool,
    target: DebugTarget,
}

static DEBUG_CONFIG: Lazy<RwLock<DebugConfig>> = Lazy::new(|| {
    RwLock::new(DebugConfig { enabled: false, target: DebugTarget::Console })
});

/// Turns per-transfer completion logging on or off.
///
/// `target` is either `"console"` (or empty) for stdout, or a path; a
/// directory gets a `debug.log` inside it.
pub fn set_debug(enabled: bool, target: Option<String>) {
    let mut cfg = DEBUG_CONFIG.write().unwrap();
    cfg.enabled = enabled;
    cfg.target = match target {
        Some(t) if t.to_lowercase() == "console" || t.is_empty() => DebugTarget::Console,
        Some(t) => {
            let path = Path::new(&t);
            if path.is_dir() { DebugTarget::File(path.join("debug.log").to_string_lossy().to_string()) }
            else { DebugTarget::File(t) }
        },
        None => DebugTarget::Console,
    };
}

// One block per concluded transfer.
pub(crate) fn debug_log(handle: &TransferHandle, code: TransferCode) {
    if !DEBUG_CONFIG.read().unwrap().enabled { return; }

    let mut msg = format!("\n==== [{}] ====\n", handle.tag().unwrap_or("no-tag"));
    msg.push_str(&format!("Time: {}\n", format_datetime(SystemTime::now())));
    msg.push_str(&format!("Method: {}\nURL: {}\nResult: {}\n", handle.method(), handle.url(), code));
    if let Some(status) = handle.status() { msg.push_str(&format!("Status: {}\n", status)); }
    if let Some(elapsed) = handle.elapsed() { msg.push_str(&format!("Elapsed: {}\n", format_elapsed(elapsed))); }

    match &DEBUG_CONFIG.read().unwrap().target {
        DebugTarget::Console => println!("{}", msg),
        DebugTarget::File(path) => { let _ = OpenOptions::new().create(true).append(true).open(path).map(|mut f| writeln!(f, "{}", msg)); }
    }
}
