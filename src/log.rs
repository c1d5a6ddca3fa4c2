//! Warning sink. While the TUI holds the terminal in raw mode, warnings
//! from background fetches must not be written to stderr directly or they
//! corrupt the display; they are held here and flushed after restore.

use std::sync::Mutex;

static HELD: Mutex<Option<Vec<String>>> = Mutex::new(None);

/// Start holding warnings instead of printing them
pub fn hold() {
    *HELD.lock().unwrap() = Some(Vec::new());
}

/// Stop holding and hand back everything collected since `hold`
pub fn release() -> Vec<String> {
    HELD.lock().unwrap().take().unwrap_or_default()
}

pub fn warn(msg: String) {
    let mut guard = HELD.lock().unwrap();
    match guard.as_mut() {
        Some(held) => held.push(msg),
        None => {
            drop(guard);
            eprintln!("{}", msg);
        }
    }
}

/// `eprintln!` that respects the hold window
#[macro_export]
macro_rules! warnln {
    ($($arg:tt)*) => {
        $crate::log::warn(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the sink is process-global, so parallel tests would race
    #[test]
    fn test_hold_release_cycle() {
        assert!(release().is_empty());

        hold();
        warn("first".to_string());
        warn("second".to_string());
        assert_eq!(release(), vec!["first", "second"]);

        assert!(release().is_empty());
    }
}
