//! Console prompts

use std::io::{self, BufRead, Write};

/// Print `message` and block until the user presses Enter.
pub fn wait_for_enter(message: &str) {
    print!("{}", message);
    io::stdout().flush().ok();
    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line).ok();
}
