use std::process::exit;

use staffscope::utils::{tag, Level};

fn main() {
    if let Err(e) = staffscope::app::run_cli() {
        eprintln!("{} {}", tag(Level::Error), e);
        exit(1);
    }
}
