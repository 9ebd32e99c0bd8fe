//! Coloured status lines for the terminal
//!
//! Roadmap data goes to stdout uncoloured; diagnostics and statistics go to
//! stderr. `colored` honours NO_COLOR and CLICOLOR(_FORCE).

use colored::Colorize;

/// Failure message on stderr.
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Non-fatal problem on stderr.
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow(), msg);
}

/// A file was written or created.
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Labelled fact such as a config path.
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Tree statistic on stderr, so it never mixes with rendered output.
pub fn stat(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", label.cyan(), msg);
}

/// Rendered roadmap or config text, uncoloured.
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
