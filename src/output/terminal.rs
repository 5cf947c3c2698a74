//! Terminal output helpers.

use crate::processing::Grade;
use colored::{ColoredString, Colorize};

/// Format a value as a quoted, right-aligned field of at least `width` chars.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

/// Grade letter coloured by band: green for A/A+, yellow for B/C, red below.
pub fn grade_colored(grade: Grade, text: &str) -> ColoredString {
    match grade {
        Grade::APlus | Grade::A => text.green(),
        Grade::B | Grade::C => text.yellow(),
        Grade::D | Grade::F => text.red(),
    }
}
