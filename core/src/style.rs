use colored::{Color, ColoredString, Colorize};

use crate::judging::{Outcome, SubmissionStatus};

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

impl ColorTheme for Outcome {
    fn color(&self) -> Color {
        use Outcome::*;
        if !self::is_truecolor_supported() {
            return match self {
                Accepted => Color::Green,
                WrongAnswer => Color::Yellow,
                TimeLimitExceeded => Color::Red,
                CompilationError => Color::Blue,
                RuntimeError => Color::Magenta,
                Unknown | SystemError => Color::BrightBlack,
            };
        }

        let (r, g, b) = match self {
            Accepted => (30, 180, 40),
            WrongAnswer => (210, 138, 4),
            TimeLimitExceeded => (220, 42, 42),
            CompilationError => (40, 110, 220),
            RuntimeError => (171, 40, 200),
            Unknown | SystemError => (110, 110, 110),
        };
        Color::TrueColor { r, g, b }
    }
}

impl ColorTheme for SubmissionStatus {
    fn color(&self) -> Color {
        use SubmissionStatus::*;
        match self {
            Accepted => Outcome::Accepted.color(),
            WrongAnswer => Outcome::WrongAnswer.color(),
            TimeLimitExceeded => Outcome::TimeLimitExceeded.color(),
            RuntimeError => Outcome::RuntimeError.color(),
            CompilationError => Outcome::CompilationError.color(),
            Pending => Outcome::Unknown.color(),
        }
    }
}

/// Short verdict badge such as ` AC ` or ` TLE `.
pub fn judge_icon(outcome: Outcome) -> ColoredString {
    badge(outcome.to_string(), outcome.color())
}

pub fn status_badge(status: SubmissionStatus) -> ColoredString {
    badge(status.to_string().to_uppercase(), status.color())
}

fn badge(label: String, bg: Color) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", label).on_color(bg).bold().color(fg)
}
