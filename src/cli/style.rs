//! Terminal output styling for the review commands
//!
//! Every colored fragment the CLI prints goes through a [`Role`], which
//! decides both the color and the stream whose color support is checked.
//! Support detection (`NO_COLOR`, `CLICOLOR_FORCE`, TTY) is left to
//! `owo-colors`.
//!
//! | Role        | Look   | Stream | Printed for                          |
//! |-------------|--------|--------|--------------------------------------|
//! | `Highlight` | Cyan   | stdout | versions, entity names, version ids  |
//! | `Detail`    | Dim    | stdout | publish paths, record ids, sizes     |
//! | `Heading`   | Bold   | stdout | context line, Version codes          |
//! | `Done`      | Green  | stdout | finished submission steps            |
//! | `Failure`   | Red    | stderr | submission errors                    |
//! | `Caution`   | Yellow | stderr | teardown problems                    |

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style};
use std::fmt::{self, Display};
use std::sync::OnceLock;

pub use owo_colors::Stream;

/// What a printed fragment means to the reader
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Highlight,
    Detail,
    Heading,
    Done,
    Failure,
    Caution,
}

impl Role {
    const fn style(self) -> Style {
        match self {
            Self::Highlight => Style::new().cyan(),
            Self::Detail => Style::new().dimmed(),
            Self::Heading => Style::new().bold(),
            Self::Done => Style::new().green(),
            Self::Failure => Style::new().red(),
            Self::Caution => Style::new().yellow(),
        }
    }

    /// Stream whose color support decides whether the role is rendered
    const fn stream(self) -> Stream {
        match self {
            Self::Failure | Self::Caution => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }
}

/// A value printed in a given [`Role`]
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    role: Role,
}

impl<T> Styled<T> {
    const fn new(value: T, role: Role) -> Self {
        Self { value, role }
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.role.style();
        write!(
            f,
            "{}",
            self.value
                .if_supports_color(self.role.stream(), |v| v.style(style))
        )
    }
}

/// Role shortcuts for anything printable
pub trait Stylize: Display {
    /// Versions and names the user is looking for
    fn highlight(&self) -> Styled<&Self> {
        Styled::new(self, Role::Highlight)
    }

    /// Paths, ids and sizes
    fn detail(&self) -> Styled<&Self> {
        Styled::new(self, Role::Detail)
    }

    fn heading(&self) -> Styled<&Self> {
        Styled::new(self, Role::Heading)
    }

    /// Error text; checked against stderr
    fn failure(&self) -> Styled<&Self> {
        Styled::new(self, Role::Failure)
    }

    /// Teardown warnings; checked against stderr
    fn caution(&self) -> Styled<&Self> {
        Styled::new(self, Role::Caution)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Version number the way publish files spell it, e.g. `v007`
pub fn version_label(version: u32) -> Styled<String> {
    Styled::new(format!("v{version:03}"), Role::Highlight)
}

// Line markers

/// Step finished
pub const fn done() -> Styled<&'static str> {
    Styled::new("✓", Role::Done)
}

/// Step failed
pub const fn failed() -> Styled<&'static str> {
    Styled::new("✗", Role::Failure)
}

/// Resolved publish path
pub const fn pointer() -> Styled<&'static str> {
    Styled::new("→", Role::Highlight)
}

/// One playlist in a listing
pub const fn list_item() -> Styled<&'static str> {
    Styled::new("○", Role::Detail)
}

/// Left rail of the context breakdown
pub const fn rail() -> Styled<&'static str> {
    Styled::new("│", Role::Detail)
}

/// Review page link, clickable where the terminal supports OSC 8
pub fn review_link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner shown while the movie uploads
pub fn upload_spinner() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .expect("upload spinner template is valid")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        })
        .clone()
}
