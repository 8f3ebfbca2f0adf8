/// Icons used in the provisioning transcript.
///
/// Only glyphs from the Font Awesome range of nerd fonts are used so they
/// render on any patched console font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NerdFont {
    // Status and feedback
    Check,
    CrossCircle,
    Warning,
    Info,

    // System
    Terminal,
    Bug,
    Server,

    // Accounts
    User,
    Search,
}

impl NerdFont {
    pub fn unicode(self) -> char {
        match self {
            Self::Check => '\u{f00c}',       // fa-check
            Self::CrossCircle => '\u{f057}', // fa-times-circle
            Self::Warning => '\u{f071}',     // fa-exclamation-triangle
            Self::Info => '\u{f05a}',        // fa-info-circle

            Self::Terminal => '\u{f120}', // fa-terminal
            Self::Bug => '\u{f188}',      // fa-bug
            Self::Server => '\u{f233}',   // fa-server

            Self::User => '\u{f007}',   // fa-user
            Self::Search => '\u{f002}', // fa-search
        }
    }
}

impl std::fmt::Display for NerdFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.unicode())
    }
}

impl From<NerdFont> for char {
    fn from(icon: NerdFont) -> Self {
        icon.unicode()
    }
}
