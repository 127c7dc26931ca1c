/// AI platform whose usage export the user is importing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    #[default]
    Cursor,
    OpenAi,
    Claude,
    Gemini,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Cursor,
        Platform::OpenAi,
        Platform::Claude,
        Platform::Gemini,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Platform::Cursor => "Cursor",
            Platform::OpenAi => "OpenAI",
            Platform::Claude => "Claude",
            Platform::Gemini => "Gemini",
        }
    }

    /// How to obtain a usage CSV from this platform.
    pub fn export_steps(self) -> &'static [&'static str] {
        match self {
            Platform::Cursor => &[
                "Log in to Cursor and open the Dashboard",
                "Click on Usage",
                "Pick a date range above the \"All Events\" table and click \"Export CSV\"",
                "Enter the path of the downloaded file below",
            ],
            Platform::OpenAi => &[
                "Log in to OpenAI and go to Usage",
                "Select a date range and export usage as CSV",
                "Enter the path of the downloaded file below",
            ],
            Platform::Claude => &[
                "Log in to the Anthropic Console and go to Usage",
                "Export usage as CSV for a date range",
                "Enter the path of the downloaded file below",
            ],
            Platform::Gemini => &[
                "Log in to Google AI Studio or Billing Reports",
                "Export usage as CSV for a date range",
                "Enter the path of the downloaded file below",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_has_steps() {
        for p in Platform::ALL {
            assert!(!p.export_steps().is_empty(), "{p:?}");
            assert!(!p.label().is_empty());
        }
    }
}
