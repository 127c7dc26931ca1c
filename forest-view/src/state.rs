//! Explicit UI state handed down to each view.
//!
//! Nothing here is global: [`crate::viewer::Viewer`] owns one [`UiState`]
//! and one [`CalculatorForm`] and passes them to the panels that need them.

use forest_core::{
    ForestError,
    config::UsageConfig,
    usage::{TokenCount, tokens_from_csv_file},
};

use crate::platform::Platform;

/// Which screen is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Calculator,
    Forest,
    CallToAction,
}

/// Screen, theme and overlay flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiState {
    pub view: View,
    pub dark_mode: bool,
    pub show_faq: bool,
    /// Draw the forest as a simple glyph grid instead of the plot.
    pub simple_view: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            view: View::Calculator,
            dark_mode: true,
            show_faq: false,
            simple_view: false,
        }
    }
}

/// Inputs of the calculator screen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalculatorForm {
    pub platform: Platform,
    pub tokens_text: String,
    pub csv_path: String,
    pub error: Option<String>,
}

impl CalculatorForm {
    /// Resolves the submitted token count.
    ///
    /// A CSV path takes precedence. If the CSV cannot be used, the manual
    /// entry is tried next; when that also fails the CSV error is reported,
    /// since it is the input the user chose first.
    ///
    /// ### Parameters
    /// - `cfg` - CSV import settings.
    ///
    /// ### Returns
    /// - `Ok(TokenCount)` from the CSV or the manual entry.
    /// - `Err(ForestError)` describing why neither input was usable.
    pub fn resolve(&self, cfg: &UsageConfig) -> Result<TokenCount, ForestError> {
        let path = self.csv_path.trim();
        if path.is_empty() {
            return TokenCount::parse(&self.tokens_text);
        }

        match tokens_from_csv_file(path, cfg) {
            Ok(tokens) => Ok(tokens),
            Err(csv_err) => {
                tracing::warn!(path, error = %csv_err, "CSV import failed");
                TokenCount::parse(&self.tokens_text).map_err(|_| csv_err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &tempfile::TempDir, body: &str) -> String {
        let path = dir.path().join("usage.csv");
        std::fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn manual_entry_without_csv() {
        let form = CalculatorForm {
            tokens_text: "1000000".into(),
            ..Default::default()
        };
        assert_eq!(form.resolve(&UsageConfig::default()).unwrap().get(), 1_000_000.0);
    }

    #[test]
    fn csv_takes_precedence_over_manual_entry() {
        let dir = tempfile::tempdir().unwrap();
        let form = CalculatorForm {
            tokens_text: "5".into(),
            csv_path: write_csv(&dir, "tokens\n70\n30\n"),
            ..Default::default()
        };
        assert_eq!(form.resolve(&UsageConfig::default()).unwrap().get(), 100.0);
    }

    #[test]
    fn bad_csv_falls_back_to_manual_entry() {
        let dir = tempfile::tempdir().unwrap();
        let form = CalculatorForm {
            tokens_text: "250".into(),
            csv_path: write_csv(&dir, "name\nann\n"),
            ..Default::default()
        };
        assert_eq!(form.resolve(&UsageConfig::default()).unwrap().get(), 250.0);
    }

    #[test]
    fn bad_csv_and_no_manual_entry_reports_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let form = CalculatorForm {
            csv_path: write_csv(&dir, "name\nann\n"),
            ..Default::default()
        };
        assert!(matches!(
            form.resolve(&UsageConfig::default()),
            Err(ForestError::NoTokenColumn)
        ));
    }

    #[test]
    fn empty_form_is_invalid_tokens() {
        assert!(matches!(
            CalculatorForm::default().resolve(&UsageConfig::default()),
            Err(ForestError::InvalidTokens(_))
        ));
    }
}
