use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub dim: Color,
    pub border: Color,
    /// Approve / positive green.
    pub accent: Color,
    /// Rule-builder amber.
    pub warn: Color,
    /// Edit / error red.
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(51, 51, 51),
            accent: Color::Rgb(16, 185, 129),
            warn: Color::Rgb(245, 158, 11),
            error: Color::Rgb(239, 68, 68),
        }
    }
}
