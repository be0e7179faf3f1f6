use ratatui::style::Color;

/// Colors used by the board UI, grouped by purpose.
/// Swap between presets (Dark / Light) to adapt to the terminal background.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Board ──────────────────────────────────────────────────────
    pub light_square: Color,
    pub dark_square: Color,
    pub white_piece: Color,
    pub black_piece: Color,
    pub board_border: Color,
    pub board_label: Color,
    pub tray_bg: Color,

    // ── Highlights (light-square variant, dark-square variant) ────
    pub highlight_source: (Color, Color),
    pub highlight_hover: (Color, Color),

    // ── Text ──────────────────────────────────────────────────────
    pub text_primary: Color,
    pub positive: Color,
    pub negative: Color,
    pub muted: Color,
}

impl Theme {
    /// For terminals with a dark background.
    pub fn dark() -> Self {
        Self {
            light_square: Color::Rgb(240, 217, 181),
            dark_square: Color::Rgb(181, 136, 99),
            // Explicit RGB: many terminals remap ANSI white and black.
            white_piece: Color::Rgb(255, 255, 255),
            black_piece: Color::Rgb(0, 0, 0),
            board_border: Color::Cyan,
            board_label: Color::Yellow,
            tray_bg: Color::Rgb(60, 60, 60),

            highlight_source: (Color::LightYellow, Color::Yellow),
            highlight_hover: (Color::LightBlue, Color::Blue),

            text_primary: Color::White,
            positive: Color::Green,
            negative: Color::Red,
            muted: Color::DarkGray,
        }
    }

    /// For terminals with a light background.
    pub fn light() -> Self {
        Self {
            light_square: Color::Rgb(240, 217, 181),
            dark_square: Color::Rgb(181, 136, 99),
            white_piece: Color::Rgb(255, 255, 255),
            black_piece: Color::Rgb(0, 0, 0),
            board_border: Color::Blue,
            board_label: Color::Rgb(140, 90, 0),
            tray_bg: Color::Rgb(200, 200, 200),

            highlight_source: (Color::Rgb(246, 246, 105), Color::Rgb(186, 202, 43)),
            highlight_hover: (Color::Rgb(160, 200, 240), Color::Rgb(90, 140, 200)),

            text_primary: Color::Black,
            positive: Color::Rgb(0, 128, 0),
            negative: Color::Rgb(180, 0, 0),
            muted: Color::Gray,
        }
    }

    /// Theme from the `CHESSBOARD_THEME` environment variable.
    pub fn detect() -> Self {
        Self::from_preference(std::env::var("CHESSBOARD_THEME").ok().as_deref())
    }

    /// Pick a preset by name. Anything other than `"light"` is dark.
    pub fn from_preference(pref: Option<&str>) -> Self {
        match pref {
            Some(p) if p.eq_ignore_ascii_case("light") => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn square_color(&self, is_light_square: bool) -> Color {
        if is_light_square {
            self.light_square
        } else {
            self.dark_square
        }
    }

    pub fn highlight_color(&self, colors: (Color, Color), is_light_square: bool) -> Color {
        if is_light_square {
            colors.0
        } else {
            colors.1
        }
    }

    pub fn is_dark(&self) -> bool {
        self.text_primary == Color::White
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
