use frame_lens_core::{CellValue, ColumnKind};
use ratatui::style::Color;

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub highlight: Color,
    pub numeric: Color,
    pub text: Color,
    pub boolean: Color,
    pub muted: Color,
    pub error: Color,
    pub warning: Color,
    pub success: Color,
    /// scatter series colours, cycled
    pub series: Vec<Color>,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            highlight: Color::Yellow,
            numeric: Color::Cyan,
            text: Color::Green,
            boolean: Color::Magenta,
            muted: Color::DarkGray,
            error: Color::Red,
            warning: Color::LightYellow,
            success: Color::LightGreen,
            series: vec![
                Color::Cyan,
                Color::LightRed,
                Color::LightGreen,
                Color::Yellow,
                Color::LightMagenta,
                Color::LightBlue,
            ],
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            highlight: Color::Blue,
            numeric: Color::DarkGray,
            text: Color::Green,
            boolean: Color::Magenta,
            muted: Color::Gray,
            error: Color::Red,
            warning: Color::Rgb(0xB0, 0x70, 0x00),
            success: Color::Green,
            series: vec![Color::Blue, Color::Red, Color::Green, Color::Magenta, Color::Rgb(0xB0, 0x70, 0x00)],
        }
    }

    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(216, 222, 233),
            highlight: Color::Rgb(136, 192, 208),
            numeric: Color::Rgb(129, 161, 193),
            text: Color::Rgb(163, 190, 140),
            boolean: Color::Rgb(180, 142, 173),
            muted: Color::Rgb(76, 86, 106),
            error: Color::Rgb(191, 97, 106),
            warning: Color::Rgb(235, 203, 139),
            success: Color::Rgb(163, 190, 140),
            series: vec![
                Color::Rgb(136, 192, 208),
                Color::Rgb(191, 97, 106),
                Color::Rgb(163, 190, 140),
                Color::Rgb(235, 203, 139),
                Color::Rgb(180, 142, 173),
            ],
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "nord" => Self::nord(),
            _ => Self::dark(),
        }
    }

    pub fn series_color(&self, i: usize) -> Color {
        self.series[i % self.series.len()]
    }

    pub fn kind_color(&self, kind: ColumnKind) -> Color {
        match kind {
            ColumnKind::Integer | ColumnKind::Float => self.numeric,
            ColumnKind::Text => self.text,
            ColumnKind::Boolean => self.boolean,
            ColumnKind::Other => self.fg,
        }
    }

    pub fn cell_color(&self, value: &CellValue) -> Color {
        match value {
            CellValue::Null => self.muted,
            CellValue::Bool(_) => self.boolean,
            CellValue::Int(_) | CellValue::UInt(_) | CellValue::Float(_) => self.numeric,
            CellValue::Text(_) => self.fg,
        }
    }
}
