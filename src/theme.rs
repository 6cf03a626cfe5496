use ratatui::style::Color;

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Base16 palette; only the slots the shell draws with
#[derive(Clone, Debug)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background (status bars)
    pub base_02: Color, // Selection background
    pub base_03: Color, // Muted text
    pub base_04: Color, // Borders
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Brightest text
    pub base_08: Color, // Red (errors)
    pub base_0a: Color, // Yellow (indicators)
    pub base_0b: Color, // Green (images)
    pub base_0d: Color, // Blue (documents)
}

pub const OCEANIC_NEXT: Base16Palette = Base16Palette {
    base_00: rgb(0x1B2B34),
    base_01: rgb(0x343D46),
    base_02: rgb(0x4F5B66),
    base_03: rgb(0x65737E),
    base_04: rgb(0xA7ADBA),
    base_05: rgb(0xC0C5CE),
    base_06: rgb(0xCDD3DE),
    base_07: rgb(0xF0F4F8),
    base_08: rgb(0xEC5F67),
    base_0a: rgb(0xFAC863),
    base_0b: rgb(0x99C794),
    base_0d: rgb(0x6699CC),
};

pub fn current_theme() -> &'static Base16Palette {
    &OCEANIC_NEXT
}

impl Base16Palette {
    /// (text, border) for a focused or unfocused panel
    pub fn get_panel_colors(&self, is_focused: bool) -> (Color, Color) {
        if is_focused {
            (self.base_07, self.base_04)
        } else {
            (self.base_03, self.base_03)
        }
    }

    /// (background, foreground) of the selected row
    pub fn get_selection_colors(&self, is_focused: bool) -> (Color, Color) {
        if is_focused {
            (self.base_02, self.base_06)
        } else {
            (self.base_02, self.base_03)
        }
    }
}
