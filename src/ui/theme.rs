use ratatui::style::Color;

// Dark wall palette with one accent for recorded footage. Add roles here rather than inlining
// colors in the renderer.
pub const BG: Color = Color::Rgb(11, 13, 16);
pub const SURFACE: Color = Color::Rgb(17, 21, 27);
pub const BAR_BG: Color = Color::Rgb(14, 18, 24);

pub const FG: Color = Color::Rgb(229, 231, 235);
pub const MUTED: Color = Color::Rgb(156, 163, 175);
pub const DIM: Color = Color::Rgb(107, 114, 128);
pub const BORDER: Color = Color::Rgb(55, 65, 81);

pub const ACCENT: Color = Color::Rgb(255, 159, 26);
pub const ACCENT_BG: Color = Color::Rgb(44, 32, 16);

pub const LIVE: Color = Color::Rgb(134, 239, 172);
pub const ARCHIVE: Color = ACCENT;
pub const SEGMENT: Color = Color::Rgb(37, 47, 63);
pub const NOTICE: Color = Color::Rgb(248, 113, 113);
