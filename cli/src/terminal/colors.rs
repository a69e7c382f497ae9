use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 0, g: 200, b: 120 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 190, b: 60 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 210, g: 210, b: 210 };
pub const IPV4_ADDR: Color = Color::TrueColor { r: 100, g: 180, b: 255 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 190, g: 140, b: 255 };
pub const FAST: Color = Color::Green;
pub const SLOW: Color = Color::Yellow;
pub const LOST: Color = Color::Red;
