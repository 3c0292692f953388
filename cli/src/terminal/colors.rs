use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const SHAPED: Color = Color::Yellow;
pub const UNSHAPED: Color = Color::BrightBlack;
pub const FAILED: Color = Color::Red;
