mod board;

pub use board::BoardWidget;
