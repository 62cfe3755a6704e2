pub mod input;
pub mod layout;
pub mod view;

pub use layout::ScreenLayout;
