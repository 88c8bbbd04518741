mod options_page;
mod popup;

pub use options_page::OptionsPage;
pub use popup::Popup;
