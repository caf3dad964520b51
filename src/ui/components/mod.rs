pub mod card_view;
pub mod menu;
pub mod progress_bar;
