//! HTTP API handlers for knectar-site

pub mod health;
pub mod menu;
pub mod page;
pub mod session;
pub mod tts;

pub use health::health_routes;
pub use menu::update_menu;
pub use page::save_page;
pub use session::{login, logout};
pub use tts::text_to_speech;
