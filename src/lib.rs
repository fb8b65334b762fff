pub mod fake_feed;
pub mod format;
pub mod header_policy;
pub mod http_client;
pub mod markets;
pub mod scoreboard_fetch;
pub mod scroll_coupling;
pub mod scroll_surface;
pub mod state;
pub mod theme;
