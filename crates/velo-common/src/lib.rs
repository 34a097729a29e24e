pub mod errors;
pub mod icon;
pub mod id;
pub mod types;

pub use errors::{ConfigError, PlatformError, VeloError};
pub use icon::{decode_icon, IconImage};
pub use id::new_correlation_id;
pub use types::{ClickButton, MenuEntry, MenuItemId, WindowPosition, WindowSize};

pub type Result<T> = std::result::Result<T, VeloError>;
