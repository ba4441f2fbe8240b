mod utils;
mod wildcard;

pub use utils::{has_wildcard, is_separator, join_path, try_box_str};
pub use wildcard::Wildcard;
#[cfg(windows)]
pub(crate) use utils::{SEPARATOR, is_root_like};
