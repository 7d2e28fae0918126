pub mod completions;
pub mod config;
pub mod fix_urls;
pub mod sync;
pub mod whoami;
