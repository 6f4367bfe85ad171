// Registry sources — where daily download records come from.

pub mod npm_source;
pub mod static_source;
pub mod traits;
