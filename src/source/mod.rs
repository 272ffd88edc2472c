// Network fetch abstraction: pluggable transports for asset fetches.

pub mod http_source;
pub mod traits;
