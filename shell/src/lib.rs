//! Session store, role-based route guard and HTTP shell for the service
//! marketplace front end.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use domain::TraceId;
pub use middleware::Trace;
