mod policy;
mod route_guards;

pub use policy::{Permission, Policy};
pub use route_guards::{protect_job_route, protect_route, JOB_SECRET_HEADER};
