mod booking;
mod job;
mod status;
mod user;

pub mod dtos {
    pub use crate::booking::dtos::*;
    pub use crate::user::dtos::*;
}

pub use crate::booking::api::*;
pub use crate::job::api::*;
pub use crate::status::api::*;
pub use crate::user::api::*;
