pub use self::{body::*, entity::*};

pub(crate) mod body;
pub(crate) mod entity;
