//! Static data.
//!
//! Definitions are built once, validated on registration and read-only
//! afterwards. Actions copy what they need into their context.

mod action;
mod repository;

pub use action::{ActionData, Category, IntrinsicData, ItemData, MapStatusData, SkillData, StatusData};
pub use repository::DataRepository;
