//! 服务模块

pub mod character_manager;
pub mod chat;
pub mod profile_manager;

pub use character_manager::{
    CharacterService, CharacterUpdates, NewCharacter, Pagination, create_character_service,
};
pub use chat::{ChatService, create_chat_service};
pub use profile_manager::{NewProfile, ProfileService, create_profile_service};
