//! Characters and the comments readers leave on them.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;


pub use domain::{Character, CharacterId, Comment, NewCharacter, NewComment};
pub use repository::{CharacterRepository, CommentRepository};
pub use router::{character_router, comment_router};
pub use service::{CharacterService, CharacterServiceError, CommentService};
