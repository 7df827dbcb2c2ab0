use super::domain::{Character, CharacterId, Comment, NewCharacter, NewComment};
use crate::repository::RepositoryError;

pub trait CharacterRepository: Send + Sync {
    fn find_by_id(&self, id: CharacterId) -> Result<Option<Character>, RepositoryError>;
    fn list(&self) -> Result<Vec<Character>, RepositoryError>;
    fn save(&self, character: NewCharacter) -> Result<Character, RepositoryError>;
}

pub trait CommentRepository: Send + Sync {
    fn find_by_character_id(&self, id: CharacterId) -> Result<Vec<Comment>, RepositoryError>;
    fn save(&self, comment: NewComment) -> Result<Comment, RepositoryError>;
}
