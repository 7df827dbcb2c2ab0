use std::sync::Arc;

use tracing::info;

use super::domain::{Character, CharacterId, Comment, NewCharacter, NewComment};
use super::repository::{CharacterRepository, CommentRepository};
use crate::repository::RepositoryError;

pub struct CharacterService<R> {
    repository: Arc<R>,
}

impl<R> CharacterService<R>
where
    R: CharacterRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn list_characters(&self) -> Result<Vec<Character>, CharacterServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn create_character(
        &self,
        character: NewCharacter,
    ) -> Result<Character, CharacterServiceError> {
        if character.name.trim().is_empty() {
            return Err(CharacterServiceError::Invalid(
                "character name must not be empty",
            ));
        }

        let stored = self.repository.save(character)?;
        info!(character_id = %stored.id, name = %stored.name, "character created");
        Ok(stored)
    }
}

/// Comments are only accepted for characters that exist.
pub struct CommentService<C, R> {
    comments: Arc<C>,
    characters: Arc<R>,
}

impl<C, R> CommentService<C, R>
where
    C: CommentRepository + 'static,
    R: CharacterRepository + 'static,
{
    pub fn new(comments: Arc<C>, characters: Arc<R>) -> Self {
        Self {
            comments,
            characters,
        }
    }

    pub fn comments_for(&self, id: CharacterId) -> Result<Vec<Comment>, CharacterServiceError> {
        Ok(self.comments.find_by_character_id(id)?)
    }

    pub fn add_comment(&self, comment: NewComment) -> Result<Comment, CharacterServiceError> {
        if comment.author.trim().is_empty() || comment.text.trim().is_empty() {
            return Err(CharacterServiceError::Invalid(
                "comment author and text must not be empty",
            ));
        }

        if self.characters.find_by_id(comment.character_id)?.is_none() {
            return Err(CharacterServiceError::CharacterNotFound(
                comment.character_id,
            ));
        }

        let stored = self.comments.save(comment)?;
        info!(
            comment_id = stored.id,
            character_id = %stored.character_id,
            "comment added"
        );
        Ok(stored)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CharacterServiceError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("character {0} does not exist")]
    CharacterNotFound(CharacterId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
