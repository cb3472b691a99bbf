use thiserror::Error;

use crate::app::entity::EntityId;
use crate::app::geometry::{Color, Transform};

use super::{Camera2D, Visual};

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("sprite '{sprite_key}' is not loaded")]
    MissingSprite { sprite_key: String },
    #[error("draw backend failed: {reason}")]
    Backend { reason: String },
}

/// Failure of the scene render pass. The pass stops at the first failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to clear frame: {0}")]
    Clear(#[source] DrawError),
    #[error("failed to draw entity {entity_id}: {source}")]
    Draw {
        entity_id: EntityId,
        #[source]
        source: DrawError,
    },
}

impl RenderError {
    pub fn entity_id(&self) -> Option<EntityId> {
        match self {
            RenderError::Clear(_) => None,
            RenderError::Draw { entity_id, .. } => Some(*entity_id),
        }
    }
}

/// Draw collaborator. Implementations render but never touch scene state.
pub trait DrawTarget {
    fn clear(&mut self, _background: Color) -> Result<(), DrawError> {
        Ok(())
    }

    fn draw(
        &mut self,
        visual: &Visual,
        transform: &Transform,
        camera: &Camera2D,
    ) -> Result<(), DrawError>;
}
