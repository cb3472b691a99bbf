use crate::app::geometry::{Color, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualKind {
    /// Solid quad sized by the entity scale; needs no loaded texture.
    Placeholder,
    Sprite(String),
}

/// Opaque drawable description. The draw target owns whatever the key resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub kind: VisualKind,
    /// Texture region for sprite sheets; `None` draws the whole texture.
    pub source_rect: Option<Rect>,
    pub tint: Color,
    pub alpha: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Visual {
    pub fn sprite(key: impl Into<String>) -> Self {
        Self::with_kind(VisualKind::Sprite(key.into()))
    }

    pub fn placeholder(tint: Color) -> Self {
        Self {
            tint,
            ..Self::with_kind(VisualKind::Placeholder)
        }
    }

    fn with_kind(kind: VisualKind) -> Self {
        Self {
            kind,
            source_rect: None,
            tint: Color::WHITE,
            alpha: 1.0,
            flip_x: false,
            flip_y: false,
        }
    }

    pub fn with_source_rect(mut self, source_rect: Rect) -> Self {
        self.source_rect = Some(source_rect);
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn sprite_key(&self) -> Option<&str> {
        match &self.kind {
            VisualKind::Sprite(key) => Some(key),
            VisualKind::Placeholder => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_defaults_to_untinted_opaque_full_texture() {
        let visual = Visual::sprite("ship");
        assert_eq!(visual.sprite_key(), Some("ship"));
        assert_eq!(visual.tint, Color::WHITE);
        assert_eq!(visual.alpha, 1.0);
        assert!(visual.source_rect.is_none());
        assert!(!visual.flip_x && !visual.flip_y);
    }

    #[test]
    fn builders_set_sheet_region_and_tint() {
        let region = Rect::new(32.0, 0.0, 16.0, 16.0);
        let visual = Visual::sprite("tiles")
            .with_source_rect(region)
            .with_tint(Color::RED);
        assert_eq!(visual.source_rect, Some(region));
        assert_eq!(visual.tint, Color::RED);
        assert_eq!(visual.sprite_key(), Some("tiles"));
    }

        #[test]
    fn placeholder_has_no_sprite_key() {
        let visual = Visual::placeholder(Color::RED);
        assert_eq!(visual.sprite_key(), None);
        assert_eq!(visual.tint, Color::RED);
    }
}
