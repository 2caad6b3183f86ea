use serde::{Deserialize, Serialize};

use crate::model::{Character, CharacterId, Place};
use crate::{AppError, UNKNOWN_DETAIL};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub cards: Vec<CharacterCard>,
    pub search_term: String,
    /// Drives the footer spinner.
    pub is_loading: bool,
    pub has_more: bool,
    pub detail: Option<CharacterDetail>,
    pub favorites_ready: bool,
    pub favorite_count: usize,
    pub error: Option<UserFacingError>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CharacterCard {
    pub id: CharacterId,
    pub name: String,
    pub image: String,
    pub species: String,
    pub is_favorite: bool,
}

impl CharacterCard {
    #[must_use]
    pub fn new(character: &Character, is_favorite: bool) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            image: character.image.clone(),
            species: character.species.clone(),
            is_favorite,
        }
    }
}

/// Detail sheet. Every descriptor is filled; missing values read "Unknown".
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CharacterDetail {
    pub id: CharacterId,
    pub name: String,
    pub image: String,
    pub gender: String,
    pub status: String,
    pub species: String,
    pub origin: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub is_favorite: bool,
}

impl CharacterDetail {
    #[must_use]
    pub fn new(character: &Character, is_favorite: bool) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            image: character.image.clone(),
            gender: or_unknown(Some(&character.gender)),
            status: or_unknown(Some(&character.status)),
            species: or_unknown(Some(&character.species)),
            origin: or_unknown(character.origin.as_ref().map(|p: &Place| &p.name)),
            kind: or_unknown(character.kind.as_ref()),
            location: or_unknown(character.location.as_ref().map(|p: &Place| &p.name)),
            is_favorite,
        }
    }
}

fn or_unknown(value: Option<&String>) -> String {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_DETAIL)
        .to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub error_code: String,
    pub is_transient: bool,
    pub is_retryable: bool,
}

impl UserFacingError {
    /// `has_retry` is false when there is no operation to re-issue.
    #[must_use]
    pub fn new(error: &AppError, has_retry: bool) -> Self {
        Self {
            message: error.user_facing_message(),
            error_code: error.code().to_string(),
            is_transient: matches!(error.severity, crate::ErrorSeverity::Transient),
            is_retryable: has_retry && error.is_retryable(),
        }
    }
}
