//! Room description generators and the static fallback around them.

use escape_rules::Room;

use crate::error::DescriptionError;
use crate::ports::{DescriptionGenerator, DescriptionRequest};

/// Prefix some generators use to report failure inside a successful reply.
const ERROR_SENTINEL: &str = "Error:";

/// Returns the room's authored description unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDescriptions;

impl DescriptionGenerator for StaticDescriptions {
    fn describe(&self, request: &DescriptionRequest<'_>) -> Result<String, DescriptionError> {
        Ok(request.room.description.clone())
    }
}

/// Deterministic narrator.
///
/// With `embellish` off it behaves like [`StaticDescriptions`]. With it on,
/// the authored text is extended with what the player can currently see.
/// The flag is fixed at construction; the engine never toggles it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeDescriptions {
    embellish: bool,
}

impl NarrativeDescriptions {
    pub fn new(embellish: bool) -> Self {
        Self { embellish }
    }
}

impl DescriptionGenerator for NarrativeDescriptions {
    fn describe(&self, request: &DescriptionRequest<'_>) -> Result<String, DescriptionError> {
        let room = request.room;
        if room.description.trim().is_empty() {
            return Err(DescriptionError::Failed(format!(
                "room {} has no authored text",
                room.id
            )));
        }
        if !self.embellish {
            return Ok(room.description.clone());
        }

        let mut text = room.description.trim_end().to_string();
        let names: Vec<&str> = room.interactables.iter().map(|i| i.name.as_str()).collect();
        if let Some(list) = join_names(&names) {
            text.push_str(&format!(" You can make out {}.", list));
        }
        if !request.scenario.is_empty() && request.scenario != room.id {
            text.push_str(&format!(
                " Everything here still bears the mark of {}.",
                request.theme.name
            ));
        }
        Ok(text)
    }
}

/// "a", "a and b", "a, b and c".
fn join_names(names: &[&str]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some(format!("the {}", only)),
        [init @ .., last] => {
            let head: Vec<String> = init.iter().map(|n| format!("the {}", n)).collect();
            Some(format!("{} and the {}", head.join(", "), last))
        }
    }
}

/// Authored text, or the room name when a room has none.
pub fn static_description(room: &Room) -> String {
    if room.description.trim().is_empty() {
        room.name.clone()
    } else {
        room.description.clone()
    }
}

/// Ask the generator for a description, falling back to static text on an
/// error, an empty reply or an error sentinel.
pub fn describe_room(generator: &dyn DescriptionGenerator, request: &DescriptionRequest<'_>) -> String {
    match generator.describe(request) {
        Ok(text) if !text.trim().is_empty() && !text.trim_start().starts_with(ERROR_SENTINEL) => text,
        Ok(text) => {
            tracing::warn!(
                room_id = %request.room.id,
                reply = %text,
                "Description generator returned no usable text, using static description"
            );
            static_description(request.room)
        }
        Err(e) => {
            tracing::warn!(
                room_id = %request.room.id,
                error = %e,
                "Description generation failed, using static description"
            );
            static_description(request.room)
        }
    }
}
