//! Find-track - guided conversation that gathers era, genre and region
//! before asking the model for track recommendations.

mod reply;
mod state;

pub use reply::{
    opening_message, parse_opening, recommendations_message, turn_prompt, FindTrackReply,
    FALLBACK_OPENER, FIND_TRACK_TEMPERATURE, OPENING_PROMPT,
};
pub use state::{FindTrackState, FindTrackStatus};
