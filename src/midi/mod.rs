pub mod events;
pub mod io;
pub mod notes;
pub mod tempo_map;
