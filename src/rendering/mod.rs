pub mod heatmap;
pub mod piano_roll;
