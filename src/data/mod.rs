pub mod characters;
pub mod export;
pub mod hotkeys;
pub mod kinematics;
pub mod playback;
pub mod trajectory;
pub mod warp;
