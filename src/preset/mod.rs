pub mod definition;
pub mod registry;

pub use definition::{NewPreset, Preset};
pub use registry::PresetRegistry;
