//! Application use cases over the business endpoints.

mod available_slots;
mod resources;

pub use available_slots::GetAvailableSlots;
pub use resources::ResourceApi;
