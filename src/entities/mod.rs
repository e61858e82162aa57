// Entity Models
// Concrete record kinds. Each one owns a schema, a relation collection
// pointing at the other kind, and a serialized representation that only
// exposes its whitelisted scalar fields.

pub mod actor;
pub mod movie;

pub use actor::Actor;
pub use movie::Movie;
