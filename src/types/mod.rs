//! NBT value types: tags, containers and named tags.

mod compound;
mod list;
mod named;
mod tag;

pub use compound::Compound;
pub use list::TypedList;
pub use named::NamedTag;
pub use tag::{Tag, TagType};
