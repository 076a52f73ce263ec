//! Serialization back out of the core: to RDL text and to a structured
//! JSON interchange form. Both submodules operate on canonical routes —
//! calling either serializer on a pre-canonical route canonicalizes it
//! first, so shorthand fields are never what gets emitted.

pub mod json;
pub mod text;
