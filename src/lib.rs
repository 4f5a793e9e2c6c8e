//! Reading, writing and interning of the constant pool at the head of an
//! AVM2 ABC (ActionScript Byte Code) block.

pub mod codec;
pub mod enums;
pub mod interner;
pub mod pool;
pub mod types;

pub use codec::{TagReader, TagWriter};
pub use enums::AccessKind;
pub use pool::{Pool, PoolError};
pub use types::{Multiname, Namespace, NamespaceSet};
