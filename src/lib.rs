#[macro_use]
mod logging;

mod error;
mod iter;
mod raw;
mod vec;

pub use error::StorageError;
pub use iter::{Iter, IterMut};
pub use raw::RawStorage;
pub use vec::DynArray;

#[cfg(test)]
pub mod dropflag;
