//! # Holosync Serde
//! Byte-level encoding primitives used to build the handful of entity and
//! status packets holosync writes directly to viewer connections.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod buffer_pool;
mod byte_reader;
mod error;
mod serde;
mod stream_writer;
mod var_int;

pub use buffer_pool::{BufferPool, PooledBuffer};
pub use byte_reader::ByteReader;
pub use error::SerdeErr;
pub use serde::{Serde, MAX_STRING_LENGTH};
pub use stream_writer::{ByteWrite, StreamWriter};
pub use var_int::{VarInt, VarIntDecoder};
