#![allow(clippy::uninlined_format_args)]

pub mod codec;
pub mod huffman;
pub mod rle;
pub mod zippy;
