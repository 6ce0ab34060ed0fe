pub mod compression;

pub use compression::{
    compress, compress_if_needed, decompress, decompress_if_needed, should_compress, CodecError,
    CompressedContent, EncodedContent, COMPRESSION_THRESHOLD,
};
