//! Transcoding between named charsets.

use crate::charset::Charset;
use crate::error::ConversionError;

/// Converts bytes from one named charset into another.
///
/// The output buffer grows as needed, so implementations never have to
/// guess the worst-case expansion of a charset pair.
pub trait CharsetConverter {
    fn convert(
        &self,
        src_charset: &str,
        src: &[u8],
        dst_charset: &str,
    ) -> Result<Vec<u8>, ConversionError>;
}

/// The default converter, backed by `encoding_rs` and `charset`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingConverter;

impl CharsetConverter for EncodingConverter {
    fn convert(
        &self,
        src_charset: &str,
        src: &[u8],
        dst_charset: &str,
    ) -> Result<Vec<u8>, ConversionError> {
        let from = Charset::lookup(src_charset)?;
        let to = Charset::lookup(dst_charset)?;

        let text = from.decode(src)?;
        Ok(to.encode(&text)?.into_owned())
    }
}
