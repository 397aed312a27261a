use std::borrow::Cow;

use charset::Charset as EncodingCharset;
use encoding_rs::Encoding;

use crate::error::ConversionError;

lazy_static::lazy_static! {
    static ref UTF7: Option<EncodingCharset> = EncodingCharset::for_label(b"UTF-7");
}

/// A character set an encoded word may be declared in.
///
/// Conversions in both directions are strict: bytes that are not valid in
/// the charset, or text the charset cannot represent, are errors rather
/// than being replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Charset {
    /// Strict 7-bit ASCII.
    Ascii,
    /// UTF-7, supported for decoding only.
    Utf7,
    Encoding(&'static Encoding),
}

impl Default for Charset {
    fn default() -> Self {
        Charset::Encoding(encoding_rs::UTF_8)
    }
}

impl From<&'static Encoding> for Charset {
    fn from(enc: &'static Encoding) -> Self {
        Charset::Encoding(enc)
    }
}

impl Charset {
    pub fn name(self) -> &'static str {
        match self {
            Charset::Ascii => "US-ASCII",
            Charset::Utf7 => "UTF-7",
            Charset::Encoding(encoding) => encoding.name(),
        }
    }

    pub fn for_label(label: &[u8]) -> Option<Self> {
        if let Ok(enc) = std::str::from_utf8(label) {
            let enc = enc.trim().to_lowercase();
            match enc.as_str() {
                "us-ascii" | "ascii" => return Some(Charset::Ascii),
                "utf-7" => return Some(Charset::Utf7),
                // For some reason latin-1 is not a registered label
                "latin-1" => return Some(Charset::Encoding(encoding_rs::WINDOWS_1252)),
                _ => {}
            }
        }

        Encoding::for_label(label).map(Charset::Encoding)
    }

    /// Like [`Charset::for_label`], but reports unknown labels as errors.
    pub fn lookup(label: &str) -> Result<Self, ConversionError> {
        Charset::for_label(label.as_bytes()).ok_or_else(|| ConversionError::UnknownCharset {
            charset: label.into(),
        })
    }

    /// Decode `bytes` from this charset, failing on any malformed sequence.
    pub fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>, ConversionError> {
        let malformed = ConversionError::Malformed {
            charset: self.name(),
        };

        match self {
            Charset::Ascii => {
                if !bytes.is_ascii() {
                    return Err(malformed);
                }
                std::str::from_utf8(bytes)
                    .map(Cow::Borrowed)
                    .map_err(|_| malformed)
            }
            Charset::Utf7 => {
                let utf7 = match *UTF7 {
                    Some(utf7) => utf7,
                    None => return Err(malformed),
                };
                let (out, had_errors) = utf7.decode_without_bom_handling(bytes);
                if had_errors {
                    return Err(malformed);
                }
                Ok(out)
            }
            Charset::Encoding(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or(malformed),
        }
    }

    /// Encode `input` into this charset, failing on any character the
    /// charset cannot represent.
    pub fn encode(self, input: &str) -> Result<Cow<'_, [u8]>, ConversionError> {
        match self {
            Charset::Ascii => {
                if input.is_ascii() {
                    Ok(Cow::Borrowed(input.as_bytes()))
                } else {
                    Err(ConversionError::Unmappable {
                        charset: self.name(),
                    })
                }
            }
            Charset::Utf7 => Err(ConversionError::UnsupportedTarget {
                charset: self.name(),
            }),
            // encoding_rs only encodes into ASCII-compatible output
            // encodings, UTF-16 is straightforward to do by hand.
            Charset::Encoding(encoding) if encoding == encoding_rs::UTF_16LE => Ok(Cow::Owned(
                input.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            )),
            Charset::Encoding(encoding) if encoding == encoding_rs::UTF_16BE => Ok(Cow::Owned(
                input.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            )),
            Charset::Encoding(encoding) if encoding.output_encoding() != encoding => {
                Err(ConversionError::UnsupportedTarget {
                    charset: self.name(),
                })
            }
            Charset::Encoding(encoding) => {
                let unmappable = ConversionError::Unmappable {
                    charset: self.name(),
                };

                let (out, _, had_errors) = encoding.encode(input);
                if had_errors {
                    return Err(unmappable);
                }

                // The Japanese encoders substitute some characters without
                // flagging an error (half-width katakana become full-width,
                // U+2212 becomes U+FF0D), so the output must decode back
                // to the input.
                match encoding.decode_without_bom_handling_and_without_replacement(&out) {
                    Some(decoded) if decoded == input => {}
                    _ => return Err(unmappable),
                }
                Ok(out)
            }
        }
    }
}
