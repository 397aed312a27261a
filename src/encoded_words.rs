//! Routines for building and reading RFC 2047 encoded words.
//!
//! An encoded word looks like this: `=?charset?cte?encoded_string?=`.
//!
//! Words produced here always declare `ISO-2022-JP` as their charset, which
//! is what legacy Japanese mail readers expect, and always use base64 ('B')
//! as the cte.  Quoted printable ('Q') is not supported in either direction:
//! a word declaring it is rejected with [`Error::UnsupportedEncoding`] rather
//! than decoded on a best effort basis.  The cte tag is matched exactly, so
//! a lowercase 'b' is rejected as well.
//!
//! Decoding is a fixed, fail-fast pipeline.  The word is validated (exactly
//! four '?' delimiters, the `=?` ... `?=` envelope, non-empty fields, a
//! supported cte), the payload is base64 decoded, and the resulting bytes
//! are transcoded from the declared charset into the charset the caller asks
//! for.  The first failing stage ends the call, and a diagnostic naming the
//! stage and the offending word is handed to the codec's [`ErrorSink`].

use std::fmt;

use crate::convert::{CharsetConverter, EncodingConverter};
use crate::error::{ConversionError, Error, Field, FormatError};
use crate::sink::{ErrorSink, LogSink};

/// The charset every encoded word produced by [`Codec::encode`] declares.
pub const INTERMEDIATE_CHARSET: &str = "ISO-2022-JP";

const DELIMITER: char = '?';
const DELIMITER_COUNT: usize = 4;
const PREFIX: &str = "=?";
const SUFFIX: &str = "?=";

// -- Base64

fn decode_b<T: AsRef<[u8]>>(encoded: T) -> Result<Vec<u8>, ConversionError> {
    let encoded = encoded.as_ref();
    if encoded.len() % 4 > 0 {
        return Err(ConversionError::InvalidBase64Length {
            length: encoded.len(),
        });
    }

    // Decoded data is never longer than 3 bytes per 4 input bytes.
    let mut decoded = Vec::with_capacity(encoded.len() / 4 * 3);
    base64::decode_config_buf(encoded, base64::STANDARD, &mut decoded)
        .map_err(ConversionError::InvalidBase64)?;

    Ok(decoded)
}

fn encode_b<T: AsRef<[u8]>>(bstring: T) -> String {
    let bstring = bstring.as_ref();
    let mut encoded = String::with_capacity(len_b(bstring.len()));
    base64::encode_config_buf(bstring, base64::STANDARD, &mut encoded);
    encoded
}

fn len_b(len: usize) -> usize {
    let groups_of_3 = len / 3;
    let leftover = len % 3;

    // 4 bytes out for each 3 bytes (or nonzero fraction thereof) in.
    let padding_len = if leftover > 0 { 4 } else { 0 };
    groups_of_3 * 4 + padding_len
}

/// Content transfer encodings of an encoded word.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Encoding {
    Base64,
}

impl Encoding {
    /// Look up the encoding for a cte tag.  Only `B` is supported.
    pub fn from_tag(tag: &str) -> Result<Self, Error> {
        match tag {
            "B" => Ok(Encoding::Base64),
            _ => Err(Error::UnsupportedEncoding { tag: tag.into() }),
        }
    }

    pub fn tag(self) -> char {
        match self {
            Encoding::Base64 => 'B',
        }
    }

    pub fn decode<T: AsRef<[u8]>>(self, ew: T) -> Result<Vec<u8>, ConversionError> {
        match self {
            Encoding::Base64 => decode_b(ew),
        }
    }

    pub fn encode<T: AsRef<[u8]>>(self, bstring: T) -> String {
        match self {
            Encoding::Base64 => encode_b(bstring),
        }
    }

    /// Exact length of the encoded form of `len` input bytes.
    pub fn encoded_len(self, len: usize) -> usize {
        match self {
            Encoding::Base64 => len_b(len),
        }
    }
}

/// A borrowed, validated encoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedWord<'a> {
    charset: &'a str,
    encoding: Encoding,
    payload: &'a str,
}

fn check_field(field: Field, value: &str) -> Result<(), FormatError> {
    if value.is_empty() {
        return Err(FormatError::EmptyField(field));
    }
    if value.contains(DELIMITER) {
        return Err(FormatError::DelimiterInField(field));
    }
    Ok(())
}

impl<'a> EncodedWord<'a> {
    /// Build a word from its parts.
    ///
    /// Neither `charset` nor `payload` may be empty or contain a '?', since
    /// the result could not be parsed back.
    pub fn new(
        charset: &'a str,
        encoding: Encoding,
        payload: &'a str,
    ) -> Result<Self, FormatError> {
        check_field(Field::Charset, charset)?;
        check_field(Field::Payload, payload)?;

        Ok(EncodedWord {
            charset,
            encoding,
            payload,
        })
    }

    /// Validate `ew` and split it into its parts.
    ///
    /// The checks run in a fixed order and the first one to fail decides the
    /// error: delimiter count, envelope, empty fields, then the cte tag.  A
    /// charset containing a '?' can not be told apart from a malformed word
    /// and fails the delimiter count.
    pub fn parse(ew: &'a str) -> Result<Self, Error> {
        let found = ew.matches(DELIMITER).count();
        if found != DELIMITER_COUNT {
            return Err(FormatError::DelimiterCount { found }.into());
        }

        if !ew.starts_with(PREFIX) || !ew.ends_with(SUFFIX) {
            return Err(FormatError::MissingEnvelope.into());
        }

        let fields: Vec<&'a str> = ew.split(DELIMITER).collect();
        let (charset, tag, payload) = match fields.as_slice() {
            [_, charset, tag, payload, _] => (*charset, *tag, *payload),
            _ => return Err(FormatError::DelimiterCount { found }.into()),
        };

        if charset.is_empty() {
            return Err(FormatError::EmptyField(Field::Charset).into());
        }
        if tag.is_empty() {
            return Err(FormatError::EmptyField(Field::Encoding).into());
        }
        if payload.is_empty() {
            return Err(FormatError::EmptyField(Field::Payload).into());
        }

        let encoding = Encoding::from_tag(tag)?;

        Ok(EncodedWord {
            charset,
            encoding,
            payload,
        })
    }

    pub fn charset(&self) -> &'a str {
        self.charset
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// Length of the serialized word.
    pub fn encoded_len(&self) -> usize {
        PREFIX.len() + self.charset.len() + 3 + self.payload.len() + SUFFIX.len()
    }

    /// Undo the cte, returning the payload bytes in the declared charset.
    pub fn decode_payload(&self) -> Result<Vec<u8>, ConversionError> {
        self.encoding.decode(self.payload)
    }
}

impl fmt::Display for EncodedWord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}{}{}",
            PREFIX,
            self.charset,
            DELIMITER,
            self.encoding.tag(),
            DELIMITER,
            self.payload,
            SUFFIX
        )
    }
}

/// Outcome of writing an encoded word into a bounded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    /// Bytes written into the destination.
    pub len: usize,
    /// Length of the complete encoded word.
    pub required: usize,
}

impl Written {
    pub fn is_truncated(&self) -> bool {
        self.len < self.required
    }
}

/// Encoder and decoder for ISO-2022-JP base64 encoded words.
///
/// Transcoding is delegated to a [`CharsetConverter`] and failures are
/// reported to an [`ErrorSink`], both chosen at construction.  By default
/// diagnostics go to the `log` facade and transcoding uses `encoding_rs`.
///
/// A codec holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct Codec<S = LogSink, C = EncodingConverter> {
    sink: S,
    converter: C,
}

impl Codec {
    pub fn new() -> Self {
        Codec {
            sink: LogSink,
            converter: EncodingConverter,
        }
    }
}

impl<S: ErrorSink, C: CharsetConverter> Codec<S, C> {
    pub fn with_sink<T: ErrorSink>(self, sink: T) -> Codec<T, C> {
        Codec {
            sink,
            converter: self.converter,
        }
    }

    pub fn with_converter<T: CharsetConverter>(self, converter: T) -> Codec<S, T> {
        Codec {
            sink: self.sink,
            converter,
        }
    }

    /// Encode `src`, given in `src_charset`, as an ISO-2022-JP base64
    /// encoded word.
    ///
    /// Fails with [`Error::Conversion`] if `src_charset` is unknown, `src`
    /// is not valid in it, or the text cannot be represented in ISO-2022-JP
    /// without substituting characters.  Empty input fails with
    /// [`Error::InvalidFormat`], since a word with an empty payload can not
    /// be decoded.
    pub fn encode<T: AsRef<[u8]>>(&self, src: T, src_charset: &str) -> Result<String, Error> {
        let src = src.as_ref();
        self.encode_word(src, src_charset).map_err(|err| {
            self.sink.report(&format!(
                "encode: {}. {}({})",
                err,
                String::from_utf8_lossy(src),
                src_charset
            ));
            err
        })
    }

    /// Like [`Codec::encode`], but writes into `dst`.
    ///
    /// A word longer than `dst` is truncated to fit; check
    /// [`Written::is_truncated`] before treating the bytes as a word.
    pub fn encode_into<T: AsRef<[u8]>>(
        &self,
        src: T,
        src_charset: &str,
        dst: &mut [u8],
    ) -> Result<Written, Error> {
        let word = self.encode(src, src_charset)?;
        let len = word.len().min(dst.len());
        dst[..len].copy_from_slice(&word.as_bytes()[..len]);

        Ok(Written {
            len,
            required: word.len(),
        })
    }

    /// Decode the encoded word `ew` into bytes in `dst_charset`.
    pub fn decode<T: AsRef<str>>(&self, ew: T, dst_charset: &str) -> Result<Vec<u8>, Error> {
        let ew = ew.as_ref();
        self.decode_word(ew, dst_charset)
            .map_err(|err| self.report_decode(err, ew))
    }

    /// Decode the encoded word `ew` into a `String`.
    pub fn decode_to_string<T: AsRef<str>>(&self, ew: T) -> Result<String, Error> {
        let ew = ew.as_ref();
        let decoded = self.decode(ew, "UTF-8")?;
        String::from_utf8(decoded).map_err(|_| {
            self.report_decode(ConversionError::Malformed { charset: "UTF-8" }.into(), ew)
        })
    }

    /// Like [`Codec::decode`], but writes into `dst` and returns the number
    /// of bytes written.
    ///
    /// Nothing is truncated: a `dst` shorter than the decoded text fails
    /// with [`ConversionError::BufferTooSmall`].
    pub fn decode_into<T: AsRef<str>>(
        &self,
        ew: T,
        dst_charset: &str,
        dst: &mut [u8],
    ) -> Result<usize, Error> {
        let ew = ew.as_ref();
        let decoded = self.decode(ew, dst_charset)?;
        if decoded.len() > dst.len() {
            let err = ConversionError::BufferTooSmall {
                needed: decoded.len(),
                capacity: dst.len(),
            };
            return Err(self.report_decode(err.into(), ew));
        }

        dst[..decoded.len()].copy_from_slice(&decoded);
        Ok(decoded.len())
    }

    fn encode_word(&self, src: &[u8], src_charset: &str) -> Result<String, Error> {
        let bstring = self
            .converter
            .convert(src_charset, src, INTERMEDIATE_CHARSET)?;

        let payload = Encoding::Base64.encode(&bstring);
        let word = EncodedWord::new(INTERMEDIATE_CHARSET, Encoding::Base64, &payload)?;
        Ok(word.to_string())
    }

    fn decode_word(&self, ew: &str, dst_charset: &str) -> Result<Vec<u8>, Error> {
        let word = EncodedWord::parse(ew)?;
        let bstring = word.decode_payload()?;
        let decoded = self
            .converter
            .convert(word.charset(), &bstring, dst_charset)?;
        Ok(decoded)
    }

    fn report_decode(&self, err: Error, ew: &str) -> Error {
        self.sink.report(&format!("decode: {}. {}", err, ew));
        err
    }
}

/// Encode `src` with a default [`Codec`].
pub fn encode<T: AsRef<[u8]>>(src: T, src_charset: &str) -> Result<String, Error> {
    Codec::new().encode(src, src_charset)
}

/// Decode `ew` with a default [`Codec`].
pub fn decode<T: AsRef<str>>(ew: T, dst_charset: &str) -> Result<Vec<u8>, Error> {
    Codec::new().decode(ew, dst_charset)
}
