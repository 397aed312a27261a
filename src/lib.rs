mod charset;
mod convert;
mod encoded_words;
mod error;
mod sink;

pub use self::charset::Charset;
pub use self::convert::{CharsetConverter, EncodingConverter};
pub use self::encoded_words::*;
pub use self::error::{ConversionError, Error, ErrorKind, Field, FormatError};
pub use self::sink::{ErrorSink, LogSink, NullSink};
