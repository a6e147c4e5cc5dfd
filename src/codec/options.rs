//! Codec configuration.

/// Default bound on nested lists and compounds.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Text encoding used for names and `TAG_String` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringEncoding {
    /// Java's modified UTF-8: NUL as `C0 80`, supplementary characters as
    /// surrogate pairs. Matches the bytes written by existing producers.
    #[default]
    ModifiedUtf8,
    /// Standard UTF-8.
    Utf8,
}

/// Options for a single read or write call.
#[derive(Debug, Clone)]
pub struct CodecOptions {
    max_depth: usize,
    string_encoding: StringEncoding,
}

impl CodecOptions {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            string_encoding: StringEncoding::default(),
        }
    }

    /// Sets the maximum nesting depth of lists and compounds.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the string encoding.
    pub fn string_encoding(mut self, encoding: StringEncoding) -> Self {
        self.string_encoding = encoding;
        self
    }

    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }

    pub fn encoding(&self) -> StringEncoding {
        self.string_encoding
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::new()
    }
}
