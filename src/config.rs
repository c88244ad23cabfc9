// Validated HeidelTime processing options
// WHY: every enumerated value is checked here so a bad option never reaches the JVM

use crate::error::{HeidelTimeError, Result};
use crate::reconcile::MissPolicy;
use regex_automata::meta::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

/// Defines a closed set of upper-case HeidelTime option values with
/// case-insensitive parsing and serde support.
macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($(#[$vmeta:meta])* $variant:ident => $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Value as passed on the HeidelTime command line
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = HeidelTimeError;

            fn from_str(s: &str) -> Result<Self> {
                let upper = s.trim().to_ascii_uppercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == upper)
                    .ok_or_else(|| {
                        let supported: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        HeidelTimeError::configuration(format!(
                            "unknown {} {:?}; supported: {}",
                            $what,
                            s,
                            supported.join(", ")
                        ))
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = HeidelTimeError;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.as_str().to_string()
            }
        }
    };
}

option_enum! {
    /// Languages HeidelTime-standalone ships resources for
    Language, "language" {
        English => "ENGLISH",
        German => "GERMAN",
        Dutch => "DUTCH",
        /// English colloquial, pairs with `COLLOQUIAL` documents
        EnglishColl => "ENGLISHCOLL",
        /// English scientific, pairs with `SCIENTIFIC` documents
        EnglishSci => "ENGLISHSCI",
        Spanish => "SPANISH",
        Italian => "ITALIAN",
        Arabic => "ARABIC",
        Vietnamese => "VIETNAMESE",
        French => "FRENCH",
        Chinese => "CHINESE",
        Russian => "RUSSIAN",
        Croatian => "CROATIAN",
        Portuguese => "PORTUGUESE",
        Estonian => "ESTONIAN",
    }
}

option_enum! {
    /// Document genre, selects HeidelTime's normalization strategy
    DocumentType, "document type" {
        Narratives => "NARRATIVES",
        News => "NEWS",
        Colloquial => "COLLOQUIAL",
        Scientific => "SCIENTIFIC",
    }
}

option_enum! {
    /// Result format; `JSON` runs HeidelTime in TimeML mode and reconciles the markup into records
    OutputFormat, "output format" {
        Xmi => "XMI",
        TimeMl => "TIMEML",
        Json => "JSON",
    }
}

impl OutputFormat {
    /// Format HeidelTime itself is asked for
    pub fn engine_format(&self) -> OutputFormat {
        match self {
            OutputFormat::Json => OutputFormat::TimeMl,
            other => *other,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Narratives
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::TimeMl
    }
}

/// Document creation time in `YYYY-MM-DD` form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentTime(String);

fn dct_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("document time pattern is valid")
    })
}

impl DocumentTime {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DocumentTime {
    type Err = HeidelTimeError;

    fn from_str(s: &str) -> Result<Self> {
        if !dct_pattern().is_match(s) {
            return Err(HeidelTimeError::configuration(format!(
                "incorrect document time {s:?}; use the \"YYYY-MM-DD\" format"
            )));
        }
        Ok(DocumentTime(s.to_string()))
    }
}

impl TryFrom<String> for DocumentTime {
    type Error = HeidelTimeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DocumentTime> for String {
    fn from(value: DocumentTime) -> String {
        value.0
    }
}

impl fmt::Display for DocumentTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text encoding label passed to HeidelTime and used for its input and output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextEncoding {
    label: String,
    encoding: &'static encoding_rs::Encoding,
}

impl TextEncoding {
    /// Label as given by the caller, e.g. `UTF-8`
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        self.encoding
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let (bytes, used, unmappable) = self.encoding.encode(text);
        if used != self.encoding {
            // encoding_rs only encodes to ASCII-compatible encodings (not UTF-16)
            return Err(HeidelTimeError::configuration(format!(
                "documents cannot be written as {}",
                self.label
            )));
        }
        if unmappable {
            return Err(HeidelTimeError::configuration(format!(
                "document contains characters not representable in {}",
                self.label
            )));
        }
        Ok(bytes.into_owned())
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let (text, malformed) = self.encoding.decode_without_bom_handling(bytes);
        if malformed {
            return Err(HeidelTimeError::external_tool(format!(
                "HeidelTime output is not valid {}",
                self.label
            )));
        }
        Ok(text.into_owned())
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self {
            label: "UTF-8".to_string(),
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl FromStr for TextEncoding {
    type Err = HeidelTimeError;

    fn from_str(s: &str) -> Result<Self> {
        let encoding = encoding_rs::Encoding::for_label(s.trim().as_bytes())
            .ok_or_else(|| HeidelTimeError::configuration(format!("unknown encoding {s:?}")))?;
        Ok(Self {
            label: s.trim().to_string(),
            encoding,
        })
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = HeidelTimeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(value: TextEncoding) -> String {
        value.label
    }
}

/// HeidelTime processing options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationOptions {
    pub language: Language,
    pub document_type: DocumentType,
    pub output: OutputFormat,
    /// Only used by HeidelTime for `NEWS` and `COLLOQUIAL` documents
    pub document_time: Option<DocumentTime>,
    pub encoding: TextEncoding,
    /// Defaults to `config.props` in the HeidelTime directory
    pub config_file: Option<PathBuf>,
    pub locale: Option<String>,
    pub pos_tagger: Option<String>,
    pub verbose: bool,
    pub interval_tagger: bool,
    /// Kill HeidelTime if it runs longer than this
    #[serde(with = "optional_secs")]
    pub timeout: Option<Duration>,
    /// Applied when reconciling `JSON` output
    pub miss_policy: MissPolicy,
}

impl AnnotationOptions {
    /// Load options from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        self.language = language.parse()?;
        Ok(())
    }

    pub fn set_document_type(&mut self, document_type: &str) -> Result<()> {
        self.document_type = document_type.parse()?;
        Ok(())
    }

    pub fn set_output(&mut self, output: &str) -> Result<()> {
        self.output = output.parse()?;
        Ok(())
    }

    pub fn set_document_time(&mut self, document_time: &str) -> Result<()> {
        self.document_time = Some(document_time.parse()?);
        Ok(())
    }

    pub fn set_encoding(&mut self, encoding: &str) -> Result<()> {
        self.encoding = encoding.parse()?;
        Ok(())
    }
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<f64>::deserialize(deserializer)?;
        match secs {
            Some(s) if s.is_finite() && s > 0.0 => Ok(Some(Duration::from_secs_f64(s))),
            Some(s) => Err(serde::de::Error::custom(format!("invalid timeout {s}"))),
            None => Ok(None),
        }
    }
}
