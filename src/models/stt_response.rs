use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Root of a stored STT service response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SttResponse {
    #[serde(default)]
    pub output: Option<SttOutput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SttOutput {
    #[serde(default)]
    pub predicted_words: Option<Vec<PredictedWord>>,
}

/// A single recognized word
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictedWord {
    /// The recognized text; the service emits `" "` entries between words
    #[serde(default, deserialize_with = "string_or_none")]
    pub word: Option<String>,
    /// `[start_ms, end_ms]` when the service reports timing
    #[serde(default, deserialize_with = "numbers_or_none")]
    pub timestamp: Option<Vec<f64>>,
}

/// A `word` that is not a string counts as absent
fn string_or_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(word) => Some(word),
        Value::Null => None,
        other => {
            debug!("Ignoring non-string word: {}", other);
            None
        }
    })
}

/// A `timestamp` that is not an array of numbers counts as absent
fn numbers_or_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<f64>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let numbers = value
        .as_array()
        .and_then(|items| items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>());
    if numbers.is_none() && !value.is_null() {
        debug!("Ignoring malformed timestamp: {}", value);
    }
    Ok(numbers)
}

impl PredictedWord {
    /// Text of this word if it carries anything besides whitespace
    pub fn text(&self) -> Option<&str> {
        self.word.as_deref().filter(|w| !w.trim().is_empty())
    }

    /// Start and end in milliseconds, when a well-formed pair is present
    pub fn span_ms(&self) -> Option<(u64, u64)> {
        match self.timestamp.as_deref() {
            Some([start, end]) if *start >= 0.0 && end >= start => {
                Some((*start as u64, *end as u64))
            }
            _ => None,
        }
    }
}

impl SttResponse {
    /// Predicted words at `output.predicted_words`, if that path exists
    pub fn predicted_words(&self) -> Option<&[PredictedWord]> {
        self.output
            .as_ref()
            .and_then(|o| o.predicted_words.as_deref())
    }

    /// Audio span covered by the timed words, in milliseconds
    pub fn covered_ms(&self) -> Option<u64> {
        let spans = self.predicted_words()?.iter().filter_map(PredictedWord::span_ms);
        let (first, last) = spans.fold(None, |acc: Option<(u64, u64)>, (s, e)| match acc {
            Some((lo, hi)) => Some((lo.min(s), hi.max(e))),
            None => Some((s, e)),
        })?;
        Some(last - first)
    }
}
