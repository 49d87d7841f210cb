use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "3/10", "(3/10)", "[3/10]"
    static ref FRACTION_RE: Regex =
        Regex::new(r"[\(\[]?(?P<current>\d+)\s*/\s*(?P<total>\d+)[\)\]]?").unwrap();

    // "45%", "45.5%", "45 %"
    static ref PERCENT_RE: Regex = Regex::new(r"(?P<current>\d+(?:\.\d+)?)\s*%").unwrap();
}

const PERCENT_TOTAL: f64 = 100.0;

/// progress value extracted from a single log line
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub current: f64,
    pub total: f64,
    /// text preceding the progress figure, e.g. "downloading" in "downloading 3/10"
    pub label: String,
    /// written as `current/total` rather than as a percentage
    pub fraction: bool,
}

impl ProgressUpdate {
    pub fn new(current: f64, total: f64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
            fraction: false,
        }
    }

    pub fn with_fraction(mut self, fraction: bool) -> Self {
        self.fraction = fraction;
        self
    }

    /// completion in percent, clamped to 0..=100
    pub fn percentage(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        (self.current * 100.0 / self.total).clamp(0.0, 100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.percentage() >= 100.0
    }
}

/// one recognised progress notation
///
/// The regex must contain a `current` named group. A `total` group is optional;
/// when it is missing, `default_total` is used instead (100 for percentages).
#[derive(Debug, Clone)]
pub struct ProgressPattern {
    regex: Regex,
    default_total: f64,
}

impl ProgressPattern {
    pub fn new(pattern: &str, default_total: f64) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            default_total,
        })
    }

    /// `current/total`, optionally wrapped in `()` or `[]`
    pub fn fraction() -> Self {
        Self {
            regex: FRACTION_RE.clone(),
            default_total: PERCENT_TOTAL,
        }
    }

    /// `NN%` or `NN.N%`
    pub fn percentage() -> Self {
        Self {
            regex: PERCENT_RE.clone(),
            default_total: PERCENT_TOTAL,
        }
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// returns the first acceptable match in `text`
    ///
    /// A match is acceptable when `total > 0` and `0 <= current <= total`, which
    /// keeps dates such as `2024/01` from being read as progress.
    pub fn extract(&self, text: &str) -> Option<ProgressUpdate> {
        for caps in self.regex.captures_iter(text) {
            let Some(current) = caps
                .name("current")
                .and_then(|m| m.as_str().trim().parse::<f64>().ok())
            else {
                continue;
            };

            let total_group = caps.name("total");
            let total = match total_group {
                Some(m) => match m.as_str().trim().parse::<f64>() {
                    Ok(total) => total,
                    Err(_) => continue,
                },
                None => self.default_total,
            };

            if total <= 0.0 || current < 0.0 || current > total {
                continue;
            }

            let start = caps.get(0).map_or(0, |m| m.start());
            return Some(
                ProgressUpdate::new(current, total, make_label(&text[..start]))
                    .with_fraction(total_group.is_some()),
            );
        }

        None
    }
}

/// default notations, fraction first so "(3/10) 30%" keeps its counts
pub fn default_patterns() -> Vec<ProgressPattern> {
    vec![ProgressPattern::fraction(), ProgressPattern::percentage()]
}

/// runs the patterns in order and returns the first hit
pub fn extract_progress(patterns: &[ProgressPattern], text: &str) -> Option<ProgressUpdate> {
    patterns.iter().find_map(|pattern| pattern.extract(text))
}

fn make_label(prefix: &str) -> String {
    prefix
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '(' | '['))
        .trim_start()
        .to_string()
}
