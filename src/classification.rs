use std::fmt;

/// Scores strictly above this value are positive.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Probability in [0, 1] that the photo shows Hermine, as produced by the model.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ClassificationScore(f32);

impl ClassificationScore {
    /// Values outside [0, 1] are clamped; the model ends in a sigmoid so this
    /// only absorbs rounding noise.
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub const fn value(self) -> f32 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > DECISION_THRESHOLD
    }

    pub fn verdict(self) -> Verdict {
        if self.is_positive() {
            Verdict::Positive
        } else {
            Verdict::Negative
        }
    }

    /// Probability of the predicted class.
    pub fn confidence(self) -> f32 {
        if self.is_positive() {
            self.0
        } else {
            1.0 - self.0
        }
    }

    /// Confidence as a percentage with one decimal, e.g. `87.3%`.
    pub fn confidence_percent(self) -> String {
        format!("{:.1}%", f64::from(self.confidence()) * 100.0)
    }
}

impl fmt::Display for ClassificationScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Positive,
    Negative,
}

impl Verdict {
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Self::Positive => "It's Hermine!",
            Self::Negative => "Not Hermine",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
