use std::collections::VecDeque;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::SubmitError;
use crate::signature::SignatureData;

pub const HISTORY_LIMIT: usize = 5;
pub const DEFAULT_THRESHOLD: u8 = 85;

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerificationMode {
    #[default]
    Dynamic,
    Static,
    Hybrid,
}

impl VerificationMode {
    pub fn next(self) -> Self {
        match self {
            VerificationMode::Dynamic => VerificationMode::Static,
            VerificationMode::Static => VerificationMode::Hybrid,
            VerificationMode::Hybrid => VerificationMode::Dynamic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub success: bool,
    /// 0..=100
    pub match_score: u8,
}

/// The opaque verification collaborator.
pub trait Scorer {
    fn score(&mut self, signature: &SignatureData, mode: VerificationMode, threshold: u8) -> Score;
}

impl<T: Scorer + ?Sized> Scorer for Box<T> {
    fn score(&mut self, signature: &SignatureData, mode: VerificationMode, threshold: u8) -> Score {
        (**self).score(signature, mode, threshold)
    }
}

/// Stand-in scorer: a uniform match score in 70..95, pass when it reaches the threshold.
#[derive(Debug)]
pub struct RandomScorer {
    rng: StdRng,
}

impl RandomScorer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for RandomScorer {
    fn score(&mut self, _signature: &SignatureData, _mode: VerificationMode, threshold: u8) -> Score {
        let match_score = self.rng.gen_range(70..95);
        Score {
            success: match_score >= threshold,
            match_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub success: bool,
    pub match_score: u8,
    pub threshold: u8,
    pub mode: VerificationMode,
}

impl VerificationResult {
    pub fn message(&self) -> &'static str {
        if self.success {
            "Signature verified"
        } else {
            "Signature rejected"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RecordResult {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRecord {
    pub timestamp: String,
    pub result: RecordResult,
}

/// Most recent verifications, newest first, never more than `HISTORY_LIMIT`.
#[derive(Debug, Default)]
pub struct VerificationHistory {
    entries: VecDeque<VerificationRecord>,
}

impl VerificationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, success: bool, at: DateTime<Local>) {
        self.entries.push_front(VerificationRecord {
            timestamp: at.format("%Y-%m-%d %H:%M").to_string(),
            result: if success {
                RecordResult::Success
            } else {
                RecordResult::Failed
            },
        });
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> impl Iterator<Item = &VerificationRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug)]
struct PendingVerification {
    signature: SignatureData,
    mode: VerificationMode,
    threshold: u8,
    due_at: u64,
}

/// Runs submissions through a scorer after a short delay and keeps the history.
pub struct Verifier<S: Scorer> {
    scorer: S,
    delay_ms: u64,
    pending: Option<PendingVerification>,
    history: VerificationHistory,
}

impl<S: Scorer> Verifier<S> {
    pub fn new(scorer: S, delay_ms: u64) -> Self {
        Self {
            scorer,
            delay_ms,
            pending: None,
            history: VerificationHistory::new(),
        }
    }

    /// Queue a frozen signature for scoring. The result arrives from `poll` once the
    /// delay has passed.
    pub fn submit(
        &mut self,
        signature: SignatureData,
        mode: VerificationMode,
        threshold: u8,
        now_ms: u64,
    ) -> Result<(), SubmitError> {
        if signature.is_empty() {
            warn!("verification requested without a signature");
            return Err(SubmitError::EmptySignature);
        }
        if self.pending.is_some() {
            return Err(SubmitError::Busy);
        }

        self.pending = Some(PendingVerification {
            signature,
            mode,
            threshold: threshold.min(100),
            due_at: now_ms + self.delay_ms,
        });
        Ok(())
    }

    pub fn poll(&mut self, now_ms: u64) -> Option<VerificationResult> {
        if self.pending.as_ref()?.due_at > now_ms {
            return None;
        }
        let pending = self.pending.take()?;

        let score = self
            .scorer
            .score(&pending.signature, pending.mode, pending.threshold);
        let result = VerificationResult {
            success: score.success,
            match_score: score.match_score,
            threshold: pending.threshold,
            mode: pending.mode,
        };

        info!(
            "verification {} ({}%, threshold {}%, {} mode)",
            if result.success { "passed" } else { "failed" },
            result.match_score,
            result.threshold,
            result.mode
        );
        self.history.record(result.success, Local::now());
        Some(result)
    }

    /// Drop a verification that has not reported yet.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_verifying(&self) -> bool {
        self.pending.is_some()
    }

    pub fn history(&self) -> &VerificationHistory {
        &self.history
    }
}
