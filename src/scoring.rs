//! Session scoring: four weighted subscores and tiered feedback.
//!
//! Scores are derived once per session from the validated reps and never
//! updated incrementally. Per-rep values that could not be measured are
//! left out of the relevant average.

use crate::biomechanics::symmetry_percent;
use crate::config::{BiomechanicsConfig, Config, ScoringConfig};
use crate::segmentation::Rep;
use crate::utils::{mean, statistics};
use crate::{Error, Result};
use log::info;
use serde::{Deserialize, Serialize};

/// The four weighted components of the total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subscores {
    pub depth: f64,
    pub symmetry: f64,
    pub valgus: f64,
    pub consistency: f64,
}

impl Subscores {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.depth + self.symmetry + self.valgus + self.consistency
    }
}

/// Scored aspect of the squat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Depth,
    Symmetry,
    Valgus,
    Consistency,
}

/// Qualitative band of the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLabel {
    Excellent,
    VeryGood,
    Good,
    Fair,
    NeedsImprovement,
}

impl QualityLabel {
    #[must_use]
    pub const fn from_score(total: u32) -> Self {
        if total > 85 {
            Self::Excellent
        } else if total > 75 {
            Self::VeryGood
        } else if total > 60 {
            Self::Good
        } else if total > 45 {
            Self::Fair
        } else {
            Self::NeedsImprovement
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl std::fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable coaching text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub depth: String,
    pub symmetry: String,
    pub valgus: String,
    pub consistency: String,
    pub summary: String,
    /// Subscore with the lowest share of its weight
    pub focus: Metric,
    pub improvement: String,
}

/// Session quality report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub total_score: u32,
    pub quality: QualityLabel,
    pub subscores: Subscores,
    pub avg_depth_angle: f64,
    /// `None` if no rep had a measurable left/right difference
    pub avg_symmetry_percent: Option<f64>,
    pub valgus_rep_count: usize,
    pub rep_count: usize,
    /// Inflated sample standard deviation of rep depths (degrees)
    pub depth_spread: f64,
    pub feedback: Feedback,
}

/// Computes the session report from validated reps
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    symmetry_decay: f64,
}

impl ScoringEngine {
    #[must_use]
    pub const fn new(config: ScoringConfig, biomechanics: &BiomechanicsConfig) -> Self {
        Self {
            config,
            symmetry_decay: biomechanics.symmetry_decay,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.scoring.clone(), &config.biomechanics)
    }

    /// Score a session
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoValidReps`] for an empty rep list
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn score(&self, reps: &[Rep]) -> Result<Report> {
        if reps.is_empty() {
            return Err(Error::NoValidReps);
        }
        let w = &self.config.weights;

        let depths: Vec<f64> = reps.iter().map(|r| r.depth_angle).filter(|d| d.is_finite()).collect();
        let depth_stats = statistics(&depths);
        let avg_depth_angle = depth_stats.map_or(self.config.standing_angle, |s| s.mean);

        let symmetry_diffs: Vec<f64> = reps.iter().filter_map(|r| r.symmetry).filter(|d| d.is_finite()).collect();
        let avg_symmetry_percent = mean(&symmetry_diffs).map(|d| symmetry_percent(d, self.symmetry_decay));

        let (valgus, valgus_rep_count) = self.valgus_score(reps);
        let depth_spread = depth_stats.map_or(0.0, |s| s.std_dev * self.config.spread_factor);

        let subscores = Subscores {
            depth: (self.depth_progress(avg_depth_angle) * w.depth).clamp(0.0, w.depth),
            symmetry: avg_symmetry_percent.map_or(0.0, |p| (p / 100.0 * w.symmetry).clamp(0.0, w.symmetry)),
            valgus,
            consistency: (self.consistency_progress(depth_spread) * w.consistency).clamp(0.0, w.consistency),
        };

        let total_score = subscores.sum().round().clamp(0.0, w.total().round()) as u32;
        let quality = QualityLabel::from_score(total_score);
        let feedback = self.feedback(
            &subscores,
            total_score,
            reps.len(),
            avg_depth_angle,
            avg_symmetry_percent,
            valgus_rep_count,
            depth_spread,
        );

        info!("Scored {} reps: {total_score} ({quality})", reps.len());

        Ok(Report {
            total_score,
            quality,
            subscores,
            avg_depth_angle,
            avg_symmetry_percent,
            valgus_rep_count,
            rep_count: reps.len(),
            depth_spread,
            feedback,
        })
    }

    /// Fraction of the depth weight earned at an average trough angle
    #[must_use]
    pub fn depth_progress(&self, avg_angle: f64) -> f64 {
        let c = &self.config;
        let base = if avg_angle >= c.standing_angle {
            0.0
        } else if avg_angle <= c.ideal_depth {
            1.0
        } else {
            ((c.standing_angle - avg_angle) / (c.standing_angle - c.ideal_depth)).sqrt()
        };
        let bonus = if avg_angle < c.ideal_depth {
            (c.ideal_depth - avg_angle.max(c.atg_depth)) / (c.ideal_depth - c.atg_depth) * c.depth_bonus
        } else {
            0.0
        };
        (base + bonus).min(1.0)
    }

    /// Valgus subscore and the number of faulty reps
    #[allow(clippy::cast_precision_loss)]
    fn valgus_score(&self, reps: &[Rep]) -> (f64, usize) {
        let c = &self.config;
        let weight = c.weights.valgus;
        let unit = weight / c.min_reps_for_averaging.max(reps.len()) as f64;

        let mut score = weight;
        let mut count = 0;
        for rep in reps {
            let deviation = rep.max_valgus();
            if !deviation.is_finite() || deviation <= c.valgus_threshold {
                continue;
            }
            count += 1;
            let multiplier = if deviation > c.severe_valgus {
                2.0
            } else if deviation > c.valgus_threshold * c.moderate_factor {
                c.moderate_factor
            } else {
                1.0
            };
            score -= unit * multiplier;
        }
        (score.clamp(0.0, weight), count)
    }

    /// Fraction of the consistency weight earned at a depth spread
    #[must_use]
    pub fn consistency_progress(&self, spread: f64) -> f64 {
        let c = &self.config;
        let progress = if spread <= c.excellent_std_dev {
            1.0
        } else if spread <= c.good_std_dev {
            0.2f64.mul_add((c.good_std_dev - spread) / (c.good_std_dev - c.excellent_std_dev), 0.8)
        } else if spread <= c.acceptable_std_dev {
            0.5f64.mul_add(
                (c.acceptable_std_dev - spread) / (c.acceptable_std_dev - c.good_std_dev),
                0.3,
            )
        } else {
            0.3 * (-0.1 * (spread - c.acceptable_std_dev)).exp()
        };
        progress.clamp(0.0, 1.0)
    }

    #[allow(clippy::too_many_arguments)]
    fn feedback(
        &self,
        subscores: &Subscores,
        total: u32,
        rep_count: usize,
        avg_depth: f64,
        avg_symmetry_percent: Option<f64>,
        valgus_count: usize,
        spread: f64,
    ) -> Feedback {
        let w = &self.config.weights;
        let tier = |score: f64, weight: f64| score / weight;

        let depth = match tier(subscores.depth, w.depth) {
            t if t > 0.9 => format!(
                "Fantastic depth: an average knee angle of {avg_depth:.0}° shows a full range of motion."
            ),
            t if t > 0.65 => format!(
                "Good depth at {avg_depth:.0}° on average. Sink the hips a little lower to reach parallel (90°)."
            ),
            _ => format!(
                "Depth is shallow at {avg_depth:.0}°. Work on mobility and control until your thighs reach parallel."
            ),
        };

        let symmetry = match avg_symmetry_percent {
            None => "Left/right balance could not be measured; keep both legs clearly in view.".to_string(),
            Some(pct) => match tier(subscores.symmetry, w.symmetry) {
                t if t > 0.9 => format!("Excellent balance at {pct:.0}% symmetry. Your weight is evenly distributed."),
                t if t > 0.65 => format!(
                    "Good symmetry ({pct:.0}%) with a slight imbalance. Drive through both feet equally on the way up."
                ),
                _ => format!(
                    "Significant imbalance detected ({pct:.0}%). You may be favoring one side; rebuild with unloaded squats."
                ),
            },
        };

        let valgus = if valgus_count == 0 {
            format!("Stable knees: they tracked over your feet on all {rep_count} reps.")
        } else if valgus_count <= 2 && rep_count > 5 {
            format!(
                "Good stability. Your knees caved in on {valgus_count} rep{}, often a sign of fatigue. Push the knees out.",
                if valgus_count > 1 { "s" } else { "" }
            )
        } else {
            format!(
                "Your knees caved inward on {valgus_count} of {rep_count} reps. Strengthen your glutes and push the knees out."
            )
        };

        let consistency = match tier(subscores.consistency, w.consistency) {
            t if t > 0.9 => format!("Very consistent: depth varied by only {spread:.1}° between reps."),
            t if t > 0.65 => format!("Good consistency with {spread:.1}° of variation. Keep the same tempo and depth cue."),
            _ => format!("Depth varied by {spread:.1}°. Use a steady tempo and a fixed depth target for every rep."),
        };

        let summary = if total > 85 {
            format!("An excellent set of {rep_count} reps with solid control and technique throughout.")
        } else if total > 60 {
            format!("A solid set of {rep_count} reps. A few focused changes will raise your score and lower injury risk.")
        } else {
            format!("These {rep_count} reps are a starting point. The areas below will build a stronger, safer squat.")
        };

        let shares = [
            (Metric::Depth, tier(subscores.depth, w.depth)),
            (Metric::Symmetry, tier(subscores.symmetry, w.symmetry)),
            (Metric::Valgus, tier(subscores.valgus, w.valgus)),
            (Metric::Consistency, tier(subscores.consistency, w.consistency)),
        ];
        let focus = shares
            .iter()
            .fold(shares[0], |lowest, &item| if item.1 < lowest.1 { item } else { lowest })
            .0;

        let improvement = match focus {
            Metric::Depth => "Biggest opportunity: depth. Add ankle and hip mobility work and lower until the hips are level with the knees.",
            Metric::Symmetry => "Top priority: symmetry. Spread pressure across big toe, little toe and heel of both feet.",
            Metric::Valgus => "Focus on knee stability. Strengthen the glutes with banded side walks and push the knees out throughout the squat.",
            Metric::Consistency => "Make every rep look the same. Count a steady tempo down and up to standardize the movement.",
        }
        .to_string();

        Feedback {
            depth,
            symmetry,
            valgus,
            consistency,
            summary,
            focus,
            improvement,
        }
    }
}

/// Convenience wrapper: score with a full configuration
///
/// # Errors
///
/// Returns [`Error::NoValidReps`] for an empty rep list
pub fn score_session(reps: &[Rep], config: &Config) -> Result<Report> {
    ScoringEngine::from_config(config).score(reps)
}
