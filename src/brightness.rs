//! Brightness control model: decaying manual corrections over a solar baseline.
//!
//! This module holds the algorithmic heart of brightr. A [`BrightnessModel`]
//! blends an astronomically-derived baseline brightness with one manual
//! correction that exponentially decays back toward zero. The model exposes
//! two readings:
//!
//! - **perceived** brightness: baseline + offset, kept within
//!   `[0, max_perceived]` by clamping at mutation time
//! - **absolute** brightness: perceived squared, the physical backlight power
//!   (perception of luminance is roughly the square root of emitted power)
//!
//! Clamping never happens on read. Every mutator ends by re-anchoring the
//! offset so the stored value already reflects the clamp; between events the
//! offset decays freely and the combined value stays in bounds because the
//! last mutation put it there and the baseline shares the same bounds.
//!
//! All methods take an explicit `now` so the model stays a pure function of
//! its inputs and tests never sleep. Timestamps are expected to be
//! non-decreasing, but a backward step (wall clocks do that) only freezes the
//! decay at the anchored magnitude.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

/// A scalar that exponentially relaxes toward zero with a configurable half-life.
///
/// Reading computes the decayed value from elapsed time; there is no
/// background timer. Writing resets both the magnitude and the anchor
/// instant, discarding decay history - any compounding with the
/// previously-decayed value must be computed by the caller first.
#[derive(Debug, Clone)]
pub struct DecayingValue {
    magnitude: f64,
    half_life: Duration,
    anchor: DateTime<Utc>,
}

impl DecayingValue {
    /// Create a new decaying value anchored at `now`.
    ///
    /// Fails if `half_life` is not strictly positive; everything downstream
    /// divides by it.
    pub fn new(magnitude: f64, half_life: Duration, now: DateTime<Utc>) -> Result<Self> {
        if half_life <= Duration::zero() {
            anyhow::bail!(
                "Half-life must be positive (got {} ms)",
                half_life.num_milliseconds()
            );
        }
        Ok(Self {
            magnitude,
            half_life,
            anchor: now,
        })
    }

    /// Read the decayed value at `now`.
    ///
    /// Returns `magnitude * 2^(-(now - anchor) / half_life)`. The decay
    /// factor lies in `(0, 1]`, so the result is sign-preserving, never
    /// overshoots zero, and equals the written magnitude exactly at zero
    /// elapsed time. Elapsed time is floored at zero: a wall clock stepped
    /// backwards (NTP) reads the anchored magnitude, never an amplified one.
    pub fn read(&self, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = (now - self.anchor).num_milliseconds().max(0) as f64;
        let half_life_ms = self.half_life.num_milliseconds() as f64;
        self.magnitude * (-std::f64::consts::LN_2 * elapsed_ms / half_life_ms).exp()
    }

    /// Overwrite the magnitude and re-anchor at `now`.
    pub fn write(&mut self, magnitude: f64, now: DateTime<Utc>) {
        self.magnitude = magnitude;
        self.anchor = now;
    }
}

/// Direction of a manual brightness adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpDirection {
    Up,
    Down,
}

/// Mapping from solar elevation to baseline perceived brightness.
///
/// Both curves are monotonically increasing in elevation above the horizon
/// and bounded in `[0, 1]`. Which one to use is a configuration policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineCurve {
    /// `max(sin θ, 0)`: zero at and below the horizon, continuous there.
    NonnegativeSine,
    /// `exp(2·sin θ − 2)`: never reaches zero, leaving a dim floor at night.
    ExpSine,
}

impl BaselineCurve {
    /// Parse a curve name from configuration.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nonnegative_sine" => Some(Self::NonnegativeSine),
            "exp_sine" => Some(Self::ExpSine),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonnegativeSine => "nonnegative_sine",
            Self::ExpSine => "exp_sine",
        }
    }

    /// Baseline perceived brightness for a solar elevation given in degrees.
    pub fn baseline(&self, elevation_degrees: f64) -> f64 {
        let theta = elevation_degrees.to_radians();
        match self {
            Self::NonnegativeSine => theta.sin().max(0.0),
            Self::ExpSine => (2.0 * theta.sin() - 2.0).exp(),
        }
    }
}

/// Tunable parameters for a [`BrightnessModel`].
#[derive(Debug, Clone)]
pub struct ModelParams {
    /// Multiplicative step per keypress, e.g. 0.2 for 20%.
    pub step: f64,
    /// Floor on the perceived change of a single bump, e.g. 0.01.
    pub minimum_step: f64,
    /// Half-life of the manual correction.
    pub half_life: Duration,
    /// Elevation-to-baseline mapping policy.
    pub curve: BaselineCurve,
    /// Perceived brightness to use while an external display is connected.
    /// `None` disables the docked override.
    pub docked_override: Option<f64>,
    /// How many Up presses are allowed to push perceived brightness past 1.0.
    pub max_overdrive_presses: u32,
}

/// Owns the baseline brightness and the decaying manual correction.
///
/// One instance per process run. The baseline is overwritten on every
/// [`tick`](Self::tick); the offset persists and decays across ticks and
/// bumps. The model is mutated only from the main loop, so it needs no
/// interior locking.
#[derive(Debug)]
pub struct BrightnessModel {
    baseline: f64,
    offset: DecayingValue,
    step: f64,
    minimum_step: f64,
    max_perceived: f64,
    curve: BaselineCurve,
    docked_override: Option<f64>,
}

impl BrightnessModel {
    /// Create a model with a zero baseline and a zero correction.
    ///
    /// The ceiling on perceived brightness is `(1 + step)^max_overdrive_presses`,
    /// so with overdrive disabled it is exactly 1.0.
    pub fn new(params: &ModelParams, now: DateTime<Utc>) -> Result<Self> {
        if params.step <= 0.0 {
            anyhow::bail!("Step size must be positive (got {})", params.step);
        }
        if params.minimum_step <= 0.0 {
            anyhow::bail!(
                "Minimum step must be positive (got {})",
                params.minimum_step
            );
        }
        let max_perceived = (1.0 + params.step).powi(params.max_overdrive_presses as i32);
        Ok(Self {
            baseline: 0.0,
            offset: DecayingValue::new(0.0, params.half_life, now)?,
            step: params.step,
            minimum_step: params.minimum_step,
            max_perceived,
            curve: params.curve,
            docked_override: params.docked_override,
        })
    }

    /// Perceived brightness at `now`: baseline plus the decayed correction.
    ///
    /// Not reclamped here; the last mutation already enforced the bounds.
    pub fn perceived(&self, now: DateTime<Utc>) -> f64 {
        self.baseline + self.offset.read(now)
    }

    /// Physical backlight power at `now`, in `[0, max_perceived²]`.
    pub fn absolute(&self, now: DateTime<Utc>) -> f64 {
        let p = self.perceived(now);
        p * p
    }

    /// Upper bound on perceived brightness.
    pub fn max_perceived(&self) -> f64 {
        self.max_perceived
    }

    /// Re-base the model against the current solar elevation.
    ///
    /// While an external display is connected and a docked override is
    /// configured, the override replaces the solar baseline before the clamp
    /// runs. The offset keeps decaying from its last anchor either way.
    pub fn tick(&mut self, now: DateTime<Utc>, elevation_degrees: f64, external_display: bool) {
        self.baseline = match (external_display, self.docked_override) {
            (true, Some(docked)) => docked,
            _ => self.curve.baseline(elevation_degrees),
        };
        self.normalize(now);
    }

    /// Apply one manual step adjustment.
    ///
    /// The target is multiplicative in perceived brightness; when the
    /// multiplicative change would be smaller than `minimum_step` (near zero
    /// brightness), an additive `minimum_step` is forced instead so every
    /// keypress has a visible effect. The clamp in `normalize` absorbs
    /// overshoot at both ends.
    pub fn bump(&mut self, direction: BumpDirection, now: DateTime<Utc>) {
        let perceived = self.perceived(now);
        let mut target = match direction {
            BumpDirection::Up => perceived * (1.0 + self.step),
            BumpDirection::Down => perceived / (1.0 + self.step),
        };
        if (target - perceived).abs() < self.minimum_step {
            target = match direction {
                BumpDirection::Up => perceived + self.minimum_step,
                BumpDirection::Down => perceived - self.minimum_step,
            };
        }
        self.offset.write(target - self.baseline, now);
        self.normalize(now);
    }

    /// Clamp perceived brightness into bounds and re-anchor the offset.
    ///
    /// Storing the clamped offset (rather than clamping on read) is what
    /// keeps the displayed value in bounds between events while letting the
    /// unclamped trajectory decay naturally.
    fn normalize(&mut self, now: DateTime<Utc>) {
        let clamped = self.perceived(now).clamp(0.0, self.max_perceived);
        self.offset.write(clamped - self.baseline, now);
    }
}
