//! Closed-form function sampling for the static plotter.
//!
//! A plotted function is `y = a * g(b * x)` for a built-in `g`; the overlay
//! is the analytic derivative `a * b * g'(b * x)`.

use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SamplerError {
    #[error("domain bounds must be finite, got [{start}, {end}]")]
    NonFinite { start: f64, end: f64 },

    #[error("domain start {start} must be below end {end}")]
    EmptyDomain { start: f64, end: f64 },

    #[error("need at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("unknown function {0:?}")]
    UnknownFunction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Sine,
    Cosine,
    Tangent,
    Quadratic,
    Cubic,
    Exponential,
    NaturalLog,
    Gaussian,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 8] = [
        FunctionKind::Sine,
        FunctionKind::Cosine,
        FunctionKind::Tangent,
        FunctionKind::Quadratic,
        FunctionKind::Cubic,
        FunctionKind::Exponential,
        FunctionKind::NaturalLog,
        FunctionKind::Gaussian,
    ];

    pub fn from_name(name: &str) -> Result<Self, SamplerError> {
        match name.trim().to_lowercase().as_str() {
            "sin" | "sine" => Ok(FunctionKind::Sine),
            "cos" | "cosine" => Ok(FunctionKind::Cosine),
            "tan" | "tangent" => Ok(FunctionKind::Tangent),
            "x2" | "quadratic" => Ok(FunctionKind::Quadratic),
            "x3" | "cubic" => Ok(FunctionKind::Cubic),
            "exp" | "exponential" => Ok(FunctionKind::Exponential),
            "ln" | "log" => Ok(FunctionKind::NaturalLog),
            "gauss" | "gaussian" => Ok(FunctionKind::Gaussian),
            other => Err(SamplerError::UnknownFunction(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FunctionKind::Sine => "sin(x)",
            FunctionKind::Cosine => "cos(x)",
            FunctionKind::Tangent => "tan(x)",
            FunctionKind::Quadratic => "x^2",
            FunctionKind::Cubic => "x^3",
            FunctionKind::Exponential => "e^x",
            FunctionKind::NaturalLog => "ln(x)",
            FunctionKind::Gaussian => "e^(-x^2)",
        }
    }

    /// `g(u)`; `None` outside the real domain.
    fn value(&self, u: f64) -> Option<f64> {
        let y = match self {
            FunctionKind::Sine => u.sin(),
            FunctionKind::Cosine => u.cos(),
            FunctionKind::Tangent => {
                if u.cos().abs() < 1e-9 {
                    return None;
                }
                u.tan()
            }
            FunctionKind::Quadratic => u * u,
            FunctionKind::Cubic => u * u * u,
            FunctionKind::Exponential => u.exp(),
            FunctionKind::NaturalLog => {
                if u <= 0.0 {
                    return None;
                }
                u.ln()
            }
            FunctionKind::Gaussian => (-u * u).exp(),
        };
        finite(y)
    }

    /// `g'(u)`; `None` wherever `g` is undefined.
    fn derivative(&self, u: f64) -> Option<f64> {
        self.value(u)?;
        let dy = match self {
            FunctionKind::Sine => u.cos(),
            FunctionKind::Cosine => -u.sin(),
            FunctionKind::Tangent => 1.0 / (u.cos() * u.cos()),
            FunctionKind::Quadratic => 2.0 * u,
            FunctionKind::Cubic => 3.0 * u * u,
            FunctionKind::Exponential => u.exp(),
            FunctionKind::NaturalLog => 1.0 / u,
            FunctionKind::Gaussian => -2.0 * u * (-u * u).exp(),
        };
        finite(dy)
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotFunction {
    pub kind: FunctionKind,
    pub amplitude: f64,
    pub frequency: f64,
}

impl PlotFunction {
    pub fn new(kind: FunctionKind) -> Self {
        Self {
            kind,
            amplitude: 1.0,
            frequency: 1.0,
        }
    }

    pub fn eval(&self, x: f64) -> Option<f64> {
        finite(self.amplitude * self.kind.value(self.frequency * x)?)
    }

    pub fn derivative(&self, x: f64) -> Option<f64> {
        finite(self.amplitude * self.frequency * self.kind.derivative(self.frequency * x)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotDomain {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl PlotDomain {
    pub fn new(start: f64, end: f64, points: usize) -> Result<Self, SamplerError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(SamplerError::NonFinite { start, end });
        }
        if start >= end {
            return Err(SamplerError::EmptyDomain { start, end });
        }
        if points < 2 {
            return Err(SamplerError::TooFewPoints(points));
        }
        Ok(Self { start, end, points })
    }

    pub fn step(&self) -> f64 {
        (self.end - self.start) / (self.points - 1) as f64
    }

    /// Evenly spaced x values, both ends included.
    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        let step = self.step();
        (0..self.points).map(move |i| {
            if i + 1 == self.points {
                self.end
            } else {
                self.start + step * i as f64
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: Option<f64>,
    pub derivative: Option<f64>,
}

pub fn sample(function: &PlotFunction, domain: &PlotDomain, with_derivative: bool) -> Vec<PlotPoint> {
    domain
        .xs()
        .map(|x| PlotPoint {
            x,
            y: function.eval(x),
            derivative: if with_derivative { function.derivative(x) } else { None },
        })
        .collect()
}
