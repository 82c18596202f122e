//! Taint Summary (C7): per-function record of tainted variables,
//! propagation paths, sanitizers, and detections (§3.6, §4.7).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod analyzer;
pub use analyzer::analyze_method;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
    Absent,
}

/// Bands a raw confidence score per §3.6: `>= 0.8` high, `0.5..0.8` medium,
/// `> 0` low, `0` absent.
pub fn band(confidence: f64) -> Confidence {
    if confidence >= 0.8 {
        Confidence::High
    } else if confidence >= 0.5 {
        Confidence::Medium
    } else if confidence > 0.0 {
        Confidence::Low
    } else {
        Confidence::Absent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaintInfo {
    pub source_line: u32,
    pub source_var: String,
    pub sink_line: Option<u32>,
    pub sink_var: Option<String>,
    pub sink_call: Option<String>,
    pub propagation_path: Vec<String>,
    pub confidence: f64,
    pub sanitized: bool,
    pub sanitizer_line: Option<u32>,
    pub sanitizer_call: Option<String>,
}

impl TaintInfo {
    pub fn new(source_line: u32, source_var: impl Into<String>, confidence: f64) -> Self {
        Self {
            source_line,
            source_var: source_var.into(),
            sink_line: None,
            sink_var: None,
            sink_call: None,
            propagation_path: Vec::new(),
            confidence,
            sanitized: false,
            sanitizer_line: None,
            sanitizer_call: None,
        }
    }

    /// `is_tainted() <=> confidence > 0 && !sanitized` (§3.6).
    pub fn is_tainted(&self) -> bool {
        self.confidence > 0.0 && !self.sanitized
    }

    pub fn confidence_band(&self) -> Confidence {
        if self.sanitized {
            Confidence::Absent
        } else {
            band(self.confidence)
        }
    }
}

/// Per-function taint summary, keyed externally by the function's FQN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaintSummary {
    pub tainted_vars: HashMap<String, Vec<TaintInfo>>,
    pub detections: Vec<TaintInfo>,
    pub tainted_params: Vec<String>,
    pub tainted_return: bool,
    pub return_taint_info: Option<TaintInfo>,
    pub analysis_error: bool,
    pub analysis_error_message: Option<String>,
}

impl TaintSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// No-op on an empty var name (§4.7).
    pub fn add_tainted_var(&mut self, var_name: &str, info: TaintInfo) {
        if var_name.is_empty() {
            return;
        }
        self.tainted_vars.entry(var_name.to_string()).or_default().push(info);
    }

    /// Idempotent: marking the same parameter twice has no additional effect.
    pub fn mark_tainted_param(&mut self, param_name: &str) {
        if param_name.is_empty() {
            return;
        }
        if !self.tainted_params.iter().any(|p| p == param_name) {
            self.tainted_params.push(param_name.to_string());
        }
    }

    pub fn mark_return_tainted(&mut self, info: TaintInfo) {
        self.tainted_return = true;
        self.return_taint_info = Some(info);
    }

    pub fn add_detection(&mut self, info: TaintInfo) {
        self.detections.push(info);
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.analysis_error = true;
        self.analysis_error_message = Some(message.into());
    }

    pub fn is_tainted(&self, var: &str) -> bool {
        self.tainted_vars
            .get(var)
            .map(|infos| infos.iter().any(TaintInfo::is_tainted))
            .unwrap_or(false)
    }

    pub fn has_detections(&self) -> bool {
        !self.detections.is_empty()
    }

    pub fn get_high_confidence_detections(&self) -> Vec<&TaintInfo> {
        self.detections_with_band(Confidence::High)
    }

    pub fn get_medium_confidence_detections(&self) -> Vec<&TaintInfo> {
        self.detections_with_band(Confidence::Medium)
    }

    pub fn get_low_confidence_detections(&self) -> Vec<&TaintInfo> {
        self.detections_with_band(Confidence::Low)
    }

    fn detections_with_band(&self, band: Confidence) -> Vec<&TaintInfo> {
        self.detections
            .iter()
            .filter(|d| d.confidence_band() == band)
            .collect()
    }

    pub fn get_tainted_var_count(&self) -> usize {
        self.tainted_vars.len()
    }

    /// Consumers must check this before relying on results (§7): a summary
    /// recorded with `set_error` is not reliable for the function it covers.
    pub fn is_complete(&self) -> bool {
        !self.analysis_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_bands_per_spec_thresholds() {
        assert_eq!(band(1.0), Confidence::High);
        assert_eq!(band(0.8), Confidence::High);
        assert_eq!(band(0.79), Confidence::Medium);
        assert_eq!(band(0.5), Confidence::Medium);
        assert_eq!(band(0.49), Confidence::Low);
        assert_eq!(band(0.0), Confidence::Absent);
    }

    #[test]
    fn is_tainted_requires_positive_confidence_and_not_sanitized() {
        let mut info = TaintInfo::new(1, "x", 0.9);
        assert!(info.is_tainted());
        info.sanitized = true;
        assert!(!info.is_tainted());
    }

    #[test]
    fn empty_var_name_is_a_no_op() {
        let mut summary = TaintSummary::new();
        summary.add_tainted_var("", TaintInfo::new(1, "", 0.9));
        assert_eq!(summary.get_tainted_var_count(), 0);
    }

    #[test]
    fn marking_same_parameter_twice_is_idempotent() {
        let mut summary = TaintSummary::new();
        summary.mark_tainted_param("data");
        summary.mark_tainted_param("data");
        assert_eq!(summary.tainted_params, vec!["data".to_string()]);
    }

    #[test]
    fn is_complete_reflects_recorded_error() {
        let mut summary = TaintSummary::new();
        assert!(summary.is_complete());
        summary.set_error("timeout");
        assert!(!summary.is_complete());
    }

    #[test]
    fn detections_are_banded_by_confidence() {
        let mut summary = TaintSummary::new();
        summary.add_detection(TaintInfo::new(1, "a", 0.95));
        summary.add_detection(TaintInfo::new(2, "b", 0.6));
        summary.add_detection(TaintInfo::new(3, "c", 0.1));

        assert_eq!(summary.get_high_confidence_detections().len(), 1);
        assert_eq!(summary.get_medium_confidence_detections().len(), 1);
        assert_eq!(summary.get_low_confidence_detections().len(), 1);
    }
}
