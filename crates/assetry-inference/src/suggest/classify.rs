//! Maps inference failures onto the classified error variants.
//!
//! Backends that understand their provider's status codes already return a
//! classified variant, or [`Error::InferenceStatus`] when the status has no
//! classified cause; neither is looked at again. Transport and other
//! unclassified errors are classified by phrases in the message; what matches
//! nothing stays unclassified and leads to a fallback.

use once_cell::sync::Lazy;
use regex::Regex;

use assetry_core::Error;

static AUTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b401\b|unauthori[sz]ed|authenticat|(?:invalid|incorrect|missing) api[ _-]?key|api[ _-]?key (?:not valid|invalid|expired)|permission[ _-]?denied",
    )
    .expect("valid regex")
});

static QUOTA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b429\b|quota|rate[ _-]?limit|resource[ _-]?exhausted|too many requests")
        .expect("valid regex")
});

static PAYLOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b413\b|too large|exceeds|context[ _-]?length").expect("valid regex")
});

static MODEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b503\b|service unavailable|overloaded|model[ _-]?not[ _-]?found|\bmodels?\b[^.]*\b(?:is not found|does not exist|unavailable)",
    )
    .expect("valid regex")
});

/// Classify a failure from the `Calling` stage. Checks run in a fixed order
/// (auth, quota, payload, model) so a message matching several classes always
/// gets the same one.
pub fn classify_failure(err: Error) -> Error {
    if err.is_classified_inference() {
        return err;
    }
    let message = match &err {
        Error::Inference(m) | Error::Request(m) | Error::Internal(m) => m.clone(),
        _ => return err,
    };

    if AUTH.is_match(&message) {
        Error::InferenceAuth(message)
    } else if QUOTA.is_match(&message) {
        Error::InferenceQuota(message)
    } else if PAYLOAD.is_match(&message) {
        Error::PayloadTooLarge(message)
    } else if MODEL.is_match(&message) {
        Error::ModelUnavailable(message)
    } else {
        err
    }
}
