//! Request and response frames.
//!
//! A request is a service id followed by a service-specific payload. The
//! caller also supplies the largest response it can accept; every positive
//! response that would exceed it is replaced by
//! [`NegativeResponseCode::IncorrectMessageLength`].

use crate::ids::service_id;
use crate::{DiagnosticError, DiagnosticResult, NegativeResponseCode};

/// Shortest response the caller may ask for: a negative response.
pub const MIN_RESPONSE_LEN: usize = 3;

/// One diagnostic request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRequest {
    service_id: u8,
    payload: Vec<u8>,
    max_response_len: usize,
}

impl DiagnosticRequest {
    /// Build a request from its parts.
    ///
    /// `max_response_len` is raised to [`MIN_RESPONSE_LEN`] so a negative
    /// response always fits.
    pub fn new(service_id: u8, payload: impl Into<Vec<u8>>, max_response_len: usize) -> Self {
        Self {
            service_id,
            payload: payload.into(),
            max_response_len: max_response_len.max(MIN_RESPONSE_LEN),
        }
    }

    /// Parse a raw frame: the first byte is the service id.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosticError::EmptyRequest`] for an empty frame.
    pub fn from_bytes(frame: &[u8], max_response_len: usize) -> DiagnosticResult<Self> {
        let (&sid, payload) = frame.split_first().ok_or(DiagnosticError::EmptyRequest)?;
        Ok(Self::new(sid, payload, max_response_len))
    }

    /// Service id.
    pub fn service_id(&self) -> u8 {
        self.service_id
    }

    /// Payload after the service id.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Largest acceptable response length.
    pub fn max_response_len(&self) -> usize {
        self.max_response_len
    }
}

/// One diagnostic response, positive or negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticResponse {
    bytes: Vec<u8>,
}

impl DiagnosticResponse {
    /// Positive response: `service_id + 0x40` followed by `data`.
    pub fn positive(service_id: u8, data: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(data.len().saturating_add(1));
        bytes.push(service_id.wrapping_add(service_id::POSITIVE_RESPONSE_OFFSET));
        bytes.extend_from_slice(data);
        Self { bytes }
    }

    /// Negative response: `7F sid nrc`.
    pub fn negative(service_id: u8, code: NegativeResponseCode) -> Self {
        Self {
            bytes: vec![service_id::NEGATIVE_RESPONSE, service_id, code.code()],
        }
    }

    /// Whether this is a positive response.
    pub fn is_positive(&self) -> bool {
        self.negative_code().is_none()
    }

    /// Reason code if this is a negative response.
    pub fn negative_code(&self) -> Option<NegativeResponseCode> {
        match self.bytes.as_slice() {
            [service_id::NEGATIVE_RESPONSE, _, code] => NegativeResponseCode::from_code(*code),
            _ => None,
        }
    }

    /// Encoded response.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Response length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the response is empty. Never true for a constructed response.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
